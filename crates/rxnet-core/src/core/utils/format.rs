/// Formats a number the way it is written into documents and generated
/// expressions: shortest round-tripping decimal, no exponent, no `-0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}
