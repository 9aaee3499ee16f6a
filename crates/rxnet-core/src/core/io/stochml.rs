use crate::core::expression::{self, Namespace};
use crate::core::io::traits::ModelFile;
use crate::core::models::error::ModelError;
use crate::core::models::model::{Model, Units};
use crate::core::models::parameter::Parameter;
use crate::core::models::reaction::{Reaction, ReactionType, Stoichiometry};
use crate::core::models::species::Species;
use crate::core::utils::format::format_number;
use roxmltree::{Document, Node};
use std::borrow::Cow;
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;
use tracing::{debug, info, instrument};

const VOLUME_PARAMETER: &str = "vol";
const VOLUME_ALIAS: &str = "volume";
const INDENT: &str = "  ";

#[derive(Debug, Error)]
pub enum StochMlError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("Invalid StochML document: {0}")]
    DocumentStructure(String),
    #[error("Invalid value '{value}' for {field}")]
    InvalidValue { field: String, value: String },
    #[error("Parameter '{0}' cannot be exported: StochML reads it back as the model volume")]
    VolumeParameter(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// The StochML exchange format.
pub struct StochMlFile;

impl ModelFile for StochMlFile {
    type Error = StochMlError;

    fn read_from(reader: &mut impl BufRead) -> Result<Model, Self::Error> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        read_str(&text, None)
    }

    fn write_to(model: &Model, writer: &mut impl Write) -> Result<(), Self::Error> {
        write_document(model, writer)
    }
}

/// Renders `model` as StochML text.
///
/// Every parameter must already be resolved; see [`Model::serialize`] for the
/// variant that resolves first.
pub fn write_string(model: &Model) -> Result<String, StochMlError> {
    let mut buffer = Vec::new();
    write_document(model, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Minimal indenting writer for element-only documents.
struct XmlWriter<'w, W: Write> {
    out: &'w mut W,
    depth: usize,
}

impl<'w, W: Write> XmlWriter<'w, W> {
    fn new(out: &'w mut W) -> Self {
        Self { out, depth: 0 }
    }

    fn indent(&mut self) -> io::Result<()> {
        for _ in 0..self.depth {
            self.out.write_all(INDENT.as_bytes())?;
        }
        Ok(())
    }

    fn start_tag(&mut self, tag: &str, attributes: &[(&str, &str)]) -> io::Result<()> {
        self.indent()?;
        write!(self.out, "<{}", tag)?;
        for (key, value) in attributes {
            write!(self.out, " {}=\"{}\"", key, escape(value))?;
        }
        Ok(())
    }

    fn open(&mut self, tag: &str, attributes: &[(&str, &str)]) -> io::Result<()> {
        self.start_tag(tag, attributes)?;
        writeln!(self.out, ">")?;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self, tag: &str) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.indent()?;
        writeln!(self.out, "</{}>", tag)
    }

    fn empty(&mut self, tag: &str, attributes: &[(&str, &str)]) -> io::Result<()> {
        self.start_tag(tag, attributes)?;
        writeln!(self.out, "/>")
    }

    fn text_element(&mut self, tag: &str, attributes: &[(&str, &str)], text: &str) -> io::Result<()> {
        if text.is_empty() {
            return self.empty(tag, attributes);
        }
        self.start_tag(tag, attributes)?;
        writeln!(self.out, ">{}</{}>", escape(text), tag)
    }
}

fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Writes `model` as a StochML document.
///
/// Mass-action reactions keep their `Rate` only when the model volume is
/// exactly 1; otherwise the derived propensity (which carries the volume
/// factors) is written as a customized `PropensityFunction`. The model volume
/// is appended to the parameter list as `vol`. Rate rules have no StochML
/// representation and are not written.
///
/// # Errors
///
/// - [`ModelError::ParameterResolution`] (wrapped) for the first parameter
///   without a value.
/// - [`StochMlError::VolumeParameter`] for a parameter named `volume` in any
///   case, which import would take as the model volume.
///
/// Nothing is written in either case.
#[instrument(skip_all, fields(model = %model.name))]
pub fn write_document(model: &Model, writer: &mut impl Write) -> Result<(), StochMlError> {
    if let Some(parameter) = model
        .parameters_iter()
        .find(|p| p.name.eq_ignore_ascii_case(VOLUME_ALIAS))
    {
        return Err(StochMlError::VolumeParameter(parameter.name.clone()));
    }

    let parameters = model
        .parameters_iter()
        .map(|p| {
            p.value()
                .map(|value| (p.name.as_str(), format_number(value)))
                .ok_or_else(|| ModelError::ParameterResolution {
                    name: p.name.clone(),
                    reason: format!(
                        "expression '{}' has not been resolved to a scalar value",
                        p.expression()
                    ),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let scalar_rates = model.volume() == 1.0;
    let mut xml = XmlWriter::new(writer);

    writeln!(xml.out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    xml.open("Model", &[])?;

    let units = model.units().to_string();
    let units_attribute = [("units", units.as_str())];
    let description_attributes: &[(&str, &str)] = match model.units() {
        Units::Concentration => &units_attribute,
        Units::Population => &[],
    };
    xml.text_element("Description", description_attributes, &model.annotation)?;
    xml.text_element("NumberOfReactions", &[], &model.reaction_count().to_string())?;
    xml.text_element("NumberOfSpecies", &[], &model.species_count().to_string())?;

    xml.open("SpeciesList", &[])?;
    for species in model.species_iter() {
        xml.open("Species", &[])?;
        xml.text_element("Id", &[], &species.name)?;
        xml.text_element("InitialPopulation", &[], &format_number(species.initial_value()))?;
        xml.close("Species")?;
    }
    xml.close("SpeciesList")?;

    xml.open("ParametersList", &[])?;
    let volume = format_number(model.volume());
    for (name, value) in parameters
        .iter()
        .map(|(n, v)| (*n, v.as_str()))
        .chain(std::iter::once((VOLUME_PARAMETER, volume.as_str())))
    {
        xml.open("Parameter", &[])?;
        xml.text_element("Id", &[], name)?;
        xml.text_element("Expression", &[], value)?;
        xml.close("Parameter")?;
    }
    xml.close("ParametersList")?;

    xml.open("ReactionsList", &[])?;
    for reaction in model.reactions_iter() {
        write_reaction(&mut xml, reaction, scalar_rates)?;
    }
    xml.close("ReactionsList")?;

    xml.close("Model")?;
    xml.out.flush()?;

    info!(
        species = model.species_count(),
        parameters = model.parameter_count(),
        reactions = model.reaction_count(),
        "Wrote StochML document"
    );
    Ok(())
}

fn write_reaction<W: Write>(xml: &mut XmlWriter<'_, W>, reaction: &Reaction, scalar_rates: bool) -> io::Result<()> {
    xml.open("Reaction", &[])?;
    xml.text_element("Id", &[], &reaction.name)?;
    xml.text_element("Description", &[], reaction.annotation.as_deref().unwrap_or(""))?;

    match reaction.rate() {
        Some(rate) if scalar_rates => {
            xml.text_element("Type", &[], &ReactionType::MassAction.to_string())?;
            xml.text_element("Rate", &[], rate)?;
        }
        _ => {
            xml.text_element("Type", &[], &ReactionType::Customized.to_string())?;
            xml.text_element("PropensityFunction", &[], reaction.propensity_function())?;
        }
    }

    write_references(xml, "Reactants", reaction.reactants())?;
    write_references(xml, "Products", reaction.products())?;
    xml.close("Reaction")
}

fn write_references<W: Write>(xml: &mut XmlWriter<'_, W>, tag: &str, stoichiometry: &Stoichiometry) -> io::Result<()> {
    if stoichiometry.is_empty() {
        return xml.empty(tag, &[]);
    }
    xml.open(tag, &[])?;
    for (species, count) in stoichiometry.iter() {
        let count = count.to_string();
        xml.empty("SpeciesReference", &[("id", species), ("stoichiometry", &count)])?;
    }
    xml.close(tag)
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn children<'a, 'input: 'a>(node: Node<'a, 'input>, tag: &'a str) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.has_tag_name(tag))
}

fn descendants<'a, 'input: 'a>(node: Node<'a, 'input>, tag: &'a str) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants().filter(move |n| n.has_tag_name(tag))
}

/// Trimmed text of the `tag` child; an element without text yields `""`.
fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    child(node, tag).map(|n| n.text().unwrap_or("").trim())
}

fn required_text<'a>(node: Node<'a, '_>, tag: &str, owner: &str) -> Result<&'a str, StochMlError> {
    match child_text(node, tag) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(StochMlError::DocumentStructure(format!(
            "{} has no <{}> element",
            owner, tag
        ))),
    }
}

fn parse_units(text: Option<&str>) -> Units {
    match text.map(|t| t.trim().to_lowercase()) {
        Some(t) if t == "concentration" => Units::Concentration,
        _ => Units::Population,
    }
}

fn parse_number(text: &str, field: impl FnOnce() -> String) -> Result<f64, StochMlError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| StochMlError::InvalidValue {
            field: field(),
            value: text.to_string(),
        })
}

/// Parses StochML text into a model.
///
/// The model is named `name` when given; otherwise the document's optional
/// `Name` element is used, falling back to an empty name.
///
/// # Errors
///
/// - [`StochMlError::Xml`] if the text is not well-formed XML.
/// - [`StochMlError::DocumentStructure`] for a missing required element, an
///   unsupported reaction type, or a reference to an unknown species.
/// - [`StochMlError::InvalidValue`] for a non-numeric population,
///   stoichiometry or volume.
/// - [`StochMlError::Model`] if the document's entities violate the model's
///   own rules (for example a duplicate or reserved name).
#[instrument(skip_all)]
pub fn read_str(text: &str, name: Option<&str>) -> Result<Model, StochMlError> {
    let document = Document::parse(text)?;
    let root = document.root_element();
    if !root.has_tag_name("Model") {
        return Err(StochMlError::DocumentStructure(format!(
            "root element must be <Model>, found <{}>",
            root.tag_name().name()
        )));
    }

    let model_name = match (name, child_text(root, "Name")) {
        (Some(name), _) => name.to_string(),
        (None, Some("")) => {
            return Err(StochMlError::DocumentStructure(
                "<Name> element is present but empty".to_string(),
            ));
        }
        (None, Some(name)) => name.to_string(),
        (None, None) => String::new(),
    };
    let mut model = Model::new(model_name);

    if let Some(description) = child(root, "Description") {
        model.set_units(&parse_units(description.attribute("units")).to_string())?;
        model.annotation = description.text().unwrap_or("").to_string();
    }
    if let Some(units) = child_text(root, "Units") {
        model.set_units(&parse_units(Some(units)).to_string())?;
    }

    for node in descendants(root, "Parameter") {
        let id = required_text(node, "Id", "parameter")?;
        let expression = required_text(node, "Expression", &format!("parameter '{}'", id))?;

        if id == VOLUME_PARAMETER || id.eq_ignore_ascii_case(VOLUME_ALIAS) {
            let volume = expression::evaluate(expression, &Namespace::new()).map_err(|_| {
                StochMlError::InvalidValue {
                    field: format!("volume parameter '{}'", id),
                    value: expression.to_string(),
                }
            })?;
            model.set_volume(volume)?;
            continue;
        }
        model.add_parameter(Parameter::new(id, expression))?;
    }

    for node in descendants(root, "Species") {
        let id = required_text(node, "Id", "species")?;
        let population = required_text(node, "InitialPopulation", &format!("species '{}'", id))?;
        let value = parse_number(population, || format!("initial population of species '{}'", id))?;
        let species = if value.fract() == 0.0 {
            Species::new(id, value)?
        } else {
            Species::continuous(id, value)?
        };
        model.add_species(species)?;
    }

    for node in descendants(root, "Reaction") {
        let reaction = read_reaction(node, &mut model)?;
        model.add_reaction(reaction)?;
    }

    info!(
        model = %model.name,
        species = model.species_count(),
        parameters = model.parameter_count(),
        reactions = model.reaction_count(),
        "Read StochML document"
    );
    Ok(model)
}

fn read_reaction(node: Node<'_, '_>, model: &mut Model) -> Result<Reaction, StochMlError> {
    let id = required_text(node, "Id", "reaction")?;
    let owner = format!("reaction '{}'", id);
    let type_text = required_text(node, "Type", &owner)?;
    let reaction_type: ReactionType = type_text.parse().map_err(|()| {
        StochMlError::DocumentStructure(format!(
            "{} has unsupported type '{}'",
            owner, type_text
        ))
    })?;

    let mut builder = Reaction::builder(id);
    for (species, count) in read_references(node, "Reactants", model, &owner)? {
        builder = builder.reactant(species, count);
    }
    for (species, count) in read_references(node, "Products", model, &owner)? {
        builder = builder.product(species, count);
    }
    if let Some(annotation) = child_text(node, "Description").filter(|t| !t.is_empty()) {
        builder = builder.annotation(annotation);
    }

    builder = match reaction_type {
        ReactionType::MassAction => {
            let rate = required_text(node, "Rate", &owner)?;
            if model.parameter(rate).is_some() {
                builder.rate(rate)
            } else {
                // A literal rate becomes a generated parameter.
                let generated = format!("Reaction_{}_rate_constant", id);
                debug!(reaction = id, parameter = %generated, expression = rate, "Synthesizing rate parameter");
                model.add_parameter(Parameter::new(generated.as_str(), rate))?;
                builder.rate(generated)
            }
        }
        ReactionType::Customized => {
            builder.propensity_function(required_text(node, "PropensityFunction", &owner)?)
        }
    };

    Ok(builder.build().map_err(ModelError::from)?)
}

fn read_references<'a>(
    node: Node<'a, '_>,
    tag: &str,
    model: &Model,
    owner: &str,
) -> Result<Vec<(&'a str, u32)>, StochMlError> {
    let Some(list) = child(node, tag) else {
        return Ok(Vec::new());
    };

    children(list, "SpeciesReference")
        .map(|reference| {
            let species = reference
                .attribute("id")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    StochMlError::DocumentStructure(format!(
                        "{} has a species reference without an id",
                        owner
                    ))
                })?;
            if model.species(species).is_none() {
                return Err(StochMlError::DocumentStructure(format!(
                    "{} references unknown species '{}'",
                    owner, species
                )));
            }
            let raw = reference.attribute("stoichiometry").ok_or_else(|| {
                StochMlError::DocumentStructure(format!(
                    "{} has no stoichiometry for species '{}'",
                    owner, species
                ))
            })?;
            let count = parse_number(raw, || format!("stoichiometry of '{}' in {}", species, owner))?;
            if count < 0.0 || count > f64::from(u32::MAX) {
                return Err(StochMlError::InvalidValue {
                    field: format!("stoichiometry of '{}' in {}", species, owner),
                    value: raw.to_string(),
                });
            }
            Ok((species, count.trunc() as u32))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::error::ReactionError;
    use crate::core::models::rate_rule::RateRule;
    use std::io::Cursor;

    fn sample_model() -> Model {
        let mut model = Model::new("dimer");
        model.annotation = "Dimerization <test> & friends".to_string();
        model
            .add_species(vec![Species::new("M", 30.0).unwrap(), Species::new("D", 0.0).unwrap()])
            .unwrap();
        model
            .add_parameter(vec![Parameter::new("k_c", "0.005"), Parameter::new("k_d", "k_c*16")])
            .unwrap();
        model
            .add_reaction(vec![
                Reaction::builder("r_c")
                    .reactant("M", 2)
                    .product("D", 1)
                    .rate("k_c")
                    .annotation("association")
                    .build()
                    .unwrap(),
                Reaction::builder("r_d")
                    .reactant("D", 1)
                    .product("M", 2)
                    .propensity_function("k_d*D")
                    .build()
                    .unwrap(),
            ])
            .unwrap();
        model
    }

    #[test]
    fn round_trip_preserves_entities() {
        let mut model = sample_model();
        let xml = model.serialize().unwrap();
        let parsed = read_str(&xml, Some("dimer")).unwrap();

        assert_eq!(parsed.name, "dimer");
        assert_eq!(parsed.annotation, model.annotation);
        assert_eq!(parsed.units(), Units::Population);
        assert_eq!(parsed.volume(), 1.0);

        let species: Vec<(&str, f64)> = parsed
            .species_iter()
            .map(|s| (s.name.as_str(), s.initial_value()))
            .collect();
        assert_eq!(species, vec![("M", 30.0), ("D", 0.0)]);

        let parameters: Vec<(&str, Option<f64>)> = parsed
            .parameters_iter()
            .map(|p| (p.name.as_str(), p.value()))
            .collect();
        assert_eq!(parameters, vec![("k_c", Some(0.005)), ("k_d", Some(0.08))]);

        let r_c = parsed.reaction("r_c").unwrap();
        assert_eq!(r_c.rate(), Some("k_c"));
        assert_eq!(r_c.propensity_function(), "0.5*k_c*M*(M-1)/vol");
        assert_eq!(r_c.reactants().get("M"), Some(2));
        assert_eq!(r_c.annotation.as_deref(), Some("association"));

        let r_d = parsed.reaction("r_d").unwrap();
        assert_eq!(r_d.reaction_type(), ReactionType::Customized);
        assert_eq!(r_d.propensity_function(), "k_d*D");
        assert_eq!(r_d.products().get("M"), Some(2));
        assert_eq!(r_d.annotation, None);
    }

    #[test]
    fn export_type_depends_on_volume() {
        let mut model = sample_model();
        let xml = model.serialize().unwrap();
        assert!(xml.contains("<Type>mass-action</Type>"));
        assert!(xml.contains("<Rate>k_c</Rate>"));

        model.set_volume(2.0).unwrap();
        let xml = model.serialize().unwrap();
        assert!(!xml.contains("<Type>mass-action</Type>"));
        assert!(xml.contains("<PropensityFunction>0.5*k_c*M*(M-1)/vol</PropensityFunction>"));
        assert!(xml.contains("<Id>vol</Id>"));
        assert!(xml.contains("<Expression>2</Expression>"));

        let parsed = read_str(&xml, None).unwrap();
        assert_eq!(parsed.volume(), 2.0);
        assert!(parsed.parameter("vol").is_none());
        assert!(!parsed.reaction("r_c").unwrap().is_mass_action());
    }

    #[test]
    fn export_escapes_text_and_writes_units() {
        let mut model = sample_model();
        model.set_units("concentration").unwrap();
        let xml = model.serialize().unwrap();
        assert!(xml.contains(
            "<Description units=\"concentration\">Dimerization &lt;test&gt; &amp; friends</Description>"
        ));
        assert!(xml.contains("<NumberOfReactions>2</NumberOfReactions>"));
        assert!(xml.contains("<NumberOfSpecies>2</NumberOfSpecies>"));
        assert_eq!(read_str(&xml, None).unwrap().units(), Units::Concentration);
    }

    #[test]
    fn export_requires_resolved_parameters() {
        let model = sample_model();
        match write_string(&model) {
            Err(StochMlError::Model(ModelError::ParameterResolution { name, .. })) => {
                assert_eq!(name, "k_d")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rate_rules_are_not_exported() {
        let mut model = sample_model();
        model.add_rate_rule(RateRule::new("M", "-0.1*M")).unwrap();
        let xml = model.serialize().unwrap();
        assert!(!xml.contains("-0.1*M"));
    }

    #[test]
    fn write_to_and_read_from_use_the_stream() {
        let mut model = sample_model();
        model.resolve_parameters().unwrap();
        let mut buffer = Vec::new();
        StochMlFile::write_to(&model, &mut buffer).unwrap();
        let parsed = StochMlFile::read_from(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(parsed.reaction_count(), 2);
        assert_eq!(parsed.name, "");
    }

    #[test]
    fn literal_rate_synthesizes_parameter() {
        let xml = r#"
            <Model>
              <Name>birth</Name>
              <SpeciesList>
                <Species><Id>A</Id><InitialPopulation>10</InitialPopulation></Species>
              </SpeciesList>
              <ReactionsList>
                <Reaction>
                  <Id>make</Id>
                  <Type>mass-action</Type>
                  <Rate>0.25</Rate>
                  <Products><SpeciesReference id="A" stoichiometry="1.0"/></Products>
                </Reaction>
              </ReactionsList>
            </Model>"#;
        let model = read_str(xml, None).unwrap();
        assert_eq!(model.name, "birth");
        let parameter = model.parameter("Reaction_make_rate_constant").unwrap();
        assert_eq!(parameter.value(), Some(0.25));
        let reaction = model.reaction("make").unwrap();
        assert_eq!(reaction.rate(), Some("Reaction_make_rate_constant"));
        assert_eq!(reaction.propensity_function(), "Reaction_make_rate_constant*vol");
        assert!(reaction.reactants().is_empty());
    }

    #[test]
    fn units_element_and_volume_alias_are_honored() {
        let xml = r#"
            <Model>
              <Description units="concentration">note</Description>
              <Units> Population </Units>
              <ParametersList>
                <Parameter><Id>Volume</Id><Expression>3.5</Expression></Parameter>
              </ParametersList>
            </Model>"#;
        let model = read_str(xml, None).unwrap();
        assert_eq!(model.units(), Units::Population);
        assert_eq!(model.volume(), 3.5);
        assert_eq!(model.annotation, "note");
        assert_eq!(model.parameter_count(), 0);
    }

    #[test]
    fn fractional_population_imports_as_continuous_species() {
        let xml = r#"<Model><SpeciesList>
            <Species><Id>C</Id><InitialPopulation>0.75</InitialPopulation></Species>
            <Species><Id>N</Id><InitialPopulation>4</InitialPopulation></Species>
        </SpeciesList></Model>"#;
        let model = read_str(xml, None).unwrap();
        assert!(model.species("C").unwrap().continuous);
        assert_eq!(model.species("C").unwrap().initial_value(), 0.75);
        assert!(!model.species("N").unwrap().continuous);
    }

    #[test]
    fn missing_required_elements_are_structure_errors() {
        let cases = [
            r#"<Model><ReactionsList><Reaction><Type>customized</Type><PropensityFunction>1</PropensityFunction></Reaction></ReactionsList></Model>"#,
            r#"<Model><ReactionsList><Reaction><Id>r</Id><PropensityFunction>1</PropensityFunction></Reaction></ReactionsList></Model>"#,
            r#"<Model><ReactionsList><Reaction><Id>r</Id><Type>customized</Type></Reaction></ReactionsList></Model>"#,
            r#"<Model><ReactionsList><Reaction><Id>r</Id><Type>mass-action</Type></Reaction></ReactionsList></Model>"#,
            r#"<Model><ReactionsList><Reaction><Id>r</Id><Type>other</Type></Reaction></ReactionsList></Model>"#,
            r#"<Model><SpeciesList><Species><Id>A</Id></Species></SpeciesList></Model>"#,
            r#"<Model><Name></Name></Model>"#,
            r#"<Network/>"#,
        ];
        for xml in cases {
            assert!(
                matches!(read_str(xml, None), Err(StochMlError::DocumentStructure(_))),
                "{xml}"
            );
        }
    }

    #[test]
    fn unknown_species_reference_is_rejected() {
        let xml = r#"<Model><ReactionsList><Reaction>
            <Id>r</Id><Type>customized</Type><PropensityFunction>1</PropensityFunction>
            <Products><SpeciesReference id="Ghost" stoichiometry="1"/></Products>
        </Reaction></ReactionsList></Model>"#;
        assert!(matches!(
            read_str(xml, None),
            Err(StochMlError::DocumentStructure(msg)) if msg.contains("Ghost")
        ));
    }

    #[test]
    fn invalid_numbers_and_malformed_xml_are_reported() {
        let xml = r#"<Model><SpeciesList><Species><Id>A</Id><InitialPopulation>lots</InitialPopulation></Species></SpeciesList></Model>"#;
        assert!(matches!(read_str(xml, None), Err(StochMlError::InvalidValue { .. })));
        assert!(matches!(read_str("<Model>", None), Err(StochMlError::Xml(_))));
    }

    #[test]
    fn volume_named_parameter_is_not_exported() {
        let mut model = sample_model();
        model.add_parameter(Parameter::new("Volume", "5")).unwrap();
        match model.serialize() {
            Err(StochMlError::VolumeParameter(name)) => assert_eq!(name, "Volume"),
            other => panic!("unexpected result: {:?}", other),
        }

        model.delete_parameter("Volume");
        let parsed = read_str(&model.serialize().unwrap(), None).unwrap();
        assert_eq!(parsed.parameter_count(), 2);
        assert_eq!(parsed.volume(), 1.0);
    }

    #[test]
    fn overflowing_stoichiometry_is_an_order_error() {
        let xml = r#"<Model>
            <SpeciesList>
              <Species><Id>A</Id><InitialPopulation>1</InitialPopulation></Species>
              <Species><Id>B</Id><InitialPopulation>1</InitialPopulation></Species>
            </SpeciesList>
            <ParametersList><Parameter><Id>k</Id><Expression>1</Expression></Parameter></ParametersList>
            <ReactionsList><Reaction>
              <Id>r</Id><Type>mass-action</Type><Rate>k</Rate>
              <Reactants>
                <SpeciesReference id="A" stoichiometry="4294967295"/>
                <SpeciesReference id="B" stoichiometry="1"/>
              </Reactants>
            </Reaction></ReactionsList>
        </Model>"#;
        assert!(matches!(
            read_str(xml, None),
            Err(StochMlError::Model(ModelError::ReactionDefinition(
                ReactionError::OrderTooHigh { .. }
            )))
        ));
    }

    #[test]
    fn model_rules_apply_to_imported_entities() {
        let xml = r#"<Model><SpeciesList>
            <Species><Id>A</Id><InitialPopulation>1</InitialPopulation></Species>
            <Species><Id>A</Id><InitialPopulation>2</InitialPopulation></Species>
        </SpeciesList></Model>"#;
        assert!(matches!(
            read_str(xml, None),
            Err(StochMlError::Model(ModelError::Naming(_)))
        ));
    }
}
