pub mod format;
pub mod grid;
