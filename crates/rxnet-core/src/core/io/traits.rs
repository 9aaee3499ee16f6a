use crate::core::models::model::Model;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for model document formats.
///
/// Implementors handle format-specific parsing and serialization; the path
/// variants only add buffered file handling on top.
pub trait ModelFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a model from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Model, Self::Error>;

    /// Writes a model to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be represented in the format or
    /// writing fails.
    fn write_to(model: &Model, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a model from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Model, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a model to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(model: &Model, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(model, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
