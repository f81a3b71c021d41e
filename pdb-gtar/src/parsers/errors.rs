use std::io;
use thiserror::Error;

use crate::color::ColorModeError;

/// When a field is ill-formatted, this enum tells what field has the issue.
#[derive(Debug, PartialEq, Eq)]
pub enum FieldError {
    ResidueIdentifier,
    Position,
}

/// What went wrong when reading an atom record?
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("ill-formatted field {0:?}")]
    FieldFormat(FieldError),
    #[error("line too short to contain an atom")]
    LineTooShort,
    #[error("missing field {0}")]
    MissingField(String),
    #[error("unexpected element {0} in an atom site")]
    Unexpected(String),
}

#[derive(Error, Debug)]
pub enum ReadError {
    /// A record is ill-formatted. For the legacy format, the position is the
    /// line number; for PDBML, it is the byte position in the document.
    #[error("Format error at position {1}: {0}.")]
    FormatError(FormatError, usize),
    #[error("Error while reading the input: {0}")]
    IOError(#[from] io::Error),
    #[error("Error in the XML document at position {1}: {0}.")]
    XMLError(quick_xml::Error, usize),
    #[error("{0}")]
    ColorMode(#[from] ColorModeError),
}
