//! Error types for the model layer.

use crate::value::FieldType;
use std::fmt::Display;
use thiserror::Error;

/// Main error type for model and gateway operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Type keyword or field type outside the supported set
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Stored text does not match the declared field type
    #[error("Cannot parse {text:?} as {expected}")]
    Parse { expected: FieldType, text: String },

    /// Field name missing from a registry
    #[error("Field not found: {0}")]
    NotFound(String),

    /// Value with no SQL literal form
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Statement rejected or failed by the engine
    #[error("Execution error: {0}")]
    Execution(String),

    /// Gateway not connected or database not registered
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an Execution error from any engine error
    pub fn execution(err: impl Display) -> Self {
        Error::Execution(err.to_string())
    }

    /// Create a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Error::Connection(message.into())
    }

    /// Create a Parse error
    pub fn parse(expected: FieldType, text: impl Into<String>) -> Self {
        Error::Parse {
            expected,
            text: text.into(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::execution(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;
