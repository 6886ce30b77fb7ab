use thiserror::Error;

/// Result type for text engine operations
pub type Result<T> = std::result::Result<T, TextError>;

/// Errors raised by the text engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    /// A relative path was given but no base directory is available
    #[error("No base directory available to resolve relative path: {path}")]
    NoBaseDirectory { path: String },

    /// Input that cannot be turned into a file block
    #[error("Validation error: {0}")]
    Validation(String),
}

impl TextError {
    /// Create a missing-base error for the given path
    pub fn no_base_directory(path: impl Into<String>) -> Self {
        Self::NoBaseDirectory { path: path.into() }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
