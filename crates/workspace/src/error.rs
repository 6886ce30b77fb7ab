use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkspaceError>;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No base directory is open; cannot resolve {0}")]
    NoBaseDirectory(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Could not determine a file path for the pasted content; specify one explicitly")]
    AmbiguousPath,

    #[error("No active files to generate the prompt")]
    NothingToCompose,

    #[error("Document host failed for {}: {message}", path.display())]
    Host { path: PathBuf, message: String },

    #[error("{label} failed after {attempts} attempts: {source}")]
    RetryExhausted {
        label: String,
        attempts: u32,
        #[source]
        source: Box<WorkspaceError>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Session file {} could not be encoded: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<codeprep_text::TextError> for WorkspaceError {
    fn from(err: codeprep_text::TextError) -> Self {
        match err {
            codeprep_text::TextError::NoBaseDirectory { path } => Self::NoBaseDirectory(path),
            codeprep_text::TextError::Validation(msg) => Self::Validation(msg),
        }
    }
}

impl WorkspaceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn host(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Host {
            path: path.into(),
            message: message.into(),
        }
    }
}
