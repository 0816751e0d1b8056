use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file: {path}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse container export: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid container export: {0}")]
    InvalidContainer(String),

    #[error("Unknown severity: {0}")]
    InvalidSeverity(String),

    #[error("Unknown result status: {0}")]
    InvalidStatus(String),

    #[error("Unknown analysis module: {0}")]
    UnknownModule(String),

    #[error("Partial result requires a description of what was skipped")]
    MissingSkipReason,
}

pub type Result<T> = std::result::Result<T, AuditError>;
