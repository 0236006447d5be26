//! Error types for VulnMatch

use thiserror::Error;

/// Result type alias using VulnMatch Error
pub type Result<T> = std::result::Result<T, Error>;

/// VulnMatch error types
#[derive(Error, Debug)]
pub enum Error {
    // === Storage ===
    #[error("database error: {0}")]
    Database(String),

    #[error("vulnerability database not found at: {path}")]
    ArtifactNotFound { path: String },

    // === Ingestion ===
    #[error("{entity} '{name}' not present")]
    MissingReference { entity: &'static str, name: String },

    #[error("invalid build parameters: {0}")]
    InvalidParams(String),

    // === Configuration ===
    #[error("configuration error: {0}")]
    Configuration(String),

    // === IO / decoding ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Check if this error is fatal to an ingestion run (the caller should
    /// discard the partial artifact).
    pub fn is_fatal_to_build(&self) -> bool {
        !matches!(self, Error::Configuration(_))
    }

    /// Get an error code for logging/metrics
    pub fn code(&self) -> &'static str {
        match self {
            Error::Database(_) => "DATABASE_ERROR",
            Error::ArtifactNotFound { .. } => "ARTIFACT_NOT_FOUND",
            Error::MissingReference { .. } => "MISSING_REFERENCE",
            Error::InvalidParams(_) => "INVALID_PARAMS",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Parse(_) => "PARSE_ERROR",
        }
    }
}
