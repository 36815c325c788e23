//! Error types for the core module.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in shared core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value '{value}' for {var}")]
    InvalidEnvValue { var: &'static str, value: String },

    #[error("Invalid date '{0}': expected DD/MM/YYYY")]
    InvalidDate(String),

    #[error("Unknown base: {0}")]
    UnknownBase(String),
}
