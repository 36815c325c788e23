//! Error types for the chat module.

use thiserror::Error;

/// Result type alias for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors that can occur while handling chat events.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error(transparent)]
    Core(#[from] relato_core::CoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}
