//! Error types for the portal module.

use std::path::PathBuf;

use thiserror::Error;

use crate::driver::ProtocolStep;

/// Result type alias for portal operations.
pub type PortalResult<T> = Result<T, PortalError>;

/// Errors that can occur while acquiring a report.
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Could not start a browser session: {0}")]
    Connect(String),

    #[error("Portal step '{step}' failed: {message}")]
    Step { step: ProtocolStep, message: String },

    #[error("Timed out after {timeout_secs}s waiting for {condition}")]
    WaitTimeout { condition: String, timeout_secs: u64 },

    #[error("No report file appeared in {} within {timeout_secs}s", .dir.display())]
    DownloadTimeout { dir: PathBuf, timeout_secs: u64 },

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
