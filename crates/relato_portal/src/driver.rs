//! Portal driver trait and protocol step identifiers.
//!
//! The driver seam splits the *what* (the fixed report-form protocol, owned
//! by [`crate::client::ReportClient`]) from the *how* (WebDriver calls or a
//! scripted mock). One driver instance corresponds to one browser session
//! and never outlives a single `generate()` call.

use std::fmt;

use async_trait::async_trait;

use relato_core::{DateRange, PortalCredentials};

use crate::error::PortalResult;

/// The distinct steps of the acquisition protocol, used for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolStep {
    OpenLogin,
    SignIn,
    OpenReportForm,
    SelectReportModel,
    SelectBase,
    SubmitDates,
    AwaitDownload,
}

impl fmt::Display for ProtocolStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenLogin => "open_login",
            Self::SignIn => "sign_in",
            Self::OpenReportForm => "open_report_form",
            Self::SelectReportModel => "select_report_model",
            Self::SelectBase => "select_base",
            Self::SubmitDates => "submit_dates",
            Self::AwaitDownload => "await_download",
        };
        write!(f, "{}", name)
    }
}

/// One live browser session against the portal.
///
/// Every wait inside a step is bounded by the session's uniform wait budget;
/// a step either completes or fails, there are no partial results.
#[async_trait]
pub trait PortalDriver: Send + Sync {
    /// Navigate to the login page and wait for the identity field.
    async fn open_login(&self) -> PortalResult<()>;

    /// Submit credentials and wait for the authenticated landing page.
    async fn sign_in(&self, credentials: &PortalCredentials) -> PortalResult<()>;

    /// Deep-link straight to the report form.
    async fn open_report_form(&self) -> PortalResult<()>;

    /// Pick the report model from the standard dropdown by visible label.
    async fn select_report_model(&self, label: &str) -> PortalResult<()>;

    /// Drive the searchable base selector; only an exact normalized-text
    /// match of `name` may be accepted.
    async fn select_base(&self, name: &str) -> PortalResult<()>;

    /// Write both dates into the form in wire format and submit it.
    async fn submit_dates(&self, range: &DateRange) -> PortalResult<()>;

    /// Tear the browser session down. Runs on success and failure alike.
    async fn close(self: Box<Self>) -> PortalResult<()>;
}

/// Factory for per-generation driver sessions.
#[async_trait]
pub trait PortalConnector: Send + Sync {
    async fn connect(&self) -> PortalResult<Box<dyn PortalDriver>>;
}

/// Collapse runs of whitespace and trim, like XPath `normalize-space`.
pub fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Exact-match policy for selector options: an option is accepted only when
/// its normalized text equals the requested base name. A name that is a
/// substring of another option must not match it.
pub fn is_exact_match(option_text: &str, base_name: &str) -> bool {
    normalize_space(option_text) == base_name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_space() {
        assert_eq!(normalize_space("  BASE   BAURU \n"), "BASE BAURU");
        assert_eq!(normalize_space("BASE BAURU"), "BASE BAURU");
        assert_eq!(normalize_space(""), "");
    }

    #[test]
    fn test_exact_match_policy() {
        assert!(is_exact_match("BASE BAURU", "BASE BAURU"));
        assert!(is_exact_match("  BASE BAURU  ", "BASE BAURU"));

        // Substring containment is never a match, in either direction.
        assert!(!is_exact_match("BASE BAURU VT", "BASE BAURU"));
        assert!(!is_exact_match("BASE BAURU", "BASE BAURU VT"));
        assert!(!is_exact_match("BAURU", "BASE BAURU"));
    }
}
