//! Mock portal driver for testing.
//!
//! Provides a configurable in-memory implementation of the PortalDriver
//! trait so client and engine behavior can be tested without a browser or a
//! live portal. All state lives behind `Arc`s; cloning a `MockPortal` shares
//! the journal, so tests keep a handle while the client consumes the boxed
//! driver.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use relato_core::{DateRange, PortalCredentials};

use crate::driver::{is_exact_match, PortalConnector, PortalDriver, ProtocolStep};
use crate::error::{PortalError, PortalResult};

/// Mock portal driver.
///
/// Records every step in order, can fail at a scripted step, enforces the
/// exact-match policy against a configured option list, and optionally drops
/// a fake report file into a directory when the form is submitted.
#[derive(Clone, Default)]
pub struct MockPortal {
    /// Steps executed, in order (including `close`).
    journal: Arc<RwLock<Vec<String>>>,
    /// Step to fail at, if any.
    fail_at: Arc<RwLock<Option<ProtocolStep>>>,
    /// Selector options; `None` accepts any base name.
    options: Arc<RwLock<Option<Vec<String>>>>,
    /// When set, `submit_dates` writes `relatorio.pdf` here.
    download_into: Arc<RwLock<Option<PathBuf>>>,
    /// Credentials the portal saw.
    signed_in_as: Arc<RwLock<Option<String>>>,
    /// Base name the portal saw.
    selected_base: Arc<RwLock<Option<String>>>,
    /// Report model label the portal saw.
    selected_model: Arc<RwLock<Option<String>>>,
    /// Wire-format dates the portal saw.
    submitted_range: Arc<RwLock<Option<(String, String)>>>,
    closed: Arc<AtomicBool>,
    /// Fail the teardown itself (leak-guard logging path).
    fail_close: Arc<AtomicBool>,
}

impl MockPortal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the selector to these options (exact-match policy applies).
    pub fn with_options(self, options: Vec<&str>) -> Self {
        *self.options.write() = Some(options.into_iter().map(String::from).collect());
        self
    }

    /// Fail when the given step runs.
    pub fn fail_at(self, step: ProtocolStep) -> Self {
        *self.fail_at.write() = Some(step);
        self
    }

    /// Simulate the portal's download: submitting the form writes
    /// `relatorio.pdf` into `dir`.
    pub fn download_into(self, dir: impl Into<PathBuf>) -> Self {
        *self.download_into.write() = Some(dir.into());
        self
    }

    /// Make the teardown itself fail.
    pub fn fail_close(self) -> Self {
        self.fail_close.store(true, Ordering::SeqCst);
        self
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.read().clone()
    }

    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn signed_in_as(&self) -> Option<String> {
        self.signed_in_as.read().clone()
    }

    pub fn selected_base(&self) -> Option<String> {
        self.selected_base.read().clone()
    }

    pub fn selected_model(&self) -> Option<String> {
        self.selected_model.read().clone()
    }

    pub fn submitted_range(&self) -> Option<(String, String)> {
        self.submitted_range.read().clone()
    }

    fn run_step(&self, step: ProtocolStep) -> PortalResult<()> {
        self.journal.write().push(step.to_string());
        if *self.fail_at.read() == Some(step) {
            return Err(PortalError::WaitTimeout {
                condition: format!("scripted failure at {}", step),
                timeout_secs: 0,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PortalDriver for MockPortal {
    async fn open_login(&self) -> PortalResult<()> {
        self.run_step(ProtocolStep::OpenLogin)
    }

    async fn sign_in(&self, credentials: &PortalCredentials) -> PortalResult<()> {
        self.run_step(ProtocolStep::SignIn)?;
        *self.signed_in_as.write() = Some(credentials.email.clone());
        Ok(())
    }

    async fn open_report_form(&self) -> PortalResult<()> {
        self.run_step(ProtocolStep::OpenReportForm)
    }

    async fn select_report_model(&self, label: &str) -> PortalResult<()> {
        self.run_step(ProtocolStep::SelectReportModel)?;
        *self.selected_model.write() = Some(label.to_string());
        Ok(())
    }

    async fn select_base(&self, name: &str) -> PortalResult<()> {
        self.run_step(ProtocolStep::SelectBase)?;
        if let Some(ref options) = *self.options.read() {
            if !options.iter().any(|option| is_exact_match(option, name)) {
                return Err(PortalError::WaitTimeout {
                    condition: format!("selector option with exact text '{}'", name),
                    timeout_secs: 0,
                });
            }
        }
        *self.selected_base.write() = Some(name.to_string());
        Ok(())
    }

    async fn submit_dates(&self, range: &DateRange) -> PortalResult<()> {
        self.run_step(ProtocolStep::SubmitDates)?;
        *self.submitted_range.write() = Some((range.wire_start(), range.wire_end()));
        if let Some(ref dir) = *self.download_into.read() {
            fs::write(dir.join("relatorio.pdf"), b"%PDF-1.4 mock")?;
        }
        Ok(())
    }

    async fn close(self: Box<Self>) -> PortalResult<()> {
        self.journal.write().push("close".to_string());
        self.closed.store(true, Ordering::SeqCst);
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(PortalError::Connect("session already gone".to_string()));
        }
        Ok(())
    }
}

/// Connector handing out clones of one shared mock portal.
#[derive(Clone, Default)]
pub struct MockConnector {
    portal: MockPortal,
    fail_connect: Arc<AtomicBool>,
}

impl MockConnector {
    pub fn new(portal: MockPortal) -> Self {
        Self {
            portal,
            fail_connect: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make `connect()` fail (browser could not be started).
    pub fn fail_connect(self) -> Self {
        self.fail_connect.store(true, Ordering::SeqCst);
        self
    }

    pub fn portal(&self) -> &MockPortal {
        &self.portal
    }
}

#[async_trait]
impl PortalConnector for MockConnector {
    async fn connect(&self) -> PortalResult<Box<dyn PortalDriver>> {
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(PortalError::Connect("mock connect failure".to_string()));
        }
        Ok(Box::new(self.portal.clone()))
    }
}
