//! Report acquisition client.
//!
//! Runs the fixed seven-step protocol against a fresh browser session and
//! delegates download detection to the watcher. Any step failure aborts the
//! whole sequence; the session teardown runs unconditionally.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use relato_core::{AppConfig, Base, DateRange, PortalCredentials, ReportArtifact};

use crate::driver::{PortalConnector, PortalDriver, ProtocolStep};
use crate::error::{PortalError, PortalResult};
use crate::watcher::DownloadWatcher;
use crate::webdriver::WebDriverConnector;

/// Report model selected on the form, by visible label.
pub const REPORT_MODEL_LABEL: &str = "Previsão";

/// Drives one report generation end to end.
pub struct ReportClient {
    connector: Arc<dyn PortalConnector>,
    credentials: PortalCredentials,
    watcher: DownloadWatcher,
}

impl ReportClient {
    pub fn new(
        connector: Arc<dyn PortalConnector>,
        credentials: PortalCredentials,
        watcher: DownloadWatcher,
    ) -> Self {
        Self {
            connector,
            credentials,
            watcher,
        }
    }

    /// Client with the real WebDriver backend, wired from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let watcher = DownloadWatcher::new(&config.download_dir)
            .poll_interval(config.poll_interval)
            .timeout(config.download_timeout);
        Self::new(
            Arc::new(WebDriverConnector::from_config(config)),
            config.credentials.clone(),
            watcher,
        )
    }

    /// Generate a report for `base` over `range` and return the downloaded
    /// artifact.
    ///
    /// The downloads directory is snapshotted before any browser work so
    /// that only a file appearing after the submit qualifies. The browser
    /// session is torn down whether the protocol succeeds or not; a teardown
    /// failure is logged and never masks the primary outcome.
    pub async fn generate(&self, base: &Base, range: &DateRange) -> PortalResult<ReportArtifact> {
        info!(
            base = %base.name,
            start = %range.wire_start(),
            end = %range.wire_end(),
            "Starting report generation"
        );

        let before = self.watcher.snapshot()?;
        let driver = self.connector.connect().await?;

        let result = self.run_protocol(driver.as_ref(), base, range, &before).await;

        if let Err(e) = driver.close().await {
            // Resource-leak guard: not surfaced to the user, but an operator
            // needs to know a browser process may have been left behind.
            warn!("Browser session teardown failed: {}", e);
        }

        match &result {
            Ok(artifact) => info!(path = %artifact.path.display(), "Report generated"),
            Err(e) => error!("Report generation failed: {}", e),
        }
        result
    }

    async fn run_protocol(
        &self,
        driver: &dyn PortalDriver,
        base: &Base,
        range: &DateRange,
        before: &std::collections::HashSet<std::ffi::OsString>,
    ) -> PortalResult<ReportArtifact> {
        run_step(ProtocolStep::OpenLogin, driver.open_login()).await?;
        run_step(ProtocolStep::SignIn, driver.sign_in(&self.credentials)).await?;
        run_step(ProtocolStep::OpenReportForm, driver.open_report_form()).await?;
        run_step(
            ProtocolStep::SelectReportModel,
            driver.select_report_model(REPORT_MODEL_LABEL),
        )
        .await?;
        run_step(ProtocolStep::SelectBase, driver.select_base(&base.name)).await?;
        run_step(ProtocolStep::SubmitDates, driver.submit_dates(range)).await?;

        match self.watcher.wait_for_new_file(before).await? {
            Some(path) => Ok(ReportArtifact::new(path)),
            None => Err(PortalError::DownloadTimeout {
                dir: self.watcher.dir().to_path_buf(),
                timeout_secs: self.watcher.deadline().as_secs(),
            }),
        }
    }
}

/// Run one protocol step, attaching the step to any failure.
async fn run_step<F>(step: ProtocolStep, fut: F) -> PortalResult<()>
where
    F: std::future::Future<Output = PortalResult<()>>,
{
    debug!(step = %step, "Running portal step");
    fut.await.map_err(|e| PortalError::Step {
        step,
        message: e.to_string(),
    })
}
