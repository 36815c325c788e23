//! Download completion detector.
//!
//! The portal triggers the report download inside an opaque browser process;
//! the only observable completion signal is a new file on disk. The watcher
//! snapshots the directory before the form submit and then polls for a new
//! entry with the target extension, skipping the browser's partial-download
//! marker.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Extension of a completed report artifact.
pub const REPORT_EXTENSION: &str = ".pdf";

/// Chrome's in-progress download marker.
pub const PARTIAL_SUFFIX: &str = ".crdownload";

/// Polls a directory for the appearance of a new, fully-written report file.
#[derive(Debug, Clone)]
pub struct DownloadWatcher {
    dir: PathBuf,
    extension: String,
    partial_suffix: String,
    poll_interval: Duration,
    timeout: Duration,
}

impl DownloadWatcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: REPORT_EXTENSION.to_string(),
            partial_suffix: PARTIAL_SUFFIX.to_string(),
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn deadline(&self) -> Duration {
        self.timeout
    }

    /// The directory's entry names right now. Taken before the form submit
    /// so that only files appearing afterwards qualify.
    pub fn snapshot(&self) -> io::Result<HashSet<OsString>> {
        let mut names = HashSet::new();
        for entry in fs::read_dir(&self.dir)? {
            names.insert(entry?.file_name());
        }
        Ok(names)
    }

    /// Poll until a new qualifying file appears or the deadline passes.
    ///
    /// Returns `Ok(None)` on deadline; the caller decides whether absence is
    /// an error. A file present in `before` is never returned, and neither
    /// is one still carrying the partial-download suffix.
    pub async fn wait_for_new_file(
        &self,
        before: &HashSet<OsString>,
    ) -> io::Result<Option<PathBuf>> {
        info!(dir = %self.dir.display(), "Waiting for the report download to finish");
        let deadline = Instant::now() + self.timeout;

        loop {
            for name in self.snapshot()?.difference(before) {
                if self.qualifies(name) {
                    let path = self.dir.join(name);
                    info!(path = %path.display(), "New report file found");
                    return Ok(Some(path));
                }
                debug!(name = %name.to_string_lossy(), "Ignoring non-qualifying entry");
            }
            if Instant::now() >= deadline {
                warn!(
                    dir = %self.dir.display(),
                    timeout_secs = self.timeout.as_secs(),
                    "Deadline passed without a report file"
                );
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn qualifies(&self, name: &OsString) -> bool {
        let name = name.to_string_lossy();
        name.ends_with(&self.extension) && !name.ends_with(&self.partial_suffix)
    }
}
