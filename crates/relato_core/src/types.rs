//! Core data types shared across the workspace.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::WIRE_DATE_FORMAT;

/// A named report data partition selectable by the user.
///
/// Identity towards the portal is the display `name`; the `id` is the
/// portal's internal value and is carried along unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    /// Portal-internal identifier (opaque; `-1` is the reserved "all" entry).
    pub id: String,
    /// Display name as shown to the user and typed into the portal selector.
    pub name: String,
}

impl Base {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An inclusive date range for a report request.
///
/// No ordering between `start` and `end` is enforced here; whether the
/// engine rejects inverted ranges is a configuration decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Start date in the portal wire format (`YYYY-MM-DD`).
    pub fn wire_start(&self) -> String {
        self.start.format(WIRE_DATE_FORMAT).to_string()
    }

    /// End date in the portal wire format (`YYYY-MM-DD`).
    pub fn wire_end(&self) -> String {
        self.end.format(WIRE_DATE_FORMAT).to_string()
    }
}

/// A generated report file discovered in the downloads directory.
///
/// Consumed immediately to stream the file back to the user; not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    /// Absolute path of the downloaded file.
    pub path: PathBuf,
    /// When the watcher first saw the completed file.
    pub discovered_at: DateTime<Utc>,
}

impl ReportArtifact {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            discovered_at: Utc::now(),
        }
    }
}
