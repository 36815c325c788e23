//! # relato_portal - Browser-driven report acquisition
//!
//! This crate turns a `(base, date range)` request into a downloaded PDF by
//! driving a real browser session through the Control Services portal:
//!
//! - [`PortalDriver`] / [`PortalConnector`] — the protocol-step seam, so the
//!   client logic is testable without a browser
//! - [`WebDriverConnector`] — the real backend over the WebDriver protocol
//! - [`MockPortal`] — scripted in-memory backend for tests
//! - [`DownloadWatcher`] — detects the externally-triggered file download
//! - [`ReportClient`] — the fixed seven-step acquisition protocol

pub mod client;
pub mod driver;
pub mod error;
pub mod mock;
pub mod watcher;
pub mod webdriver;

pub use client::*;
pub use driver::*;
pub use error::*;
pub use mock::*;
pub use watcher::*;
pub use webdriver::*;
