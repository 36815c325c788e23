//! # relato_core - Shared types and configuration for relato
//!
//! This crate holds everything the conversation and portal layers share:
//! - The static base catalog (report data partitions)
//! - User-facing and portal wire date formats with strict parsing
//! - The immutable application configuration loaded at startup
//! - Core error types

pub mod catalog;
pub mod config;
pub mod dates;
pub mod error;
pub mod types;

pub use catalog::*;
pub use config::*;
pub use dates::*;
pub use error::*;
pub use types::*;
