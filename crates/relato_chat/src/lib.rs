//! # relato_chat - Conversational engine
//!
//! A finite-state machine over inbound chat events: the entry command opens
//! a base-selection menu, two date prompts follow, and a completed session
//! hands off to the portal layer for report generation. The chat platform
//! sits behind the [`ChatGateway`] trait; the portal sits behind
//! [`ReportGenerator`]. Both have mock implementations for tests.

pub mod engine;
pub mod error;
pub mod gateway;
pub mod messages;
pub mod mock;
pub mod session;

pub use engine::*;
pub use error::*;
pub use gateway::*;
pub use messages::*;
pub use mock::*;
pub use session::*;
