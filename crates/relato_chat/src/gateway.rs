//! Outbound chat gateway seam.
//!
//! The engine only ever talks to the chat platform through this trait;
//! the Telegram implementation lives in the binary crate and the mock in
//! [`crate::mock`].

use std::path::Path;

use async_trait::async_trait;

use crate::error::ChatResult;

/// Chat/conversation identity. One session at most is active per chat id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a previously sent message, for later edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef(pub i32);

/// Outbound operations the engine needs from the chat platform.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, chat: ChatId, text: &str) -> ChatResult<()>;

    /// Send a message with one interactive option per entry; selecting an
    /// option delivers its text back as a selection event.
    async fn send_menu(&self, chat: ChatId, text: &str, options: &[String])
        -> ChatResult<MessageRef>;

    /// Replace the text of a previously sent message.
    async fn edit_text(&self, chat: ChatId, message: MessageRef, text: &str) -> ChatResult<()>;

    /// Send a local file as a document.
    async fn send_document(&self, chat: ChatId, path: &Path, filename: &str) -> ChatResult<()>;
}
