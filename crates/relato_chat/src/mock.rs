//! Mock gateway and generator for testing the engine.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use relato_core::{Base, DateRange, ReportArtifact};
use relato_portal::PortalError;

use crate::engine::ReportGenerator;
use crate::error::ChatResult;
use crate::gateway::{ChatGateway, ChatId, MessageRef};

/// One outbound gateway operation, as the user would see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text {
        chat: ChatId,
        text: String,
    },
    Menu {
        chat: ChatId,
        text: String,
        options: Vec<String>,
    },
    Edit {
        chat: ChatId,
        message: MessageRef,
        text: String,
    },
    Document {
        chat: ChatId,
        path: PathBuf,
        filename: String,
    },
}

/// Gateway that journals every outbound operation.
#[derive(Clone, Default)]
pub struct MockGateway {
    journal: Arc<RwLock<Vec<Outbound>>>,
    next_message: Arc<AtomicI32>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn journal(&self) -> Vec<Outbound> {
        self.journal.read().clone()
    }

    /// Texts sent to one chat, in order.
    pub fn texts_for(&self, chat: ChatId) -> Vec<String> {
        self.journal
            .read()
            .iter()
            .filter_map(|o| match o {
                Outbound::Text { chat: c, text } if *c == chat => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Documents sent to one chat.
    pub fn documents_for(&self, chat: ChatId) -> Vec<(PathBuf, String)> {
        self.journal
            .read()
            .iter()
            .filter_map(|o| match o {
                Outbound::Document {
                    chat: c,
                    path,
                    filename,
                } if *c == chat => Some((path.clone(), filename.clone())),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatGateway for MockGateway {
    async fn send_text(&self, chat: ChatId, text: &str) -> ChatResult<()> {
        self.journal.write().push(Outbound::Text {
            chat,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_menu(
        &self,
        chat: ChatId,
        text: &str,
        options: &[String],
    ) -> ChatResult<MessageRef> {
        let message = MessageRef(self.next_message.fetch_add(1, Ordering::SeqCst));
        self.journal.write().push(Outbound::Menu {
            chat,
            text: text.to_string(),
            options: options.to_vec(),
        });
        Ok(message)
    }

    async fn edit_text(&self, chat: ChatId, message: MessageRef, text: &str) -> ChatResult<()> {
        self.journal.write().push(Outbound::Edit {
            chat,
            message,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_document(&self, chat: ChatId, path: &Path, filename: &str) -> ChatResult<()> {
        self.journal.write().push(Outbound::Document {
            chat,
            path: path.to_path_buf(),
            filename: filename.to_string(),
        });
        Ok(())
    }
}

/// Generator returning a scripted result and journaling its invocations.
#[derive(Clone)]
pub struct MockGenerator {
    calls: Arc<RwLock<Vec<(Base, DateRange)>>>,
    result: Arc<RwLock<Result<PathBuf, String>>>,
}

impl MockGenerator {
    /// Every call succeeds with an artifact at `path`.
    pub fn succeeding(path: impl Into<PathBuf>) -> Self {
        Self {
            calls: Arc::default(),
            result: Arc::new(RwLock::new(Ok(path.into()))),
        }
    }

    /// Every call fails with a download timeout.
    pub fn failing() -> Self {
        Self {
            calls: Arc::default(),
            result: Arc::new(RwLock::new(Err("download timeout".to_string()))),
        }
    }

    pub fn calls(&self) -> Vec<(Base, DateRange)> {
        self.calls.read().clone()
    }
}

#[async_trait]
impl ReportGenerator for MockGenerator {
    async fn generate(
        &self,
        base: &Base,
        range: &DateRange,
    ) -> Result<ReportArtifact, PortalError> {
        self.calls.write().push((base.clone(), *range));
        match &*self.result.read() {
            Ok(path) => Ok(ReportArtifact::new(path.clone())),
            Err(_) => Err(PortalError::DownloadTimeout {
                dir: PathBuf::from("downloads"),
                timeout_secs: 60,
            }),
        }
    }
}
