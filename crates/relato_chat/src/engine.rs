//! The conversation state machine.
//!
//! Transitions: entry command → AwaitingBase → AwaitingStartDate →
//! AwaitingEndDate → generation → done (session removed). Invalid input
//! never advances the state and never loses previously collected fields.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use relato_core::{dates, Base, BaseCatalog, DateRange, ReportArtifact};
use relato_portal::{PortalError, ReportClient};

use crate::error::{ChatError, ChatResult};
use crate::gateway::{ChatGateway, ChatId};
use crate::messages;
use crate::session::{ConversationSession, SessionRegistry, SessionState};

/// The engine's view of the portal layer: one request, one artifact or one
/// typed failure.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, base: &Base, range: &DateRange)
        -> Result<ReportArtifact, PortalError>;
}

#[async_trait]
impl ReportGenerator for ReportClient {
    async fn generate(
        &self,
        base: &Base,
        range: &DateRange,
    ) -> Result<ReportArtifact, PortalError> {
        ReportClient::generate(self, base, range).await
    }
}

/// Conversation engine bound to one gateway and one generator.
pub struct ConversationEngine {
    catalog: BaseCatalog,
    gateway: Arc<dyn ChatGateway>,
    generator: Arc<dyn ReportGenerator>,
    sessions: SessionRegistry,
    /// Bounds simultaneous generations; one permit means serialized.
    permits: Semaphore,
    require_ordered_range: bool,
}

impl ConversationEngine {
    pub fn new(
        catalog: BaseCatalog,
        gateway: Arc<dyn ChatGateway>,
        generator: Arc<dyn ReportGenerator>,
    ) -> Self {
        Self {
            catalog,
            gateway,
            generator,
            sessions: SessionRegistry::new(),
            permits: Semaphore::new(1),
            require_ordered_range: false,
        }
    }

    /// Allow up to `n` generations in flight (default 1).
    pub fn max_concurrent_reports(mut self, n: usize) -> Self {
        self.permits = Semaphore::new(n.max(1));
        self
    }

    /// Reject end dates earlier than the start date (default off).
    pub fn require_ordered_range(mut self, require: bool) -> Self {
        self.require_ordered_range = require;
        self
    }

    /// Entry command: open the base menu. Replaces any active session.
    pub async fn handle_entry(&self, chat: ChatId) -> ChatResult<()> {
        info!(%chat, "Starting a report conversation");
        let options: Vec<String> = self.catalog.all().iter().map(|b| b.name.clone()).collect();
        let menu = self
            .gateway
            .send_menu(chat, messages::MSG_SELECT_BASE, &options)
            .await?;
        self.sessions
            .replace(chat, ConversationSession::awaiting_base(Some(menu)));
        Ok(())
    }

    /// Menu selection event. Ignored outside AwaitingBase or for data that
    /// does not name a catalog base.
    pub async fn handle_selection(&self, chat: ChatId, data: &str) -> ChatResult<()> {
        let Some(session) = self.sessions.get(chat) else {
            debug!(%chat, "Selection without an active session, ignoring");
            return Ok(());
        };
        if session.state != SessionState::AwaitingBase {
            debug!(%chat, state = ?session.state, "Selection in a non-selection state, ignoring");
            return Ok(());
        }
        let Ok(base) = self.catalog.by_name(data) else {
            debug!(%chat, data, "Selection does not match any base, ignoring");
            return Ok(());
        };
        let base = base.clone();

        info!(%chat, base = %base.name, "Base selected");
        if let Some(menu) = session.menu_message {
            self.gateway
                .edit_text(chat, menu, &messages::base_selected(&base.name))
                .await?;
        }
        self.gateway
            .send_text(chat, messages::MSG_START_PROMPT)
            .await?;
        self.sessions.update(chat, |s| {
            s.base = Some(base);
            s.state = SessionState::AwaitingStartDate;
        });
        Ok(())
    }

    /// Free-text event: date input in the date states, ignored elsewhere.
    pub async fn handle_text(&self, chat: ChatId, text: &str) -> ChatResult<()> {
        let Some(session) = self.sessions.get(chat) else {
            return Ok(());
        };
        match session.state {
            SessionState::AwaitingBase => Ok(()),
            SessionState::AwaitingStartDate => self.receive_start_date(chat, text).await,
            SessionState::AwaitingEndDate => self.receive_end_date(chat, session, text).await,
        }
    }

    /// Cancel command: discard the session, if one exists. Once a generation
    /// has been dispatched the session is already gone and there is nothing
    /// to abort.
    pub async fn handle_cancel(&self, chat: ChatId) -> ChatResult<()> {
        if self.sessions.remove(chat).is_some() {
            info!(%chat, "Conversation cancelled");
            self.gateway.send_text(chat, messages::MSG_CANCELLED).await
        } else {
            self.gateway
                .send_text(chat, messages::MSG_NOTHING_TO_CANCEL)
                .await
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.active_count()
    }

    async fn receive_start_date(&self, chat: ChatId, text: &str) -> ChatResult<()> {
        match dates::parse_user_date(text) {
            Ok(start) => {
                self.sessions.update(chat, |s| {
                    s.start = Some(start);
                    s.state = SessionState::AwaitingEndDate;
                });
                self.gateway.send_text(chat, messages::MSG_END_PROMPT).await
            }
            Err(_) => {
                debug!(%chat, text, "Invalid start date, re-prompting");
                self.gateway
                    .send_text(chat, messages::MSG_START_INVALID)
                    .await
            }
        }
    }

    async fn receive_end_date(
        &self,
        chat: ChatId,
        session: ConversationSession,
        text: &str,
    ) -> ChatResult<()> {
        let end = match dates::parse_user_date(text) {
            Ok(end) => end,
            Err(_) => {
                debug!(%chat, text, "Invalid end date, re-prompting");
                return self
                    .gateway
                    .send_text(chat, messages::MSG_END_INVALID)
                    .await;
            }
        };

        let (base, start) = match (session.base, session.start) {
            (Some(base), Some(start)) => (base, start),
            _ => {
                // Unreachable through normal transitions; drop the broken
                // session rather than generating from partial input.
                self.sessions.remove(chat);
                return Err(ChatError::Internal(format!(
                    "session for chat {} reached AwaitingEndDate without base/start",
                    chat
                )));
            }
        };

        if self.require_ordered_range && end < start {
            debug!(%chat, "End date precedes start date, re-prompting");
            return self
                .gateway
                .send_text(chat, messages::MSG_END_BEFORE_START)
                .await;
        }

        // Past the cancellation point: the session ends here and the
        // generation runs to completion or failure.
        self.sessions.remove(chat);
        let range = DateRange::new(start, end);
        self.run_generation(chat, base, range).await
    }

    async fn run_generation(&self, chat: ChatId, base: Base, range: DateRange) -> ChatResult<()> {
        self.gateway
            .send_text(chat, messages::MSG_GENERATING)
            .await?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ChatError::Internal("generation semaphore closed".to_string()))?;

        match self.generator.generate(&base, &range).await {
            Ok(artifact) => {
                self.gateway
                    .send_document(chat, &artifact.path, messages::REPORT_FILENAME)
                    .await
            }
            Err(e) => {
                // Full detail goes to the log only; the user gets exactly one
                // generic failure notice.
                error!(%chat, base = %base.name, "Report generation failed: {}", e);
                self.gateway
                    .send_text(chat, messages::MSG_GENERATION_FAILED)
                    .await
            }
        }
    }
}
