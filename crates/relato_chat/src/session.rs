//! Conversation sessions and their registry.
//!
//! One session per chat id, created by the entry command and discarded on
//! completion or cancellation. "Done" is not a stored state: a finished
//! session is simply removed.

use std::collections::HashMap;

use chrono::NaiveDate;
use parking_lot::Mutex;

use relato_core::Base;

use crate::gateway::{ChatId, MessageRef};

/// Where the conversation currently waits for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingBase,
    AwaitingStartDate,
    AwaitingEndDate,
}

/// Per-chat mutable conversation record.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub state: SessionState,
    /// The menu message, edited into a confirmation once a base is picked.
    pub menu_message: Option<MessageRef>,
    pub base: Option<Base>,
    pub start: Option<NaiveDate>,
}

impl ConversationSession {
    pub fn awaiting_base(menu_message: Option<MessageRef>) -> Self {
        Self {
            state: SessionState::AwaitingBase,
            menu_message,
            base: None,
            start: None,
        }
    }
}

/// In-memory session store keyed by chat identity.
///
/// Lock scope is a plain map access; nothing is held across awaits.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<ChatId, ConversationSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a session for the chat, replacing any existing one.
    pub fn replace(&self, chat: ChatId, session: ConversationSession) {
        self.sessions.lock().insert(chat, session);
    }

    /// Remove and return the chat's session, if any.
    pub fn remove(&self, chat: ChatId) -> Option<ConversationSession> {
        self.sessions.lock().remove(&chat)
    }

    /// Clone of the chat's current session, if any.
    pub fn get(&self, chat: ChatId) -> Option<ConversationSession> {
        self.sessions.lock().get(&chat).cloned()
    }

    /// Mutate the chat's session in place; no-op when absent.
    pub fn update<F>(&self, chat: ChatId, f: F)
    where
        F: FnOnce(&mut ConversationSession),
    {
        if let Some(session) = self.sessions.lock().get_mut(&chat) {
            f(session);
        }
    }

    pub fn active_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_discards_previous_session() {
        let registry = SessionRegistry::new();
        let chat = ChatId(7);

        let mut first = ConversationSession::awaiting_base(Some(MessageRef(1)));
        first.base = Some(Base::new("1", "BASE BAURU"));
        registry.replace(chat, first);

        registry.replace(chat, ConversationSession::awaiting_base(Some(MessageRef(2))));

        let current = registry.get(chat).unwrap();
        assert_eq!(current.state, SessionState::AwaitingBase);
        assert!(current.base.is_none());
        assert_eq!(current.menu_message, Some(MessageRef(2)));
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_sessions_are_isolated_per_chat() {
        let registry = SessionRegistry::new();
        registry.replace(ChatId(1), ConversationSession::awaiting_base(None));
        registry.replace(ChatId(2), ConversationSession::awaiting_base(None));

        registry.update(ChatId(1), |s| s.state = SessionState::AwaitingStartDate);

        assert_eq!(
            registry.get(ChatId(1)).unwrap().state,
            SessionState::AwaitingStartDate
        );
        assert_eq!(
            registry.get(ChatId(2)).unwrap().state,
            SessionState::AwaitingBase
        );

        assert!(registry.remove(ChatId(1)).is_some());
        assert!(registry.remove(ChatId(1)).is_none());
        assert_eq!(registry.active_count(), 1);
    }
}
