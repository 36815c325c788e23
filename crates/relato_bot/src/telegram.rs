//! Telegram wiring: inbound dispatcher and outbound gateway.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MaybeInaccessibleMessage, MessageId,
};
use tracing::{debug, error, info};

use relato_chat::{ChatGateway, ChatId, ChatError, ChatResult, ConversationEngine, MessageRef};

const ENTRY_COMMAND: &str = "/relatorio";
const CANCEL_COMMAND: &str = "/cancel";

/// Menu buttons per keyboard row.
const MENU_COLUMNS: usize = 2;

/// Outbound gateway backed by the Telegram Bot API.
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn gateway_err(e: teloxide::RequestError) -> ChatError {
    ChatError::Gateway(e.to_string())
}

#[async_trait]
impl ChatGateway for TelegramGateway {
    async fn send_text(&self, chat: ChatId, text: &str) -> ChatResult<()> {
        self.bot
            .send_message(teloxide::types::ChatId(chat.0), text)
            .await
            .map_err(gateway_err)?;
        Ok(())
    }

    async fn send_menu(
        &self,
        chat: ChatId,
        text: &str,
        options: &[String],
    ) -> ChatResult<MessageRef> {
        let keyboard: Vec<Vec<InlineKeyboardButton>> = options
            .chunks(MENU_COLUMNS)
            .map(|row| {
                row.iter()
                    .map(|name| InlineKeyboardButton::callback(name.clone(), name.clone()))
                    .collect()
            })
            .collect();

        let message = self
            .bot
            .send_message(teloxide::types::ChatId(chat.0), text)
            .reply_markup(InlineKeyboardMarkup::new(keyboard))
            .await
            .map_err(gateway_err)?;
        Ok(MessageRef(message.id.0))
    }

    async fn edit_text(&self, chat: ChatId, message: MessageRef, text: &str) -> ChatResult<()> {
        self.bot
            .edit_message_text(teloxide::types::ChatId(chat.0), MessageId(message.0), text)
            .await
            .map_err(gateway_err)?;
        Ok(())
    }

    async fn send_document(&self, chat: ChatId, path: &Path, filename: &str) -> ChatResult<()> {
        let document = InputFile::file(path.to_path_buf()).file_name(filename.to_string());
        self.bot
            .send_document(teloxide::types::ChatId(chat.0), document)
            .await
            .map_err(gateway_err)?;
        Ok(())
    }
}

/// Inbound dispatcher: maps Telegram updates onto engine events.
pub struct TelegramChannel {
    bot: Bot,
    engine: Arc<ConversationEngine>,
}

impl TelegramChannel {
    pub fn new(bot: Bot, engine: Arc<ConversationEngine>) -> Self {
        Self { bot, engine }
    }

    pub async fn run(self: Arc<Self>) {
        info!("Starting the Telegram dispatcher");

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint({
                let channel = Arc::clone(&self);
                move |msg: Message| {
                    let channel = Arc::clone(&channel);
                    async move {
                        channel.handle_message(msg).await;
                        respond(())
                    }
                }
            }))
            .branch(Update::filter_callback_query().endpoint({
                let channel = Arc::clone(&self);
                move |q: CallbackQuery| {
                    let channel = Arc::clone(&channel);
                    async move {
                        channel.handle_callback(q).await;
                        respond(())
                    }
                }
            }));

        Dispatcher::builder(self.bot.clone(), handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    async fn handle_message(&self, msg: Message) {
        let chat = ChatId(msg.chat.id.0);
        let Some(text) = msg.text() else {
            return;
        };
        let text = text.trim();

        let result = if is_command(text, ENTRY_COMMAND) {
            self.engine.handle_entry(chat).await
        } else if is_command(text, CANCEL_COMMAND) {
            self.engine.handle_cancel(chat).await
        } else if text.starts_with('/') {
            debug!(%chat, text, "Ignoring unknown command");
            Ok(())
        } else {
            self.engine.handle_text(chat, text).await
        };

        if let Err(e) = result {
            error!(%chat, "Failed to handle message: {}", e);
        }
    }

    async fn handle_callback(&self, q: CallbackQuery) {
        let Some(data) = q.data.clone() else {
            return;
        };
        let chat = match q.message {
            Some(MaybeInaccessibleMessage::Regular(ref m)) => ChatId(m.chat.id.0),
            _ => return,
        };

        // Stop the client-side loading spinner.
        if let Err(e) = self.bot.answer_callback_query(q.id).await {
            debug!(%chat, "Failed to answer callback query: {}", e);
        }

        if let Err(e) = self.engine.handle_selection(chat, &data).await {
            error!(%chat, "Failed to handle selection: {}", e);
        }
    }
}

/// `/cmd` with an optional `@BotName` suffix.
fn is_command(text: &str, command: &str) -> bool {
    match text.strip_prefix(command) {
        Some(rest) => rest.is_empty() || rest.starts_with('@'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_command() {
        assert!(is_command("/relatorio", ENTRY_COMMAND));
        assert!(is_command("/relatorio@relato_bot", ENTRY_COMMAND));
        assert!(!is_command("/relatorios", ENTRY_COMMAND));
        assert!(!is_command("relatorio", ENTRY_COMMAND));
        assert!(is_command("/cancel", CANCEL_COMMAND));
    }
}
