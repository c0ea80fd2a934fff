use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, Recipient, WebAppInfo,
};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use crate::commands::{Command, ReplyButton};
use crate::config::Config;
use crate::platform::ChannelSender;

/// Callback payload of the placeholder button shown when the mini app URL is unusable.
const WEBAPP_UNAVAILABLE: &str = "webapp_unavailable";

/// Numeric ids address chats directly; anything else is taken as a channel username.
fn recipient(channel: &str) -> Recipient {
    match channel.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(channel.to_string()),
    }
}

#[async_trait]
impl ChannelSender for Bot {
    async fn send_markdown(&self, channel: &str, text: &str) -> Result<()> {
        self.send_message(recipient(channel), text)
            .parse_mode(ParseMode::MarkdownV2)
            .await
            .with_context(|| format!("Failed to send message to {}", channel))?;
        Ok(())
    }
}

/// Build the inline keyboard for a reply button.
///
/// An unparsable URL (including an empty one) still renders the button, but as
/// an inert callback instead of a web app launcher.
pub fn keyboard(button: &ReplyButton) -> InlineKeyboardMarkup {
    let inline = match button.url.parse() {
        Ok(url) => InlineKeyboardButton::web_app(button.label.clone(), WebAppInfo { url }),
        Err(_) => InlineKeyboardButton::callback(button.label.clone(), WEBAPP_UNAVAILABLE),
    };
    InlineKeyboardMarkup::new(vec![vec![inline]])
}

/// Run the command responder with long polling until ctrl-c.
pub async fn run(bot: Bot, config: Arc<Config>) -> Result<()> {
    info!("Starting Telegram platform...");

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![config])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Telegram platform stopped");
    Ok(())
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    config: Arc<Config>,
) -> ResponseResult<()> {
    debug!("Command {:?} in chat {}", cmd, msg.chat.id);

    let reply = cmd.reply(&config.webapp_url);
    let mut request = bot
        .send_message(msg.chat.id, reply.text)
        .parse_mode(ParseMode::MarkdownV2);
    if let Some(button) = &reply.button {
        request = request.reply_markup(keyboard(button));
    }
    request.await?;

    Ok(())
}

async fn handle_callback(bot: Bot, query: CallbackQuery) -> ResponseResult<()> {
    if query.data.as_deref() == Some(WEBAPP_UNAVAILABLE) {
        bot.answer_callback_query(query.id)
            .text("The Grimoire is not available right now.")
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn button(url: &str) -> ReplyButton {
        ReplyButton {
            label: "📖 Open".to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_bot_handle_is_shareable() {
        fn assert_shareable<T: Clone + Send + Sync + 'static>() {}
        assert_shareable::<Bot>();
    }

    #[test]
    fn test_numeric_channel_is_chat_id() {
        assert_eq!(recipient("-1001234567890"), Recipient::Id(ChatId(-1001234567890)));
    }

    #[test]
    fn test_named_channel_is_username() {
        assert_eq!(
            recipient("@eldoria_feedback"),
            Recipient::ChannelUsername("@eldoria_feedback".to_string())
        );
    }

    #[test]
    fn test_keyboard_with_valid_url_opens_web_app() {
        let markup = keyboard(&button("https://example.com/grimoire"));
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0].len(), 1);

        let inline = &markup.inline_keyboard[0][0];
        assert_eq!(inline.text, "📖 Open");
        match &inline.kind {
            InlineKeyboardButtonKind::WebApp(info) => {
                assert_eq!(info.url.as_str(), "https://example.com/grimoire");
            }
            other => panic!("expected web app button, got {:?}", other),
        }
    }

    #[test]
    fn test_keyboard_with_empty_url_is_inert() {
        let markup = keyboard(&button(""));
        let inline = &markup.inline_keyboard[0][0];
        match &inline.kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, WEBAPP_UNAVAILABLE),
            other => panic!("expected callback button, got {:?}", other),
        }
    }
}
