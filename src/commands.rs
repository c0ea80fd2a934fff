use teloxide::utils::command::BotCommands;
use teloxide::utils::markdown::{bold, escape};

/// Commands the bot answers. Anything else falls through to the default handler.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "open the main menu")]
    Start,
    #[command(description = "show this help")]
    Help,
    #[command(description = "short game rules")]
    Rules,
}

/// A platform-neutral reply: MarkdownV2 text plus at most one button.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub button: Option<ReplyButton>,
}

/// Inline button that opens the mini app in the embedded view.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyButton {
    pub label: String,
    pub url: String,
}

pub const OPEN_GRIMOIRE: &str = "📖 Open the Grimoire";

impl Command {
    pub fn reply(&self, webapp_url: &str) -> Reply {
        match self {
            Command::Start => Reply {
                text: welcome_text(),
                button: Some(ReplyButton {
                    label: OPEN_GRIMOIRE.to_string(),
                    url: webapp_url.to_string(),
                }),
            },
            Command::Help => Reply {
                text: help_text(),
                button: None,
            },
            Command::Rules => Reply {
                text: rules_text(),
                button: None,
            },
        }
    }
}

fn welcome_text() -> String {
    format!(
        "⚔️ {}\n\n🎲 {}",
        bold(&escape("Welcome to the world of Shadows of Eldoria!")),
        escape(
            "Open the Grimoire to learn the rules, sink into the dark fantasy \
             atmosphere or leave your feedback."
        )
    )
}

fn help_text() -> String {
    format!(
        "📜 {}\n\n{}",
        bold(&escape("Bot commands:")),
        escape(
            "/start - Open the main menu\n\
             /help - Show this help\n\
             /rules - Short game rules"
        )
    )
}

fn rules_text() -> String {
    format!(
        "⚔️ {}\n\n{}\n\n📖 {}",
        bold(&escape("Shadows of Eldoria in brief:")),
        escape(
            "1️⃣ Gather a party of 2-5 heroes\n\
             2️⃣ Explore dungeons and fight monsters\n\
             3️⃣ Collect artifacts and level up your characters\n\
             4️⃣ Defeat the Dark Lord!"
        ),
        escape("The full rules are in the Grimoire.")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(Command::parse("/start", "grimoire_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/help", "grimoire_bot").unwrap(), Command::Help);
        assert_eq!(Command::parse("/rules", "grimoire_bot").unwrap(), Command::Rules);
    }

    #[test]
    fn test_unknown_command_is_not_parsed() {
        assert!(Command::parse("/dance", "grimoire_bot").is_err());
        assert!(Command::parse("hello", "grimoire_bot").is_err());
    }

    #[test]
    fn test_start_has_one_button_with_verbatim_url() {
        let reply = Command::Start.reply("https://example.com/grimoire?x=1");
        let button = reply.button.expect("start must carry a button");
        assert_eq!(button.url, "https://example.com/grimoire?x=1");
        assert_eq!(button.label, OPEN_GRIMOIRE);
        assert!(reply.text.contains("Welcome"));
    }

    #[test]
    fn test_start_with_empty_url_still_renders_button() {
        let reply = Command::Start.reply("");
        assert_eq!(reply.button.map(|b| b.url), Some(String::new()));
    }

    #[test]
    fn test_help_lists_commands() {
        let reply = Command::Help.reply("https://example.com");
        assert!(reply.button.is_none());
        for cmd in ["/start", "/help", "/rules"] {
            assert!(reply.text.contains(cmd), "missing {cmd}");
        }
    }

    #[test]
    fn test_rules_text_is_escaped() {
        let reply = Command::Rules.reply("");
        assert!(reply.button.is_none());
        assert!(reply.text.contains("2\\-5 heroes"));
        assert!(reply.text.contains("Dark Lord\\!"));
    }
}
