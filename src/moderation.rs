use crate::config::{Config, DISCORD_MESSAGE_LIMIT};
use crate::links::extract_urls;
use crate::message::IncomingMessage;

/// Something the bot intends to do on Discord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send {
        channel_id: u64,
        content: String,
        /// Posted without pinging anyone.
        silent: bool,
    },
    Delete {
        channel_id: u64,
        message_id: u64,
    },
}

fn mention(user_id: u64) -> String {
    format!("<@{}>", user_id)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn greeting(config: &Config, user_id: u64) -> String {
    format!("{}, {}", mention(user_id), config.watched_user_greeting)
}

/// Moves a link post out of the scan channel: repost with attribution in the
/// report channel, delete the original, tell the author.
pub fn plan_relocation(message: &IncomingMessage, config: &Config) -> Vec<Action> {
    let Some(report_channel_id) = config.relocation_channel() else {
        return Vec::new();
    };
    if message.channel_id != config.scan_channel_id || message.author.is_bot {
        return Vec::new();
    }
    if extract_urls(&message.content).is_empty() {
        return Vec::new();
    }

    let author = mention(message.author.id);
    let repost = truncate_chars(
        &format!("User {} sends this message: {}", author, message.content),
        DISCORD_MESSAGE_LIMIT,
    );

    let mut actions = vec![
        Action::Send {
            channel_id: report_channel_id,
            content: repost,
            silent: true,
        },
        Action::Delete {
            channel_id: message.channel_id,
            message_id: message.id,
        },
        Action::Send {
            channel_id: message.channel_id,
            content: format!("{}, you reposted in the wrong neighborhood", author),
            silent: true,
        },
    ];

    if config.watched_user_id == Some(message.author.id) {
        actions.push(Action::Send {
            channel_id: message.channel_id,
            content: greeting(config, message.author.id),
            silent: false,
        });
    }

    actions
}

/// Greets the watched user when they join voice from not being in voice.
pub fn plan_voice_greeting(
    config: &Config,
    user_id: u64,
    before_channel: Option<u64>,
    after_channel: Option<u64>,
) -> Vec<Action> {
    if config.watched_user_id != Some(user_id) {
        return Vec::new();
    }
    if before_channel.is_some() || after_channel.is_none() {
        return Vec::new();
    }

    let mut actions = vec![Action::Send {
        channel_id: config.scan_channel_id,
        content: greeting(config, user_id),
        silent: false,
    }];
    if let Some(emoji) = &config.watched_user_emoji {
        actions.push(Action::Send {
            channel_id: config.scan_channel_id,
            content: emoji.clone(),
            silent: false,
        });
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageAuthor;

    const SCAN: u64 = 100;
    const REPORT: u64 = 200;
    const WATCHED: u64 = 307;

    fn config(report: Option<u64>) -> Config {
        Config {
            discord_token: "test".to_string(),
            scan_channel_id: SCAN,
            report_channel_id: report,
            capture_log_path: "unused.csv".to_string(),
            command_prefix: "!".to_string(),
            owner_id: None,
            watched_user_id: Some(WATCHED),
            watched_user_greeting: "hello there".to_string(),
            watched_user_emoji: Some("<:wave:1>".to_string()),
            status_message: "test".to_string(),
        }
    }

    fn message(author_id: u64, content: &str) -> IncomingMessage {
        IncomingMessage {
            id: 9,
            channel_id: SCAN,
            guild_id: Some(1),
            author: MessageAuthor {
                id: author_id,
                name: "someone".to_string(),
                is_bot: false,
            },
            content: content.to_string(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn relocates_link_posts() {
        let actions = plan_relocation(&message(5, "look https://a.io"), &config(Some(REPORT)));
        assert_eq!(
            actions,
            vec![
                Action::Send {
                    channel_id: REPORT,
                    content: "User <@5> sends this message: look https://a.io".to_string(),
                    silent: true,
                },
                Action::Delete {
                    channel_id: SCAN,
                    message_id: 9,
                },
                Action::Send {
                    channel_id: SCAN,
                    content: "<@5>, you reposted in the wrong neighborhood".to_string(),
                    silent: true,
                },
            ]
        );
    }

    #[test]
    fn watched_user_also_gets_greeted_on_relocation() {
        let actions = plan_relocation(&message(WATCHED, "www.a.io"), &config(Some(REPORT)));
        assert_eq!(actions.len(), 4);
        assert_eq!(
            actions[3],
            Action::Send {
                channel_id: SCAN,
                content: "<@307>, hello there".to_string(),
                silent: false,
            }
        );
    }

    #[test]
    fn relocation_needs_a_distinct_report_channel_and_a_link() {
        assert!(plan_relocation(&message(5, "https://a.io"), &config(None)).is_empty());
        assert!(plan_relocation(&message(5, "https://a.io"), &config(Some(SCAN))).is_empty());
        assert!(plan_relocation(&message(5, "no links"), &config(Some(REPORT))).is_empty());

        let mut bot = message(5, "https://a.io");
        bot.author.is_bot = true;
        assert!(plan_relocation(&bot, &config(Some(REPORT))).is_empty());

        let mut elsewhere = message(5, "https://a.io");
        elsewhere.channel_id = REPORT;
        assert!(plan_relocation(&elsewhere, &config(Some(REPORT))).is_empty());
    }

    #[test]
    fn long_reposts_fit_in_one_message() {
        let long = format!("https://a.io {}", "x".repeat(DISCORD_MESSAGE_LIMIT));
        let actions = plan_relocation(&message(5, &long), &config(Some(REPORT)));
        let Action::Send { content, .. } = &actions[0] else {
            panic!("expected repost first");
        };
        assert_eq!(content.chars().count(), DISCORD_MESSAGE_LIMIT);
        assert!(content.ends_with("..."));
    }

    #[test]
    fn greets_watched_user_joining_voice() {
        let cfg = config(None);
        let actions = plan_voice_greeting(&cfg, WATCHED, None, Some(55));
        assert_eq!(
            actions,
            vec![
                Action::Send {
                    channel_id: SCAN,
                    content: "<@307>, hello there".to_string(),
                    silent: false,
                },
                Action::Send {
                    channel_id: SCAN,
                    content: "<:wave:1>".to_string(),
                    silent: false,
                },
            ]
        );
    }

    #[test]
    fn ignores_other_voice_transitions() {
        let cfg = config(None);
        assert!(plan_voice_greeting(&cfg, 1, None, Some(55)).is_empty());
        assert!(plan_voice_greeting(&cfg, WATCHED, Some(54), Some(55)).is_empty());
        assert!(plan_voice_greeting(&cfg, WATCHED, Some(55), None).is_empty());

        let mut no_emoji = config(None);
        no_emoji.watched_user_emoji = None;
        assert_eq!(plan_voice_greeting(&no_emoji, WATCHED, None, Some(55)).len(), 1);
    }
}
