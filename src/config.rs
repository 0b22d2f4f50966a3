use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub scan_channel_id: u64,
    pub report_channel_id: Option<u64>,
    pub capture_log_path: String,
    pub command_prefix: String,
    pub owner_id: Option<u64>,
    pub watched_user_id: Option<u64>,
    pub watched_user_greeting: String,
    pub watched_user_emoji: Option<String>,
    pub status_message: String,
}

const DEFAULT_GREETING: &str = "look who just showed up.";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            scan_channel_id: env::var("SCAN_CHANNEL_ID")
                .map_err(|_| anyhow::anyhow!("SCAN_CHANNEL_ID must be set"))?
                .parse()
                .map_err(|_| anyhow::anyhow!("SCAN_CHANNEL_ID must be a valid u64"))?,
            report_channel_id: Self::optional_id("REPORT_CHANNEL_ID")?,
            capture_log_path: env::var("CAPTURE_LOG_PATH")
                .unwrap_or_else(|_| "captured_links.csv".to_string()),
            command_prefix: env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!".to_string()),
            owner_id: env::var("OWNER_ID").ok().and_then(|id| id.parse().ok()),
            watched_user_id: Self::optional_id("WATCHED_USER_ID")?,
            watched_user_greeting: env::var("WATCHED_USER_GREETING")
                .unwrap_or_else(|_| DEFAULT_GREETING.to_string()),
            watched_user_emoji: env::var("WATCHED_USER_EMOJI")
                .ok()
                .filter(|e| !e.trim().is_empty()),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "Watching for links".to_string()),
        })
    }

    /// An unset or empty variable is `None`; anything else must parse.
    fn optional_id(key: &str) -> anyhow::Result<Option<u64>> {
        match env::var(key) {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| anyhow::anyhow!("{} must be a valid u64", key)),
            _ => Ok(None),
        }
    }

    /// Report channel only counts when it is distinct from the scan channel.
    pub fn relocation_channel(&self) -> Option<u64> {
        self.report_channel_id
            .filter(|&id| id != self.scan_channel_id)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("scan_channel_id", &self.scan_channel_id)
            .field("report_channel_id", &self.report_channel_id)
            .field("capture_log_path", &self.capture_log_path)
            .field("command_prefix", &self.command_prefix)
            .field("owner_id", &self.owner_id)
            .field("watched_user_id", &self.watched_user_id)
            .field("watched_user_greeting", &self.watched_user_greeting)
            .field("watched_user_emoji", &self.watched_user_emoji)
            .field("status_message", &self.status_message)
            .finish()
    }
}

/// Discord message limit is 2000 characters
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;
