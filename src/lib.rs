pub mod capture;
pub mod commands;
pub mod config;
pub mod events;
pub mod ledger;
pub mod links;
pub mod message;
pub mod moderation;
pub mod outbound;
pub mod store;

/// Capture pipeline as wired in the running bot.
pub type LinkCapture = capture::CaptureService<ledger::SeenPairLedger, store::RecordStore>;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub capture: LinkCapture,
    /// Bot's own user ID, its messages are never processed
    pub bot_id: u64,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
