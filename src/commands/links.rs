use crate::{Context, Error};
use tracing::info;

pub const WRONG_CHANNEL_REPLY: &str = "This command only available in the target channel.";

pub fn stats_reply(in_scan_channel: bool, seen: usize) -> String {
    if !in_scan_channel {
        return WRONG_CHANNEL_REPLY.to_string();
    }
    format!("I've recorded {} (message, url) pairs so far.", seen)
}

/// Show how many links have been recorded
#[poise::command(prefix_command, slash_command)]
pub async fn linkstats(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let in_scan_channel = ctx.channel_id().get() == data.capture.scan_channel_id();
    let seen = data.capture.seen_count().await;

    info!(
        "linkstats requested by {} in channel {}",
        ctx.author().name,
        ctx.channel_id()
    );
    ctx.say(stats_reply(in_scan_channel, seen)).await?;
    Ok(())
}
