use crate::{Context, Error};
use tracing::info;

/// Shut down the bot (Owner only)
#[poise::command(prefix_command, slash_command, owners_only, hide_in_help)]
pub async fn shutdown(ctx: Context<'_>) -> Result<(), Error> {
    let seen = ctx.data().capture.seen_count().await;
    info!(
        "Shutdown command received from owner: {} ({} pairs recorded)",
        ctx.author().name,
        seen
    );
    ctx.say("👋 Shutting down...").await?;
    ctx.framework().shard_manager().shutdown_all().await;
    Ok(())
}
