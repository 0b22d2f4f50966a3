use linkscout::capture::CaptureService;
use linkscout::ledger::{SeenPairLedger, SeenPairs};
use linkscout::store::RecordStore;
use linkscout::{commands, config::Config, events, Data};
use poise::serenity_prelude as serenity;
use std::collections::HashSet;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const MESSAGE_CACHE_SIZE: usize = 200;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration: {:?}", config);
    let discord_token = config.discord_token.clone();

    // Rehydrate the ledger before connecting so the first event already dedups
    let store = RecordStore::new(&config.capture_log_path);
    store.ensure_initialized()?;
    let ledger = SeenPairLedger::load(&store.read_all()?);
    info!(
        "Loaded {} previously seen (message, url) pairs from {}",
        ledger.len(),
        store.path().display()
    );
    let capture = CaptureService::new(config.scan_channel_id, ledger, store);

    let mut owners = HashSet::new();
    if let Some(owner_id) = config.owner_id {
        owners.insert(serenity::UserId::new(owner_id));
    }

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::list(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix.clone()),
                ..Default::default()
            },
            owners,
            event_handler: |ctx, event, _framework, data| {
                Box::pin(events::handle_event(ctx, event, data))
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {} (id: {})", ready.user.name, ready.user.id);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                // Set bot status
                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                Ok(Data {
                    config,
                    capture,
                    bot_id: ready.user.id.get(),
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    // Keep recent messages cached so edits arrive with their previous content
    let mut cache_settings = ::serenity::cache::Settings::default();
    cache_settings.max_messages = MESSAGE_CACHE_SIZE;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .cache_settings(cache_settings)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
