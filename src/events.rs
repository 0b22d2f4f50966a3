use poise::serenity_prelude as serenity;
use tracing::{debug, info};

use crate::capture::CaptureService;
use crate::config::Config;
use crate::ledger::SeenPairs;
use crate::message::{edit_changes_content, IncomingMessage};
use crate::moderation::{plan_relocation, plan_voice_greeting};
use crate::outbound::{perform_all, Outbound, SerenityOutbound};
use crate::store::RecordSink;
use crate::{Data, Error};

/// Framework event hook. Failures inside are logged and never returned, so
/// one bad event cannot take the gateway connection down.
pub async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if new_message.author.bot || new_message.author.id.get() == data.bot_id {
                return Ok(());
            }
            let outbound = SerenityOutbound::new(ctx.http.clone());
            let message = IncomingMessage::from(new_message);
            process_message(&data.capture, &data.config, &outbound, &message, false).await;
        }
        serenity::FullEvent::MessageUpdate {
            old_if_available,
            event,
            ..
        } => {
            let Some(message) = IncomingMessage::from_update(event) else {
                debug!("Ignoring update without new content for message {}", event.id);
                return Ok(());
            };
            if !edit_changes_content(old_if_available.as_ref(), &message.content) {
                debug!("Ignoring update with unchanged content for message {}", event.id);
                return Ok(());
            }
            let outbound = SerenityOutbound::new(ctx.http.clone());
            process_message(&data.capture, &data.config, &outbound, &message, true).await;
        }
        serenity::FullEvent::VoiceStateUpdate { old, new } => {
            let before = old.as_ref().and_then(|state| state.channel_id).map(|id| id.get());
            let after = new.channel_id.map(|id| id.get());
            let actions = plan_voice_greeting(&data.config, new.user_id.get(), before, after);
            if !actions.is_empty() {
                info!("Watched user {} joined voice, greeting", new.user_id);
                let outbound = SerenityOutbound::new(ctx.http.clone());
                perform_all(&outbound, &actions).await;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Captures links first so the record is durable before the post is moved.
/// An edit is only relocated when it brought links not captured before; the
/// original post was already handled when it was created.
pub async fn process_message<L, S, O>(
    capture: &CaptureService<L, S>,
    config: &Config,
    outbound: &O,
    message: &IncomingMessage,
    is_edit: bool,
) where
    L: SeenPairs,
    S: RecordSink,
    O: Outbound + ?Sized,
{
    if message.author.is_bot {
        return;
    }

    let captured = capture.handle(message, is_edit).await;
    if !captured.is_empty() {
        debug!(
            "Captured {} new link(s) from message {}",
            captured.len(),
            message.id
        );
    }

    if is_edit && captured.is_empty() {
        return;
    }

    let actions = plan_relocation(message, config);
    if actions.is_empty() {
        return;
    }
    info!(
        "Relocating link post {} from {} by {}",
        message.id, message.channel_id, message.author.name
    );
    perform_all(outbound, &actions).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::SeenPairLedger;
    use crate::message::MessageAuthor;
    use crate::moderation::Action;
    use crate::store::RecordStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SCAN: u64 = 100;
    const REPORT: u64 = 200;

    #[derive(Default)]
    struct Recording {
        performed: Mutex<Vec<Action>>,
    }

    #[async_trait]
    impl Outbound for Recording {
        async fn perform(&self, action: &Action) -> Result<(), Error> {
            self.performed.lock().unwrap().push(action.clone());
            Ok(())
        }
    }

    fn config(report: Option<u64>) -> Config {
        Config {
            discord_token: "test".to_string(),
            scan_channel_id: SCAN,
            report_channel_id: report,
            capture_log_path: "unused.csv".to_string(),
            command_prefix: "!".to_string(),
            owner_id: None,
            watched_user_id: None,
            watched_user_greeting: "hi".to_string(),
            watched_user_emoji: None,
            status_message: "test".to_string(),
        }
    }

    fn message(content: &str) -> IncomingMessage {
        IncomingMessage {
            id: 1,
            channel_id: SCAN,
            guild_id: Some(1),
            author: MessageAuthor {
                id: 5,
                name: "alice".to_string(),
                is_bot: false,
            },
            content: content.to_string(),
            attachments: Vec::new(),
        }
    }

    #[tokio::test]
    async fn captures_then_relocates() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("links.csv"));
        store.ensure_initialized().unwrap();
        let capture = CaptureService::new(SCAN, SeenPairLedger::new(), store);
        let outbound = Recording::default();

        process_message(&capture, &config(Some(REPORT)), &outbound, &message("https://a.io"), false)
            .await;

        assert_eq!(capture.sink().read_all().unwrap().len(), 1);
        let performed = outbound.performed.lock().unwrap();
        assert_eq!(performed.len(), 3);
        assert!(matches!(performed[1], Action::Delete { message_id: 1, .. }));
    }

    #[tokio::test]
    async fn repeated_update_with_same_links_is_not_relocated_again() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("links.csv"));
        store.ensure_initialized().unwrap();
        let capture = CaptureService::new(SCAN, SeenPairLedger::new(), store);
        let outbound = Recording::default();
        let cfg = config(Some(REPORT));

        process_message(&capture, &cfg, &outbound, &message("https://a.io"), false).await;
        process_message(&capture, &cfg, &outbound, &message("https://a.io"), true).await;

        assert_eq!(capture.sink().read_all().unwrap().len(), 1);
        assert_eq!(outbound.performed.lock().unwrap().len(), 3);

        // An edit that adds a link is still moved out of the scan channel.
        process_message(&capture, &cfg, &outbound, &message("https://a.io https://b.io"), true)
            .await;
        assert_eq!(capture.sink().read_all().unwrap().len(), 2);
        assert_eq!(outbound.performed.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn capture_only_deployment_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("links.csv"));
        store.ensure_initialized().unwrap();
        let capture = CaptureService::new(SCAN, SeenPairLedger::new(), store);
        let outbound = Recording::default();

        process_message(&capture, &config(None), &outbound, &message("www.a.io"), false).await;
        process_message(&capture, &config(None), &outbound, &message("www.a.io www.b.io"), true)
            .await;

        let urls: Vec<_> = capture
            .sink()
            .read_all()
            .unwrap()
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(urls, vec!["http://www.a.io", "http://www.b.io"]);
        assert!(outbound.performed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bot_messages_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("links.csv"));
        store.ensure_initialized().unwrap();
        let capture = CaptureService::new(SCAN, SeenPairLedger::new(), store);
        let outbound = Recording::default();

        let mut msg = message("https://a.io");
        msg.author.is_bot = true;
        process_message(&capture, &config(Some(REPORT)), &outbound, &msg, false).await;

        assert!(capture.sink().read_all().unwrap().is_empty());
        assert!(outbound.performed.lock().unwrap().is_empty());
    }
}
