use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::moderation::Action;
use crate::Error;

/// Performs actions against Discord.
#[async_trait]
pub trait Outbound: Send + Sync {
    async fn perform(&self, action: &Action) -> Result<(), Error>;
}

pub struct SerenityOutbound {
    http: Arc<serenity::Http>,
}

impl SerenityOutbound {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Outbound for SerenityOutbound {
    async fn perform(&self, action: &Action) -> Result<(), Error> {
        match action {
            Action::Send {
                channel_id,
                content,
                silent,
            } => {
                let mut builder = serenity::CreateMessage::new().content(content);
                if *silent {
                    builder = builder.flags(serenity::MessageFlags::SUPPRESS_NOTIFICATIONS);
                }
                serenity::ChannelId::new(*channel_id)
                    .send_message(&self.http, builder)
                    .await?;
            }
            Action::Delete {
                channel_id,
                message_id,
            } => {
                serenity::ChannelId::new(*channel_id)
                    .delete_message(&self.http, serenity::MessageId::new(*message_id))
                    .await?;
            }
        }
        Ok(())
    }
}

/// Runs actions in order. A failed action is logged and the rest still run.
pub async fn perform_all<O: Outbound + ?Sized>(outbound: &O, actions: &[Action]) -> usize {
    let mut failed = 0;
    for action in actions {
        match outbound.perform(action).await {
            Ok(()) => debug!("Outbound: performed {:?}", action),
            Err(e) => {
                failed += 1;
                warn!("Outbound: {:?} failed: {}", action, e);
            }
        }
    }
    failed
}
