use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAuthor {
    pub id: u64,
    pub name: String,
    pub is_bot: bool,
}

/// The parts of a Discord message the capture pipeline and moderation look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub author: MessageAuthor,
    pub content: String,
    /// Attachment URLs in attachment order.
    pub attachments: Vec<String>,
}

impl IncomingMessage {
    /// Builds a message from a partial update. Returns `None` when the update
    /// carries no new content, e.g. Discord resolving link embeds.
    pub fn from_update(event: &serenity::MessageUpdateEvent) -> Option<Self> {
        let author = event.author.as_ref()?;
        let content = event.content.clone()?;

        Some(Self {
            id: event.id.get(),
            channel_id: event.channel_id.get(),
            guild_id: event.guild_id.map(|id| id.get()),
            author: MessageAuthor::from(author),
            content,
            attachments: event
                .attachments
                .as_ref()
                .map(|atts| atts.iter().map(|a| a.url.clone()).collect())
                .unwrap_or_default(),
        })
    }
}

/// An edit only counts when its text differs from the cached original. With
/// no cached original the edit is assumed to change something.
pub fn edit_changes_content(before: Option<&serenity::Message>, after: &str) -> bool {
    before.map_or(true, |old| old.content != after)
}

impl From<&serenity::User> for MessageAuthor {
    fn from(user: &serenity::User) -> Self {
        Self {
            id: user.id.get(),
            name: user.tag(),
            is_bot: user.bot,
        }
    }
}

impl From<&serenity::Message> for IncomingMessage {
    fn from(message: &serenity::Message) -> Self {
        Self {
            id: message.id.get(),
            channel_id: message.channel_id.get(),
            guild_id: message.guild_id.map(|id| id.get()),
            author: MessageAuthor::from(&message.author),
            content: message.content.clone(),
            attachments: message.attachments.iter().map(|a| a.url.clone()).collect(),
        }
    }
}
