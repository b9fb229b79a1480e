use std::sync::Arc;

use serenity::all::{
    ChannelId, Colour, Context, CreateEmbed, CreateMessage, GuildId, MessageId, Timestamp,
};

use super::{
    BotEvent, EventKind, EventListener,
    message_cache::{CachedMessage, MessageLog},
};
use crate::{constant, util};

/// Discord rejects embed field values longer than this
const FIELD_LIMIT: usize = 1024;

/// The fields of one deletion log entry, in display order
#[derive(Debug, PartialEq, Eq)]
pub struct DeletionEntry {
    pub author: String,
    pub channel: String,
    pub sent_at: String,
    pub content: String,
}

impl DeletionEntry {
    pub fn new(
        cached: Option<&CachedMessage>,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Self {
        let sent_secs = util::snowflake_millis(message_id.get()) / 1000;
        let (author, content) = match cached {
            Some(msg) => (
                format!("{} (<@{}>)", msg.author_name, msg.author_id),
                if msg.content.is_empty() {
                    "*No text content.*".to_string()
                } else {
                    truncate(&msg.content, FIELD_LIMIT)
                },
            ),
            None => (
                "Unknown author".to_string(),
                constant::UNCACHED_CONTENT.to_string(),
            ),
        };

        Self {
            author,
            channel: format!("<#{channel_id}>"),
            sent_at: format!("<t:{sent_secs}:f>"),
            content,
        }
    }

    pub fn to_embed(&self) -> CreateEmbed {
        CreateEmbed::new()
            .title("Message deleted")
            .colour(Colour::RED)
            .field("Author", &self.author, true)
            .field("Channel", &self.channel, true)
            .field("Sent", &self.sent_at, true)
            .field("Content", &self.content, false)
            .timestamp(Timestamp::now())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.push('…');
    truncated
}

/// What to do with a deletion
#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    Log(ChannelId),
    SkipDirectMessage,
    SkipBotAuthor,
    NoDestination,
    /// Deletions in the log channel itself are not logged
    SkipLogChannel,
}

pub fn decide(
    cached: Option<&CachedMessage>,
    guild_id: Option<GuildId>,
    channel_id: ChannelId,
    destination: Option<ChannelId>,
) -> Decision {
    if guild_id.is_none() {
        return Decision::SkipDirectMessage;
    }
    if cached.is_some_and(|msg| msg.author_is_bot) {
        return Decision::SkipBotAuthor;
    }
    match destination {
        None => Decision::NoDestination,
        Some(destination) if destination == channel_id => Decision::SkipLogChannel,
        Some(destination) => Decision::Log(destination),
    }
}

/// Where deletion entries are posted
#[serenity::async_trait]
pub trait LogSink: Send + Sync {
    async fn resolve(&self, channel_id: ChannelId) -> anyhow::Result<ChannelId>;
    async fn send(&self, channel_id: ChannelId, entry: &DeletionEntry) -> anyhow::Result<()>;
}

pub struct HttpLogSink<'a>(pub &'a Context);

#[serenity::async_trait]
impl LogSink for HttpLogSink<'_> {
    async fn resolve(&self, channel_id: ChannelId) -> anyhow::Result<ChannelId> {
        Ok(channel_id.to_channel(self.0).await?.id())
    }

    async fn send(&self, channel_id: ChannelId, entry: &DeletionEntry) -> anyhow::Result<()> {
        channel_id
            .send_message(&self.0.http, CreateMessage::new().embed(entry.to_embed()))
            .await?;
        Ok(())
    }
}

/// Posts the entry. An unresolvable destination is logged and the entry
/// dropped; returns whether it was sent.
pub async fn post_entry(
    sink: &impl LogSink,
    destination: ChannelId,
    entry: &DeletionEntry,
) -> anyhow::Result<bool> {
    let channel_id = match sink.resolve(destination).await {
        Ok(channel_id) => channel_id,
        Err(err) => {
            tracing::error!(channel = %destination, "could not resolve message log channel: {err}");
            return Ok(false);
        }
    };
    sink.send(channel_id, entry).await?;
    Ok(true)
}

pub struct Listener {
    log: Arc<MessageLog>,
    destination: Option<ChannelId>,
}

impl Listener {
    pub fn new(log: Arc<MessageLog>, destination: Option<ChannelId>) -> Self {
        Self { log, destination }
    }
}

#[serenity::async_trait]
impl EventListener for Listener {
    fn name(&self) -> &'static str {
        "message_delete_log"
    }

    fn kind(&self) -> EventKind {
        EventKind::MessageDelete
    }

    async fn handle(&self, ctx: &Context, event: &BotEvent) -> anyhow::Result<()> {
        let BotEvent::MessageDelete {
            channel_id,
            message_id,
            guild_id,
        } = *event
        else {
            return Ok(());
        };
        let cached = self.log.take(message_id);

        let destination = match decide(cached.as_ref(), guild_id, channel_id, self.destination) {
            Decision::Log(destination) => destination,
            Decision::NoDestination => {
                tracing::debug!("no message log channel configured; skipping deletion log");
                return Ok(());
            }
            _ => return Ok(()),
        };

        let entry = DeletionEntry::new(cached.as_ref(), channel_id, message_id);
        post_entry(&HttpLogSink(ctx), destination, &entry).await?;
        Ok(())
    }
}
