use std::{num::NonZeroUsize, sync::Arc, sync::Mutex};

use lru::LruCache;
use serenity::all::{ChannelId, Context, Message, MessageId, UserId};

use super::{BotEvent, EventKind, EventListener};

/// What we remember about an observed message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedMessage {
    pub author_id: UserId,
    pub author_name: String,
    pub author_is_bot: bool,
    pub channel_id: ChannelId,
    pub content: String,
}

impl CachedMessage {
    pub fn from_message(msg: &Message) -> Self {
        Self {
            author_id: msg.author.id,
            author_name: msg.author.name.clone(),
            author_is_bot: msg.author.bot,
            channel_id: msg.channel_id,
            content: msg.content.clone(),
        }
    }
}

/// Thread-safe LRU of recently seen messages, consulted when one is deleted
pub struct MessageLog {
    cache: Mutex<LruCache<MessageId, CachedMessage>>,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    pub fn record(&self, message_id: MessageId, message: CachedMessage) {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .put(message_id, message);
    }

    /// Replaces the content of a cached message after an edit. Returns `false`
    /// for messages we never saw.
    pub fn update_content(&self, message_id: MessageId, content: String) -> bool {
        match self
            .cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&message_id)
        {
            Some(cached) => {
                cached.content = content;
                true
            }
            None => false,
        }
    }

    /// Removes and returns the cached message, if we saw it.
    pub fn take(&self, message_id: MessageId) -> Option<CachedMessage> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop(&message_id)
    }
}

pub struct Listener {
    log: Arc<MessageLog>,
}

impl Listener {
    pub fn new(log: Arc<MessageLog>) -> Self {
        Self { log }
    }
}

#[serenity::async_trait]
impl EventListener for Listener {
    fn name(&self) -> &'static str {
        "message_cache"
    }

    fn kind(&self) -> EventKind {
        EventKind::MessageCreate
    }

    async fn handle(&self, _ctx: &Context, event: &BotEvent) -> anyhow::Result<()> {
        if let BotEvent::MessageCreate(msg) = event {
            self.log.record(msg.id, CachedMessage::from_message(msg));
        }
        Ok(())
    }
}

/// Keeps cached content current so a deletion logs what was last visible
pub struct EditListener {
    log: Arc<MessageLog>,
}

impl EditListener {
    pub fn new(log: Arc<MessageLog>) -> Self {
        Self { log }
    }
}

#[serenity::async_trait]
impl EventListener for EditListener {
    fn name(&self) -> &'static str {
        "message_cache_edit"
    }

    fn kind(&self) -> EventKind {
        EventKind::MessageUpdate
    }

    async fn handle(&self, _ctx: &Context, event: &BotEvent) -> anyhow::Result<()> {
        // Embed-only updates carry no content.
        if let BotEvent::MessageUpdate(update) = event
            && let Some(content) = &update.content
        {
            self.log.update_content(update.id, content.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cached(content: &str) -> CachedMessage {
        CachedMessage {
            author_id: UserId::new(5),
            author_name: "Ava".to_string(),
            author_is_bot: false,
            channel_id: ChannelId::new(9),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_take_removes_entry() {
        let log = MessageLog::new(4);
        log.record(MessageId::new(1), cached("hello"));

        assert_eq!(log.take(MessageId::new(1)), Some(cached("hello")));
        assert_eq!(log.take(MessageId::new(1)), None);
    }

    #[test]
    fn test_oldest_entries_are_evicted() {
        let log = MessageLog::new(2);
        for id in 1..=3 {
            log.record(MessageId::new(id), cached(&id.to_string()));
        }

        assert!(log.take(MessageId::new(1)).is_none());
        assert_eq!(log.take(MessageId::new(3)).unwrap().content, "3");
    }

    #[test]
    fn test_edit_replaces_cached_content() {
        let log = MessageLog::new(4);
        log.record(MessageId::new(1), cached("helo"));

        assert!(log.update_content(MessageId::new(1), "hello".to_string()));
        assert!(!log.update_content(MessageId::new(2), "unseen".to_string()));
        assert_eq!(log.take(MessageId::new(1)).unwrap().content, "hello");
        assert!(log.take(MessageId::new(2)).is_none());
    }
}
