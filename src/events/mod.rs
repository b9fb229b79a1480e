use std::{collections::HashMap, sync::Arc};

use serenity::all::{ChannelId, Context, GuildId, Message, MessageId, MessageUpdateEvent, Ready};

use crate::tasks::TaskSupervisor;

pub mod mention_reply;
pub mod message_cache;
pub mod message_delete;
pub mod ready;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    MessageCreate,
    MessageUpdate,
    MessageDelete,
}

/// A gateway event as handed to listeners. Cheap to clone so every listener
/// can run on its own task.
#[derive(Clone, Debug)]
pub enum BotEvent {
    Ready(Arc<Ready>),
    MessageCreate(Arc<Message>),
    MessageUpdate(Arc<MessageUpdateEvent>),
    MessageDelete {
        channel_id: ChannelId,
        message_id: MessageId,
        guild_id: Option<GuildId>,
    },
}

impl BotEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BotEvent::Ready(_) => EventKind::Ready,
            BotEvent::MessageCreate(_) => EventKind::MessageCreate,
            BotEvent::MessageUpdate(_) => EventKind::MessageUpdate,
            BotEvent::MessageDelete { .. } => EventKind::MessageDelete,
        }
    }
}

#[serenity::async_trait]
pub trait EventListener: Send + Sync {
    fn name(&self) -> &'static str;
    fn kind(&self) -> EventKind;
    async fn handle(&self, ctx: &Context, event: &BotEvent) -> anyhow::Result<()>;
}

#[derive(Default, Clone)]
pub struct ListenerRegistry {
    listeners: HashMap<EventKind, Vec<Arc<dyn EventListener>>>,
}

impl ListenerRegistry {
    pub fn register(&mut self, listener: Arc<dyn EventListener>) {
        self.listeners.entry(listener.kind()).or_default().push(listener);
    }

    pub fn listeners_for(&self, kind: EventKind) -> &[Arc<dyn EventListener>] {
        self.listeners.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Starts every listener for the event on its own task.
    pub fn dispatch(&self, tasks: &TaskSupervisor, ctx: &Context, event: BotEvent) {
        for listener in self.listeners_for(event.kind()) {
            let listener = listener.clone();
            let ctx = ctx.clone();
            let event = event.clone();
            tasks.spawn(format!("listener:{}", listener.name()), async move {
                listener.handle(&ctx, &event).await
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, EventKind);

    #[serenity::async_trait]
    impl EventListener for Named {
        fn name(&self) -> &'static str {
            self.0
        }
        fn kind(&self) -> EventKind {
            self.1
        }
        async fn handle(&self, _ctx: &Context, _event: &BotEvent) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_listeners_are_grouped_by_kind_in_order() {
        let mut registry = ListenerRegistry::default();
        registry.register(Arc::new(Named("cache", EventKind::MessageCreate)));
        registry.register(Arc::new(Named("ready", EventKind::Ready)));
        registry.register(Arc::new(Named("mention", EventKind::MessageCreate)));

        let names: Vec<_> = registry
            .listeners_for(EventKind::MessageCreate)
            .iter()
            .map(|l| l.name())
            .collect();
        assert_eq!(names, ["cache", "mention"]);
        assert_eq!(registry.listeners_for(EventKind::Ready).len(), 1);
        assert!(registry.listeners_for(EventKind::MessageDelete).is_empty());
    }

    #[test]
    fn test_event_kind() {
        let event = BotEvent::MessageDelete {
            channel_id: ChannelId::new(1),
            message_id: MessageId::new(2),
            guild_id: None,
        };
        assert_eq!(event.kind(), EventKind::MessageDelete);
    }
}
