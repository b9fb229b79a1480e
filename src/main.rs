use std::sync::Arc;

use anyhow::Context as AnyhowContext;
use serenity::{
    Client,
    all::{
        ChannelId, Context, EventHandler, GuildId, Interaction, Message, MessageId,
        MessageUpdateEvent, Ready, UserId,
    },
    async_trait,
    model::prelude::GatewayIntents,
};
use tracing_subscriber::EnvFilter;

mod commands;
mod components;
mod config;
mod constant;
mod cooldown;
mod database;
mod dispatch;
mod error;
mod events;
mod plugins;
mod spellcheck;
mod tasks;
mod util;
mod voice;

use config::Configuration;

use crate::{
    commands::CommandRegistry,
    components::ComponentRegistry,
    cooldown::Cooldowns,
    database::Persistence,
    dispatch::CommandDispatcher,
    events::{BotEvent, ListenerRegistry, message_cache::MessageLog},
    plugins::{PluginRegistry, Services},
    spellcheck::Spellchecker,
    tasks::TaskSupervisor,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,serenity=warn")),
        )
        .init();

    let config = Configuration::load()?;
    let discord_token = config.discord_token()?;

    let (supervisor, failure_rx) = TaskSupervisor::new();
    tokio::spawn(tasks::report_failures(failure_rx));

    let spellchecker = match Spellchecker::load(&config.spellcheck.dictionary_path) {
        Ok(checker) => {
            tracing::info!(words = checker.len(), "loaded spellcheck dictionary");
            Some(Arc::new(checker))
        }
        Err(err) => {
            tracing::warn!("spellcheck disabled: {err:#}");
            None
        }
    };

    let persistence = Persistence::default();
    let services = Services {
        persistence: persistence.clone(),
        message_log: Arc::new(MessageLog::new(config.discord.message_cache_size)),
        spellchecker,
    };

    let mut plugin_registry = PluginRegistry::default();
    for plugin in plugins::builtin(&config, &services) {
        plugin_registry.register(plugin)?;
    }

    let mut commands = CommandRegistry::default();
    let mut components = ComponentRegistry::default();
    let mut listeners = ListenerRegistry::default();
    plugin_registry.install(&mut commands, &mut components, &mut listeners)?;
    tracing::info!(
        plugins = ?plugin_registry.iter().map(|p| p.name()).collect::<Vec<_>>(),
        commands = commands.len(),
        "plugins installed"
    );
    if config.discord.message_log_channel_id.is_none()
        && plugin_registry
            .get_plugin(constant::plugins::LOGGING)
            .is_some()
    {
        tracing::warn!("discord.message_log_channel_id is not set; deleted messages will not be logged");
    }

    let registration = commands
        .descriptors()
        .iter()
        .map(|d| d.to_discord_command())
        .collect();
    listeners.register(Arc::new(events::ready::Listener::new(
        &config,
        registration,
        persistence,
    )));

    let dispatcher = CommandDispatcher::new(
        commands,
        components,
        Cooldowns::new(config.discord.cooldown_cache_size),
        config
            .discord
            .developer_ids
            .iter()
            .filter(|id| **id != 0)
            .map(|id| UserId::new(*id)),
        supervisor.clone(),
    );

    let mut client = Client::builder(
        discord_token,
        GatewayIntents::default()
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::MESSAGE_CONTENT,
    )
    .event_handler(Handler {
        dispatcher,
        listeners,
        tasks: supervisor,
    })
    .await
    .context("Error creating client")?;

    client.start().await.context("Client error")?;

    Ok(())
}

pub struct Handler {
    dispatcher: CommandDispatcher,
    listeners: ListenerRegistry,
    tasks: TaskSupervisor,
}
#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.listeners
            .dispatch(&self.tasks, &ctx, BotEvent::Ready(Arc::new(ready)));
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(cmd) => self.dispatcher.dispatch_command(ctx, cmd),
            Interaction::Component(cmp) => self.dispatcher.dispatch_component(ctx, cmp),
            _ => {}
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        self.listeners
            .dispatch(&self.tasks, &ctx, BotEvent::MessageCreate(Arc::new(msg)));
    }

    async fn message_update(
        &self,
        ctx: Context,
        _old_if_available: Option<Message>,
        _new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        self.listeners
            .dispatch(&self.tasks, &ctx, BotEvent::MessageUpdate(Arc::new(event)));
    }

    async fn message_delete(
        &self,
        ctx: Context,
        channel_id: ChannelId,
        deleted_message_id: MessageId,
        guild_id: Option<GuildId>,
    ) {
        self.listeners.dispatch(
            &self.tasks,
            &ctx,
            BotEvent::MessageDelete {
                channel_id,
                message_id: deleted_message_id,
                guild_id,
            },
        );
    }
}
