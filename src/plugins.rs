//! Plugins bundle related commands, components and listeners. They are listed
//! explicitly at startup; there is no runtime loading or unloading.

use std::{collections::HashMap, sync::Arc};

use serenity::all::ChannelId;

use crate::{
    commands::{self, CommandHandler, CommandRegistry},
    components::{self, ComponentHandler, ComponentRegistry},
    config::Configuration,
    constant::plugins,
    database::Persistence,
    error::RegistryError,
    events::{self, EventListener, ListenerRegistry, message_cache::MessageLog},
    spellcheck::Spellchecker,
};

pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn commands(&self) -> Vec<Arc<dyn CommandHandler>> {
        vec![]
    }
    fn components(&self) -> Vec<Arc<dyn ComponentHandler>> {
        vec![]
    }
    fn listeners(&self) -> Vec<Arc<dyn EventListener>> {
        vec![]
    }
}

/// A plugin assembled from ready-made handlers
pub struct Bundle {
    name: &'static str,
    description: &'static str,
    commands: Vec<Arc<dyn CommandHandler>>,
    components: Vec<Arc<dyn ComponentHandler>>,
    listeners: Vec<Arc<dyn EventListener>>,
}

impl Bundle {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            commands: vec![],
            components: vec![],
            listeners: vec![],
        }
    }

    pub fn command(mut self, handler: impl CommandHandler + 'static) -> Self {
        self.commands.push(Arc::new(handler));
        self
    }

    pub fn component(mut self, handler: impl ComponentHandler + 'static) -> Self {
        self.components.push(Arc::new(handler));
        self
    }

    pub fn listener(mut self, listener: impl EventListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }
}

impl Plugin for Bundle {
    fn name(&self) -> &'static str {
        self.name
    }
    fn description(&self) -> &'static str {
        self.description
    }
    fn commands(&self) -> Vec<Arc<dyn CommandHandler>> {
        self.commands.clone()
    }
    fn components(&self) -> Vec<Arc<dyn ComponentHandler>> {
        self.components.clone()
    }
    fn listeners(&self) -> Vec<Arc<dyn EventListener>> {
        self.listeners.clone()
    }
}

#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<&'static str, Arc<dyn Plugin>>,
    order: Vec<&'static str>,
}

impl PluginRegistry {
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), RegistryError> {
        let name = plugin.name();
        if self.plugins.contains_key(name) {
            return Err(RegistryError::DuplicatePlugin(name.to_string()));
        }
        self.order.push(name);
        self.plugins.insert(name, plugin);
        Ok(())
    }

    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    /// Registered plugins, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Plugin>> {
        self.order.iter().filter_map(|name| self.plugins.get(name))
    }

    /// Adds every plugin's handlers to the dispatch registries.
    pub fn install(
        &self,
        commands: &mut CommandRegistry,
        components: &mut ComponentRegistry,
        listeners: &mut ListenerRegistry,
    ) -> Result<(), RegistryError> {
        for plugin in self.iter() {
            for command in plugin.commands() {
                commands.register(command)?;
            }
            for component in plugin.components() {
                components.register(component)?;
            }
            for listener in plugin.listeners() {
                listeners.register(listener);
            }
            tracing::debug!(
                plugin = plugin.name(),
                description = plugin.description(),
                "installed plugin"
            );
        }
        Ok(())
    }
}

/// Everything the built-in plugins are constructed from
pub struct Services {
    pub persistence: Persistence,
    pub message_log: Arc<MessageLog>,
    pub spellchecker: Option<Arc<Spellchecker>>,
}

/// The bot's plugins. The ready listener is wired separately, since it needs
/// the finished command list.
pub fn builtin(config: &Configuration, services: &Services) -> Vec<Arc<dyn Plugin>> {
    let log_channel = config.discord.message_log_channel_id.map(ChannelId::new);

    vec![
        Arc::new(
            Bundle::new(plugins::CORE, "Latency, server stats and spellcheck")
                .command(commands::ping::Handler::new())
                .command(commands::member_count::Handler::new())
                .command(commands::spellcheck::Handler::new(
                    services.spellchecker.clone(),
                )),
        ),
        Arc::new(
            Bundle::new(plugins::FUN, "Memes and mention replies")
                .command(commands::meme::Handler::new())
                .listener(events::mention_reply::Listener::new(
                    config.mention_reply.clone(),
                )),
        ),
        Arc::new(
            Bundle::new(plugins::ECONOMY, "Coin balances")
                .command(commands::balance::Handler::new(services.persistence.clone())),
        ),
        Arc::new(
            Bundle::new(plugins::LOGGING, "Logs deleted messages to a staff channel")
                .listener(events::message_cache::Listener::new(
                    services.message_log.clone(),
                ))
                .listener(events::message_cache::EditListener::new(
                    services.message_log.clone(),
                ))
                .listener(events::message_delete::Listener::new(
                    services.message_log.clone(),
                    log_channel,
                )),
        ),
        Arc::new(
            Bundle::new(plugins::VOICE, "Join-to-create voice channel management").command(
                commands::voice_delete::Handler::new(services.persistence.clone()),
            ),
        ),
        Arc::new(
            Bundle::new(plugins::TICKETS, "Support ticket buttons")
                .component(components::ticket::Handler::request_close())
                .component(components::ticket::Handler::confirm())
                .component(components::ticket::Handler::cancel()),
        ),
        Arc::new(Bundle::new(plugins::LINKS, "Link shortening").command(
            commands::shorten::Handler::new(config.links.clone(), services.persistence.clone()),
        )),
        Arc::new(
            Bundle::new(plugins::DEVELOPER, "Developer-only tools")
                .command(commands::guild_join::Handler::new()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    fn services() -> Services {
        Services {
            persistence: Persistence::default(),
            message_log: Arc::new(MessageLog::new(8)),
            spellchecker: None,
        }
    }

    fn registry() -> PluginRegistry {
        let mut registry = PluginRegistry::default();
        for plugin in builtin(&Configuration::default(), &services()) {
            registry.register(plugin).unwrap();
        }
        registry
    }

    #[test]
    fn test_get_plugin() {
        let registry = registry();
        assert_eq!(registry.get_plugin("fun").unwrap().name(), "fun");
        assert!(registry.get_plugin("avatars").is_none());
    }

    #[test]
    fn test_duplicate_plugin_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register(Arc::new(Bundle::new(plugins::CORE, "again")))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicatePlugin(_)));
    }

    #[test]
    fn test_builtin_plugins_install_the_full_surface() {
        let mut commands = CommandRegistry::default();
        let mut components = ComponentRegistry::default();
        let mut listeners = ListenerRegistry::default();
        registry()
            .install(&mut commands, &mut components, &mut listeners)
            .unwrap();

        let names: Vec<_> = commands.descriptors().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            [
                "balance",
                "guild-join",
                "membercount",
                "meme",
                "ping",
                "shorten",
                "spellcheck",
                "voice-delete"
            ]
        );
        assert!(commands.get("guild-join").unwrap().descriptor().dev_only);
        assert!(components.get("close_ticket").is_some());
        assert!(components.get("close_ticket_confirm:1").is_some());
        assert_eq!(listeners.listeners_for(EventKind::MessageCreate).len(), 2);
        assert_eq!(listeners.listeners_for(EventKind::MessageUpdate).len(), 1);
        assert_eq!(listeners.listeners_for(EventKind::MessageDelete).len(), 1);
    }

    #[test]
    fn test_installing_twice_fails_on_duplicate_command() {
        let registry = registry();
        let mut commands = CommandRegistry::default();
        let mut components = ComponentRegistry::default();
        let mut listeners = ListenerRegistry::default();
        registry
            .install(&mut commands, &mut components, &mut listeners)
            .unwrap();

        assert!(matches!(
            registry.install(&mut commands, &mut components, &mut listeners),
            Err(RegistryError::DuplicateCommand(_))
        ));
    }
}
