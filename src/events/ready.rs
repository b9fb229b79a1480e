use anyhow::Context as _;
use serenity::all::{ActivityData, Command, Context, CreateCommand, OnlineStatus};

use super::{BotEvent, EventKind, EventListener};
use crate::{config, database};

pub struct Listener {
    presence: String,
    commands: Vec<CreateCommand>,
    database_url: Option<String>,
    database_config: config::Database,
    persistence: database::Persistence,
}

impl Listener {
    pub fn new(
        config: &config::Configuration,
        commands: Vec<CreateCommand>,
        persistence: database::Persistence,
    ) -> Self {
        Self {
            presence: config.discord.presence.clone(),
            commands,
            database_url: config.authentication.database_url.clone(),
            database_config: config.database.clone(),
            persistence,
        }
    }

    /// Connects on the first ready event only. Without a URL this is a no-op.
    async fn connect_database(&self) {
        if self.persistence.is_connected() {
            return;
        }

        match database::connect_if_configured(self.database_url.as_deref(), &self.database_config)
            .await
        {
            Ok(Some(db)) => {
                self.persistence.set(db);
                tracing::info!("connected to database");
            }
            Ok(None) => {
                tracing::warn!("no database URL configured; storage-backed commands are disabled")
            }
            Err(err) => tracing::error!("failed to connect to database: {err}"),
        }
    }
}

#[serenity::async_trait]
impl EventListener for Listener {
    fn name(&self) -> &'static str {
        "ready"
    }

    fn kind(&self) -> EventKind {
        EventKind::Ready
    }

    async fn handle(&self, ctx: &Context, event: &BotEvent) -> anyhow::Result<()> {
        let BotEvent::Ready(ready) = event else {
            return Ok(());
        };

        tracing::info!("{} is connected; registering commands...", ready.user.name);
        ctx.set_presence(
            Some(ActivityData::watching(self.presence.clone())),
            OnlineStatus::Online,
        );

        self.connect_database().await;

        Command::set_global_commands(&ctx.http, self.commands.clone())
            .await
            .context("failed to register slash commands")?;
        tracing::info!(
            commands = self.commands.len(),
            "{} is good to go!",
            ready.user.name
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_startup_without_database_url_does_not_connect() {
        let config = config::Configuration::default();
        let persistence = database::Persistence::default();
        let listener = Listener::new(&config, vec![], persistence.clone());

        listener.connect_database().await;
        assert!(!persistence.is_connected());
    }

    #[tokio::test]
    async fn test_configured_database_is_connected_once() {
        let mut config = config::Configuration::default();
        config.authentication.database_url = Some("sqlite::memory:".to_string());
        config.database.max_connections = 1;
        let persistence = database::Persistence::default();
        let listener = Listener::new(&config, vec![], persistence.clone());

        listener.connect_database().await;
        assert!(persistence.is_connected());
        listener.connect_database().await;
        assert!(persistence.is_connected());
    }
}
