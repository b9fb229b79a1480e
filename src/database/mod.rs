use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};

use crate::config;

pub mod entity;
pub mod profile;
pub mod short_url;
pub mod voice_channel;

pub use profile::ProfileRepository;
pub use short_url::{NewShortUrl, ShortUrlRepository};
pub use voice_channel::VoiceChannelRepository;

/// Connects to the database and creates any missing tables.
///
/// Gives up after `connect_timeout_secs` rather than hanging startup on an
/// unreachable server.
pub async fn connect(url: &str, config: &config::Database) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(url);
    opt.connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .max_connections(config.max_connections.max(1))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Connects only if a URL is configured. No URL is not an error.
pub async fn connect_if_configured(
    url: Option<&str>,
    config: &config::Database,
) -> Result<Option<DatabaseConnection>, DbErr> {
    match url {
        Some(url) => connect(url, config).await.map(Some),
        None => Ok(None),
    }
}

async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    for mut stmt in [
        schema.create_table_from_entity(entity::profile::Entity),
        schema.create_table_from_entity(entity::voice_channel::Entity),
        schema.create_table_from_entity(entity::short_url::Entity),
    ] {
        db.execute(backend.build(stmt.if_not_exists())).await?;
    }
    Ok(())
}

/// Shared handle to the database, filled in once the bot connects
#[derive(Clone, Default)]
pub struct Persistence {
    connection: Arc<OnceLock<DatabaseConnection>>,
}

impl Persistence {
    pub fn get(&self) -> Option<&DatabaseConnection> {
        self.connection.get()
    }

    /// Returns `false` if a connection was already set.
    pub fn set(&self, db: DatabaseConnection) -> bool {
        self.connection.set(db).is_ok()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.get().is_some()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub async fn memory_db() -> DatabaseConnection {
        let config = config::Database {
            max_connections: 1,
            ..Default::default()
        };
        connect("sqlite::memory:", &config).await.unwrap()
    }

    #[tokio::test]
    async fn test_no_url_skips_connection() {
        let db = connect_if_configured(None, &config::Database::default())
            .await
            .unwrap();
        assert!(db.is_none());
    }

    #[tokio::test]
    async fn test_tables_are_created_idempotently() {
        let db = memory_db().await;
        create_tables(&db).await.unwrap();
    }

    #[tokio::test]
    async fn test_persistence_is_set_once() {
        let persistence = Persistence::default();
        assert!(!persistence.is_connected());

        assert!(persistence.set(memory_db().await));
        assert!(!persistence.set(memory_db().await));
        assert!(persistence.clone().is_connected());
    }
}
