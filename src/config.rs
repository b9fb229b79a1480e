use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Configuration {
    pub authentication: Authentication,
    pub discord: Discord,
    pub mention_reply: MentionReply,
    pub database: Database,
    pub spellcheck: Spellcheck,
    pub links: Links,
}
impl Configuration {
    const FILENAME: &str = "config.toml";
    const TOKEN_VAR: &str = "DISCORD_TOKEN";
    const DATABASE_URL_VAR: &str = "DATABASE_URL";

    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new(Self::FILENAME))
    }

    /// Writes a default file on first run. A failed write is not fatal since
    /// the environment may still supply everything needed.
    fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut config = if let Ok(file) = std::fs::read_to_string(path) {
            toml::from_str(&file).context("failed to load config")?
        } else {
            let config = Self::default();
            if let Err(err) = config.save(path) {
                tracing::warn!(path = %path.display(), "could not write default config: {err:#}");
            }
            config
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    fn save(&self, path: &Path) -> anyhow::Result<()> {
        Ok(std::fs::write(path, toml::to_string_pretty(self)?)?)
    }

    /// Environment values win over the file so secrets can stay out of it.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var(Self::TOKEN_VAR).filter(|t| !t.is_empty()) {
            self.authentication.discord_token = Some(token);
        }
        if let Some(url) = var(Self::DATABASE_URL_VAR).filter(|u| !u.is_empty()) {
            self.authentication.database_url = Some(url);
        }
    }

    pub fn discord_token(&self) -> anyhow::Result<&str> {
        self.authentication
            .discord_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .with_context(|| {
                format!(
                    "Expected {} to be set or authentication.discord_token to be filled in config",
                    Self::TOKEN_VAR
                )
            })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Authentication {
    pub discord_token: Option<String>,
    /// Optional; persistence-backed commands are unavailable without it
    pub database_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Discord {
    /// Users allowed to run developer-only commands
    pub developer_ids: Vec<u64>,
    /// Channel that receives message deletion logs
    pub message_log_channel_id: Option<u64>,
    pub presence: String,
    /// How many observed messages to remember for deletion logs
    pub message_cache_size: usize,
    /// How many (user, command) cooldown entries to track
    pub cooldown_cache_size: usize,
}

impl Default for Discord {
    fn default() -> Self {
        Self {
            developer_ids: vec![],
            message_log_channel_id: None,
            presence: "over the server".to_string(),
            message_cache_size: 1000,
            cooldown_cache_size: 10_000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MentionReply {
    pub emoji: String,
    /// Probability in [0, 1] of sending a text reply alongside the reaction
    pub reply_chance: f64,
    pub replies: Vec<String>,
}

impl Default for MentionReply {
    fn default() -> Self {
        Self {
            emoji: "👋".to_string(),
            reply_chance: 0.3,
            replies: [
                "You rang?",
                "Hello there!",
                "I'm listening.",
                "Need something? Try one of my slash commands.",
                "Present!",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Database {
    pub connect_timeout_secs: u64,
    pub max_connections: u32,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            max_connections: 5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Spellcheck {
    /// Newline-separated word list
    pub dictionary_path: String,
}

impl Default for Spellcheck {
    fn default() -> Self {
        Self {
            dictionary_path: "/usr/share/dict/words".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Links {
    pub base_url: String,
}

impl Default for Links {
    fn default() -> Self {
        Self {
            base_url: "https://hearth.link".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Configuration = toml::from_str(
            r#"
            [discord]
            developer_ids = [42]
            "#,
        )
        .unwrap();

        assert_eq!(config.discord.developer_ids, vec![42]);
        assert_eq!(config.discord.message_cache_size, 1000);
        assert_eq!(config.database.connect_timeout_secs, 15);
        assert_eq!(config.mention_reply.reply_chance, 0.3);
        assert!(config.authentication.database_url.is_none());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Configuration::default();
        config.authentication.discord_token = Some("from-file".to_string());
        config.apply_env_overrides(|key| match key {
            "DISCORD_TOKEN" => Some("from-env".to_string()),
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            _ => None,
        });

        assert_eq!(config.discord_token().unwrap(), "from-env");
        assert_eq!(
            config.authentication.database_url.as_deref(),
            Some("sqlite::memory:")
        );
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let mut config = Configuration::default();
        config.apply_env_overrides(|_| None);
        assert!(config.discord_token().is_err());

        config.authentication.discord_token = Some(String::new());
        assert!(config.discord_token().is_err());
    }

    #[test]
    fn test_unwritable_location_falls_back_to_defaults() {
        let path = std::env::temp_dir()
            .join("hearthbot-no-such-dir")
            .join("nested")
            .join("config.toml");

        let config = Configuration::load_from(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(config.discord.message_cache_size, 1000);
    }
}
