use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, time::Duration};

use crate::service::{MAX_ATTEMPTS, MAX_WORD_SIZE};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub game: GameConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string. `None` runs the service on the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub dictionary_path: String,
    pub default_word_size: u32,
    pub default_attempts: u32,
    pub repair_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub sender: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            max_connections: var_or("DATABASE_MAX_CONNECTIONS", "10")
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
        };

        let server = ServerConfig {
            host: var_or("HOST", "0.0.0.0"),
            port: var_or("PORT", "3000")
                .parse()
                .context("PORT must be a number")?,
        };

        let game = GameConfig {
            dictionary_path: var_or("DICTIONARY_PATH", "./dictionary.txt"),
            default_word_size: var_or("DEFAULT_WORD_SIZE", "5")
                .parse()
                .context("DEFAULT_WORD_SIZE must be a positive number")?,
            default_attempts: var_or("DEFAULT_ATTEMPTS", "5")
                .parse()
                .context("DEFAULT_ATTEMPTS must be a positive number")?,
            repair_interval_secs: var_or("REPAIR_INTERVAL_SECS", "30")
                .parse()
                .unwrap_or(30),
        };

        if !(1..=MAX_WORD_SIZE).contains(&game.default_word_size) {
            anyhow::bail!("DEFAULT_WORD_SIZE must be between 1 and {}", MAX_WORD_SIZE);
        }
        if !(1..=MAX_ATTEMPTS).contains(&game.default_attempts) {
            anyhow::bail!("DEFAULT_ATTEMPTS must be between 1 and {}", MAX_ATTEMPTS);
        }

        let mail = MailConfig {
            sender: var_or("MAIL_SENDER", "noreply@hangman.local"),
        };

        Ok(Config {
            database,
            server,
            game,
            mail,
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database.url.as_deref()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn repair_interval(&self) -> Duration {
        Duration::from_secs(self.game.repair_interval_secs.max(1))
    }
}
