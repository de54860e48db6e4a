//! # Configuration Management Module
//!
//! TOML configuration for the chatquest engine and its binary.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - Gameplay knobs handed to the engine (cooldowns, links, raid toggle)
//! - [`StorageConfig`] - Where the sled database lives
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! Every field has a serde default, so a partial file (or an empty one) is valid.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chatquest::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("Data dir: {}", config.storage.data_dir);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! shop_link = "https://pastebin.com/vKx1ZPUV"
//! bot_keyword = "kloy"
//! quest_cooldown_minutes = 60
//! rest_hours = 3
//! raid_enabled = false
//! commit_attempts = 3
//!
//! [storage]
//! data_dir = "data/rpg"
//!
//! [logging]
//! level = "info"
//! file = "chatquest.log"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    /// Returned verbatim by a bare `shop`.
    #[serde(default = "default_shop_link")]
    pub shop_link: String,
    /// Bot name used in the "unknown command" hint.
    #[serde(default = "default_bot_keyword")]
    pub bot_keyword: String,
    #[serde(default = "default_quest_cooldown_minutes")]
    pub quest_cooldown_minutes: u32,
    /// Knock-out rest length.
    #[serde(default = "default_rest_hours")]
    pub rest_hours: u32,
    /// Raids answer with a refusal unless enabled.
    #[serde(default)]
    pub raid_enabled: bool,
    /// Commit tries per command before the player gets the failure reply.
    #[serde(default = "default_commit_attempts")]
    pub commit_attempts: u32,
}

fn default_shop_link() -> String {
    "https://pastebin.com/vKx1ZPUV".to_string()
}

fn default_bot_keyword() -> String {
    "kloy".to_string()
}

fn default_quest_cooldown_minutes() -> u32 {
    60
}

fn default_rest_hours() -> u32 {
    3
}

fn default_commit_attempts() -> u32 {
    3
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            shop_link: default_shop_link(),
            bot_keyword: default_bot_keyword(),
            quest_cooldown_minutes: default_quest_cooldown_minutes(),
            rest_hours: default_rest_hours(),
            raid_enabled: false,
            commit_attempts: default_commit_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "data/rpg".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}
