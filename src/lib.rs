//! # Chatquest - a persistent RPG for stream chat
//!
//! Chatquest is the game engine behind a chat bot's `rpg` command. Viewers quest against
//! level-scaled monsters, collect gold and loot, equip gear, challenge each other to friendly
//! duels and, when enabled, take on multi-phase raid bosses. Every character lives in an
//! embedded sled database and survives restarts.
//!
//! ## Features
//!
//! - **Quests**: Weighted monster selection, elite and boss variants, special abilities and drop tables.
//! - **Progression**: Fibonacci experience curve up to level 21 with cascading level-ups.
//! - **Items**: Equipment slots, stacking consumables, a shop with buy and sell.
//! - **Duels**: A challenge registry with accept, reject and cancel.
//! - **Atomic Commands**: Each command commits one change set or nothing at all.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chatquest::config::Config;
//! use chatquest::rpg::{RpgEngine, SledStoreBuilder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let store = SledStoreBuilder::new(&config.storage.data_dir).open()?;
//!     let engine = RpgEngine::new(Arc::new(store), config.game);
//!
//!     println!("{}", engine.handle_command("some_viewer", "quest"));
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`rpg`] - Catalogs, rules, persistence and command dispatch
//! - [`config`] - Configuration management
//! - [`validation`] - Player id normalization and input helpers
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   RpgEngine     │ ← locks, unit of work, commit
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Commands      │ ← quest, duel, shop, raid, items
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Repository    │ ← sled (or in-memory for tests)
//! └─────────────────┘
//! ```

pub mod config;
pub mod rpg;
pub mod validation;
