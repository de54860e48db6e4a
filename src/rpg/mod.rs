//! # RPG engine
//!
//! Everything behind the chat commands: static catalogs, rules, persistence and dispatch.
//!
//! ## Layout
//!
//! - [`engine`] - [`RpgEngine`], the entry point taking `(player, text)` and returning a reply
//! - [`commands`] - tokenizer and dispatch table
//! - [`combat`], [`raid`], [`duel`], [`shop`], [`equipment`], [`effects`], [`progression`] - rules
//! - [`monsters`], [`items`], [`dice`] - static data and dice notation
//! - [`storage`], [`memory`], [`tx`], [`locks`] - persistence, unit of work and serialization
//!
//! ```rust
//! use std::sync::Arc;
//! use chatquest::config::GameConfig;
//! use chatquest::rpg::{MemoryStore, RpgEngine};
//!
//! let engine = RpgEngine::new(Arc::new(MemoryStore::new()), GameConfig::default());
//! assert_eq!(engine.handle_command("viewer", "wallet"), "Your gold: 0");
//! ```
pub mod combat;
pub mod commands;
pub mod dice;
pub mod duel;
pub mod effects;
pub mod engine;
pub mod equipment;
pub mod errors;
pub mod items;
pub mod locks;
pub mod memory;
pub mod monsters;
pub mod progression;
pub mod raid;
pub mod shop;
pub mod storage;
pub mod tx;
pub mod types;

pub use commands::RpgCommand;
pub use engine::RpgEngine;
pub use errors::RpgError;
pub use memory::MemoryStore;
pub use storage::{ChangeSet, RpgRepository, SledStore, SledStoreBuilder};
pub use tx::Tx;
pub use types::{CharacterRecord, DuelChallenge, EquipSlot, EquipmentLoadout, WalletRecord};
