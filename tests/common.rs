//! Test utilities & fixtures shared by the integration tests.
#![allow(dead_code)] // each test crate uses a different subset

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use chatquest::config::GameConfig;
use chatquest::rpg::storage::InventoryChange;
use chatquest::rpg::{
    ChangeSet, CharacterRecord, EquipmentLoadout, MemoryStore, RpgEngine, RpgRepository,
    WalletRecord,
};

/// A fixed morning so daily-bonus and cooldown math is reproducible.
pub fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 4, 9, 0, 0).unwrap()
}

pub fn memory_engine() -> (Arc<MemoryStore>, RpgEngine) {
    memory_engine_with(GameConfig::default())
}

pub fn memory_engine_with(rules: GameConfig) -> (Arc<MemoryStore>, RpgEngine) {
    let store = Arc::new(MemoryStore::new());
    let engine = RpgEngine::new(store.clone(), rules);
    (store, engine)
}

pub fn character(player: &str) -> CharacterRecord {
    CharacterRecord::new(player, morning())
}

pub fn seed_character(store: &dyn RpgRepository, record: CharacterRecord) {
    store
        .apply(&ChangeSet {
            characters: vec![record],
            ..ChangeSet::default()
        })
        .unwrap();
}

pub fn seed_gold(store: &dyn RpgRepository, player: &str, gold: u64) {
    let mut wallet = WalletRecord::new(player);
    wallet.gold = gold;
    store
        .apply(&ChangeSet {
            wallets: vec![wallet],
            ..ChangeSet::default()
        })
        .unwrap();
}

pub fn seed_item(store: &dyn RpgRepository, player: &str, item: &str, quantity: u32) {
    store
        .apply(&ChangeSet {
            inventory: vec![InventoryChange {
                player: player.to_string(),
                item: item.to_string(),
                quantity,
            }],
            ..ChangeSet::default()
        })
        .unwrap();
}

pub fn seed_loadout(store: &dyn RpgRepository, player: &str, loadout: EquipmentLoadout) {
    store
        .apply(&ChangeSet {
            equipment: vec![(player.to_string(), loadout)],
            ..ChangeSet::default()
        })
        .unwrap();
}

pub fn gold_of(store: &dyn RpgRepository, player: &str) -> u64 {
    store
        .wallet(player)
        .unwrap()
        .map(|wallet| wallet.gold)
        .unwrap_or(0)
}

pub fn held(store: &dyn RpgRepository, player: &str, item: &str) -> u32 {
    store
        .inventory(player)
        .unwrap()
        .get(item)
        .copied()
        .unwrap_or(0)
}
