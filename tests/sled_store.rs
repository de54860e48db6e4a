//! Sled-backed persistence: reopen survival, purges and schema checks.
mod common;

use std::sync::Arc;

use chrono::Duration;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use chatquest::config::GameConfig;
use chatquest::rpg::storage::{InventoryChange, PurchaseChange};
use chatquest::rpg::{
    ChangeSet, CharacterRecord, DuelChallenge, EquipSlot, EquipmentLoadout, RpgEngine,
    RpgRepository, SledStoreBuilder, WalletRecord,
};
use common::{character, morning};

#[test]
fn state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rpg");
    {
        let store = SledStoreBuilder::new(&path).open().unwrap();
        let mut wallet = WalletRecord::new("ash");
        wallet.gold = 60;
        store
            .apply(&ChangeSet {
                wallets: vec![wallet],
                ..ChangeSet::default()
            })
            .unwrap();
        let engine = RpgEngine::new(Arc::new(store), GameConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        engine.handle_command_at("ash", "buy sword", morning(), &mut rng);
        engine.handle_command_at("ash", "equip sword", morning(), &mut rng);
        engine.handle_command_at("ash", "buy shield", morning(), &mut rng);
        engine.handle_command_at("ash", "shop time scroll", morning(), &mut rng);
    }

    let store = SledStoreBuilder::new(&path).open().unwrap();
    assert_eq!(store.list_player_ids().unwrap(), vec!["ash".to_string()]);
    assert_eq!(store.wallet("ash").unwrap().unwrap().gold, 25);
    let loadout = store.equipment("ash").unwrap().unwrap();
    assert_eq!(loadout.get(EquipSlot::Weapon), Some("sword"));
    let inventory = store.inventory("ash").unwrap();
    assert_eq!(inventory.get("shield"), Some(&1));
    assert_eq!(inventory.get("time scroll"), Some(&1));
    assert!(!inventory.contains_key("sword"));
    assert_eq!(
        store.last_purchase("ash", "time scroll").unwrap(),
        Some(morning())
    );
}

#[test]
fn zero_quantity_removes_row() {
    let dir = TempDir::new().unwrap();
    let store = SledStoreBuilder::new(dir.path()).open().unwrap();
    let row = |quantity| InventoryChange {
        player: "ash".to_string(),
        item: "potion".to_string(),
        quantity,
    };
    store
        .apply(&ChangeSet {
            inventory: vec![row(3)],
            ..ChangeSet::default()
        })
        .unwrap();
    assert_eq!(store.inventory("ash").unwrap().get("potion"), Some(&3));
    store
        .apply(&ChangeSet {
            inventory: vec![row(0)],
            ..ChangeSet::default()
        })
        .unwrap();
    assert!(store.inventory("ash").unwrap().is_empty());
}

#[test]
fn inventory_prefix_does_not_leak_between_players() {
    let dir = TempDir::new().unwrap();
    let store = SledStoreBuilder::new(dir.path()).open().unwrap();
    store
        .apply(&ChangeSet {
            inventory: vec![
                InventoryChange {
                    player: "ash".to_string(),
                    item: "potion".to_string(),
                    quantity: 1,
                },
                InventoryChange {
                    player: "ashley".to_string(),
                    item: "sword".to_string(),
                    quantity: 2,
                },
            ],
            ..ChangeSet::default()
        })
        .unwrap();
    let ash = store.inventory("ash").unwrap();
    assert_eq!(ash.len(), 1);
    assert_eq!(ash.get("potion"), Some(&1));
}

#[test]
fn purge_clears_every_table() {
    let dir = TempDir::new().unwrap();
    let store = SledStoreBuilder::new(dir.path()).open().unwrap();
    let mut loadout = EquipmentLoadout::empty();
    loadout.replace(EquipSlot::Armor, Some("shield".to_string()));
    store
        .apply(&ChangeSet {
            characters: vec![character("ash"), character("bob")],
            wallets: vec![WalletRecord::new("ash")],
            inventory: vec![InventoryChange {
                player: "ash".to_string(),
                item: "potion".to_string(),
                quantity: 2,
            }],
            equipment: vec![("ash".to_string(), loadout)],
            duels_put: vec![DuelChallenge::new("bob", "ash", morning())],
            purchases: vec![PurchaseChange {
                player: "ash".to_string(),
                item: "time scroll".to_string(),
                at: morning(),
            }],
            ..ChangeSet::default()
        })
        .unwrap();

    store
        .apply(&ChangeSet {
            purged_players: vec!["ash".to_string()],
            ..ChangeSet::default()
        })
        .unwrap();

    assert!(store.character("ash").unwrap().is_none());
    assert!(store.wallet("ash").unwrap().is_none());
    assert!(store.inventory("ash").unwrap().is_empty());
    assert!(store.equipment("ash").unwrap().is_none());
    assert!(store.duels_involving("bob").unwrap().is_empty());
    assert!(store.last_purchase("ash", "time scroll").unwrap().is_none());
    assert_eq!(store.list_player_ids().unwrap(), vec!["bob".to_string()]);
}

#[test]
fn duels_are_directed() {
    let dir = TempDir::new().unwrap();
    let store = SledStoreBuilder::new(dir.path()).open().unwrap();
    store
        .apply(&ChangeSet {
            duels_put: vec![
                DuelChallenge::new("ash", "bob", morning()),
                DuelChallenge::new("cid", "ash", morning() + Duration::minutes(1)),
            ],
            ..ChangeSet::default()
        })
        .unwrap();
    assert!(store.duel("ash", "bob").unwrap().is_some());
    assert!(store.duel("bob", "ash").unwrap().is_none());
    assert_eq!(store.duels_involving("ash").unwrap().len(), 2);
    assert_eq!(store.duels_involving("bob").unwrap().len(), 1);
}

#[test]
fn schema_mismatch_is_reported() {
    let dir = TempDir::new().unwrap();
    {
        let db = sled::open(dir.path()).unwrap();
        let tree = db.open_tree("rpg_characters").unwrap();
        let mut stale: CharacterRecord = character("ash");
        stale.schema_version = 99;
        tree.insert("ash", bincode::serialize(&stale).unwrap()).unwrap();
        db.flush().unwrap();
    }
    let store = SledStoreBuilder::new(dir.path()).open().unwrap();
    let err = store.character("ash").unwrap_err();
    assert!(err.to_string().contains("schema mismatch"), "{}", err);
}
