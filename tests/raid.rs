//! Raid gates, rewards and cooldowns with raids switched on.
mod common;

use std::sync::Arc;

use chrono::Duration;
use rand::rngs::StdRng;
use rand::SeedableRng;

use chatquest::config::GameConfig;
use chatquest::rpg::{MemoryStore, RpgEngine, RpgRepository};
use common::{character, gold_of, held, memory_engine_with, morning, seed_character, seed_item};

fn raid_engine() -> (Arc<MemoryStore>, RpgEngine) {
    memory_engine_with(GameConfig {
        raid_enabled: true,
        ..GameConfig::default()
    })
}

fn champion(player: &str, level: u32) -> chatquest::rpg::CharacterRecord {
    let mut record = character(player);
    record.level = level;
    record.attack = 5_000;
    record.defense = 5_000;
    record.max_hp = 2_000;
    record.current_hp = 2_000;
    record
}

#[test]
fn level_requirements_per_boss() {
    let (_, engine) = raid_engine();
    assert_eq!(engine.handle_command("ash", "raid"), "Level 15 required for raids!");
    assert_eq!(
        engine.handle_command("ash", "raid leviathan"),
        "Level 14 required for raids!"
    );
    assert!(engine
        .handle_command("ash", "raid dragon")
        .starts_with("Unknown raid boss \"dragon\""));
}

#[test]
fn victory_pays_out_and_starts_cooldown() {
    let (store, engine) = raid_engine();
    seed_character(&*store, champion("ash", 20));
    let mut rng = StdRng::seed_from_u64(4);

    let log = engine.handle_command_at("ash", "raid", morning(), &mut rng);
    assert!(log.starts_with("=== RAID STARTED ===\nEternity Tyrant: "), "{}", log);
    assert!(log.contains("PHASE 1: "), "{}", log);
    assert!(log.contains("PHASE 3: "), "{}", log);
    assert!(log.contains("RAID VICTORY! Rewards: "), "{}", log);
    assert!(log.contains("gold and Cosmic Core!"), "{}", log);

    let gold = gold_of(&*store, "ash");
    assert!((3..=30).contains(&gold), "gold {}", gold);
    assert_eq!(held(&*store, "ash", "cosmic core"), 1);
    let record = store.character("ash").unwrap().unwrap();
    assert_eq!(record.last_raid_time, Some(morning()));
    assert!(record.current_hp > 0);

    assert_eq!(
        engine.handle_command_at("ash", "raid tyrant", morning() + Duration::hours(1), &mut rng),
        "The Eternity Tyrant is still recovering. Try again in 23h 0m."
    );
}

#[test]
fn trophy_cracks_open_for_gold() {
    let (store, engine) = raid_engine();
    seed_character(&*store, champion("ash", 20));
    seed_item(&*store, "ash", "cosmic core", 1);
    assert_eq!(
        engine.handle_command("ash", "use cosmic"),
        "You opened the Cosmic Core and found 80 gold! (Base: 40 + Level Bonus: 40)"
    );
}

#[test]
fn defeat_knocks_out_and_rests() {
    let (store, engine) = raid_engine();
    let mut weakling = character("ash");
    weakling.level = 15;
    weakling.max_hp = 10;
    weakling.current_hp = 10;
    seed_character(&*store, weakling);
    let mut rng = StdRng::seed_from_u64(2);

    let log = engine.handle_command_at("ash", "raid", morning(), &mut rng);
    assert!(log.ends_with("Raid failed..."), "{}", log);
    let record = store.character("ash").unwrap().unwrap();
    assert_eq!(record.current_hp, 0);
    assert_eq!(record.rest_until, Some(morning() + Duration::hours(3)));
    assert!(store.inventory("ash").unwrap().is_empty());

    let blocked = engine.handle_command_at("ash", "raid", morning() + Duration::minutes(5), &mut rng);
    assert!(blocked.starts_with("You're too wounded to quest!"), "{}", blocked);
}

#[test]
fn raid_spends_scroll_buff_and_charm() {
    let (store, engine) = raid_engine();
    let mut record = champion("ash", 16);
    record.temp_attack_buff = 2;
    seed_character(&*store, record);
    seed_item(&*store, "ash", "damage charm", 1);
    let mut rng = StdRng::seed_from_u64(9);

    let log = engine.handle_command_at("ash", "raid leviathan", morning(), &mut rng);
    assert!(log.contains("Your Stats: ATK 5002*, DEF 5000"), "{}", log);
    assert_eq!(held(&*store, "ash", "damage charm"), 0);
    assert_eq!(store.character("ash").unwrap().unwrap().temp_attack_buff, 0);
}
