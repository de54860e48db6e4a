//! Consumable effects applied through `use`.
mod common;

use chrono::Duration;
use rand::rngs::StdRng;
use rand::SeedableRng;

use chatquest::rpg::effects::CURSED_MESSAGE;
use chatquest::rpg::{DuelChallenge, RpgRepository};
use common::{character, gold_of, held, memory_engine, morning, seed_character, seed_gold, seed_item};

#[test]
fn combat_scrolls_stack_until_the_next_quest() {
    let (store, engine) = memory_engine();
    seed_item(&*store, "ash", "combat scroll", 2);
    let mut rng = StdRng::seed_from_u64(11);
    let now = morning();

    engine.handle_command_at("ash", "use combat scroll", now, &mut rng);
    let second = engine.handle_command_at("ash", "use combat scroll", now, &mut rng);
    assert_eq!(
        second,
        "You activate the Combat Scroll! Your next quest's attack is empowered (+2 ATK, +4 pending)."
    );
    assert_eq!(store.character("ash").unwrap().unwrap().temp_attack_buff, 4);

    let quest = engine.handle_command_at("ash", "quest", now, &mut rng);
    assert!(quest.contains("You (ATK:5*/DEF:0)"), "{}", quest);
    assert!(quest.contains("(Combat Scroll Active: +4 ATK*.)"), "{}", quest);
    assert_eq!(store.character("ash").unwrap().unwrap().temp_attack_buff, 0);
}

#[test]
fn status_view_does_not_spend_buff() {
    let (store, engine) = memory_engine();
    seed_item(&*store, "ash", "combat catalyst", 1);
    engine.handle_command("ash", "use catalyst");
    engine.handle_command("ash", "char");
    assert_eq!(store.character("ash").unwrap().unwrap().temp_attack_buff, 4);
}

#[test]
fn potion_revives_resting_character() {
    let (store, engine) = memory_engine();
    let mut knocked = character("ash");
    knocked.current_hp = 0;
    knocked.rest_until = Some(morning() + Duration::hours(2));
    seed_character(&*store, knocked);
    seed_item(&*store, "ash", "potion", 1);

    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(
        engine.handle_command_at("ash", "use potion", morning(), &mut rng),
        "You used a Health Potion while resting and recovered from unconsciousness! Your HP is now 5/5."
    );
    let record = store.character("ash").unwrap().unwrap();
    assert!(record.rest_until.is_none());
    assert_eq!(held(&*store, "ash", "potion"), 0);
}

#[test]
fn time_scroll_clears_quest_cooldown() {
    let (store, engine) = memory_engine();
    let mut tired = character("ash");
    tired.last_quest_time = Some(morning() - Duration::minutes(10));
    seed_character(&*store, tired);
    seed_item(&*store, "ash", "time scroll", 1);
    let mut rng = StdRng::seed_from_u64(3);

    assert_eq!(
        engine.handle_command_at("ash", "quest", morning(), &mut rng),
        "Wait 50 more minute(s) before questing again."
    );
    engine.handle_command_at("ash", "use time", morning(), &mut rng);
    let quest = engine.handle_command_at("ash", "quest", morning(), &mut rng);
    assert!(!quest.starts_with("Wait"), "{}", quest);
}

#[test]
fn damage_charm_waits_for_combat() {
    let (store, engine) = memory_engine();
    seed_item(&*store, "ash", "damage charm", 1);
    let mut rng = StdRng::seed_from_u64(5);

    let reply = engine.handle_command_at("ash", "use charm", morning(), &mut rng);
    assert!(reply.contains("hums with energy"), "{}", reply);
    assert_eq!(held(&*store, "ash", "damage charm"), 1);

    engine.handle_command_at("ash", "quest", morning(), &mut rng);
    assert_eq!(held(&*store, "ash", "damage charm"), 0);
}

#[test]
fn xp_tome_cascades_levels() {
    let (store, engine) = memory_engine();
    seed_item(&*store, "ash", "tome of knowledge", 1);
    let reply = engine.handle_command("ash", "use tome");
    assert!(reply.starts_with("The Tome of Knowledge grants you 500 XP!\n"), "{}", reply);
    let record = store.character("ash").unwrap().unwrap();
    assert!(record.level > 5, "level {}", record.level);
    assert!(record.current_hp <= record.max_hp);
}

#[test]
fn xp_items_do_nothing_at_level_cap() {
    let (store, engine) = memory_engine();
    let mut veteran = character("ash");
    veteran.level = 21;
    seed_character(&*store, veteran);
    seed_item(&*store, "ash", "ancient wisdom", 1);
    let reply = engine.handle_command("ash", "use wisdom");
    assert!(reply.contains("already at the maximum level"), "{}", reply);
    let record = store.character("ash").unwrap().unwrap();
    assert_eq!(record.exp, 0);
    assert_eq!(held(&*store, "ash", "ancient wisdom"), 0);
}

#[test]
fn cursed_milk_purges_everything() {
    let (store, engine) = memory_engine();
    seed_character(&*store, character("ash"));
    seed_character(&*store, character("bob"));
    seed_gold(&*store, "ash", 250);
    seed_item(&*store, "ash", "cursed milk", 1);
    seed_item(&*store, "ash", "sword", 3);
    store
        .apply(&chatquest::rpg::ChangeSet {
            duels_put: vec![DuelChallenge::new("bob", "ash", morning())],
            ..Default::default()
        })
        .unwrap();

    assert_eq!(engine.handle_command("ash", "use milk"), CURSED_MESSAGE);
    assert!(store.character("ash").unwrap().is_none());
    assert!(store.wallet("ash").unwrap().is_none());
    assert!(store.inventory("ash").unwrap().is_empty());
    assert!(store.duels_involving("ash").unwrap().is_empty());
    assert!(store.character("bob").unwrap().is_some());

    // The next command starts over from scratch.
    let sheet = engine.handle_command("ash", "char");
    assert!(sheet.starts_with("Level 1 | XP: 0/2 | HP: 5/5"), "{}", sheet);
    assert_eq!(gold_of(&*store, "ash"), 0);
}
