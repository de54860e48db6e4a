//! XP curve, level-up cascade and the progress views.
mod common;

use chatquest::rpg::progression::{apply_level_ups, exp_for_level};
use chatquest::rpg::types::MAX_LEVEL;
use common::{character, memory_engine, seed_character};

#[test]
fn curve_is_fibonacci() {
    let needed: Vec<u64> = (1..=8).map(exp_for_level).collect();
    assert_eq!(needed, vec![2, 3, 5, 8, 13, 21, 34, 55]);
    for level in 3..MAX_LEVEL {
        assert_eq!(
            exp_for_level(level),
            exp_for_level(level - 1) + exp_for_level(level - 2)
        );
    }
}

#[test]
fn cascade_carries_leftover_xp() {
    let mut record = character("ash");
    record.exp = 2 + 3 + 5 + 1;
    let message = apply_level_ups(&mut record).unwrap();
    assert_eq!(record.level, 4);
    assert_eq!(record.exp, 1);
    assert_eq!(message.matches("LEVEL UP!").count(), 3);
    assert!(message.ends_with("Next level at 8 XP."), "{}", message);
}

#[test]
fn cascade_stops_at_cap() {
    let mut record = character("ash");
    record.level = MAX_LEVEL - 1;
    record.exp = u64::MAX / 2;
    let message = apply_level_ups(&mut record).unwrap();
    assert_eq!(record.level, MAX_LEVEL);
    assert!(message.contains("maximum level cap"));
    assert!(apply_level_ups(&mut record).is_none());
}

#[test]
fn level_ups_raise_stats() {
    let mut record = character("ash");
    let before = record.clone();
    record.exp = exp_for_level(1);
    apply_level_ups(&mut record);
    assert_eq!(record.level, 2);
    assert!(record.max_hp > before.max_hp);
    assert!(record.attack > before.attack);
    assert_eq!(record.defense, before.defense + 1);
}

#[test]
fn progress_bar_view() {
    let (store, engine) = memory_engine();
    let mut record = character("ash");
    record.level = 3;
    record.exp = 2;
    seed_character(&*store, record);
    assert_eq!(
        engine.handle_command("ash", "exp"),
        "Level 3 progress: [========            ] 40%\nXP: 2/5 (3 more needed for level 4)"
    );
    assert_eq!(engine.handle_command("ash", "xp"), engine.handle_command("ash", "progress"));
}

#[test]
fn progress_view_at_cap() {
    let (store, engine) = memory_engine();
    let mut record = character("ash");
    record.level = MAX_LEVEL;
    seed_character(&*store, record);
    assert_eq!(
        engine.handle_command("ash", "exp"),
        "Level 21 - Maximum level reached! You are at the pinnacle of power!"
    );
}
