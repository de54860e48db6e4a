//! Character ledger: lazy creation, the XP curve, level-ups, the daily bonus and the
//! status views built on top of them.
use log::{debug, info};
use rand::Rng;

use crate::rpg::dice::DiceSpec;
use crate::rpg::equipment::combat_modifiers;
use crate::rpg::errors::RpgError;
use crate::rpg::tx::Tx;
use crate::rpg::types::{ceil_minutes, CharacterRecord, WalletRecord, MAX_LEVEL};

pub const DAILY_BONUS_DICE: DiceSpec = DiceSpec::new(2, 4, 0);

const PROGRESS_BAR_SEGMENTS: u64 = 20;

/// XP needed to advance from `level`: `fib(level + 3)` with `fib(1) = 0`, `fib(2) = 1`.
pub fn exp_for_level(level: u32) -> u64 {
    let n = level.saturating_add(3);
    let (mut prev, mut cur) = (0u64, 1u64);
    if n == 1 {
        return prev;
    }
    for _ in 3..=n {
        let next = prev.saturating_add(cur);
        prev = cur;
        cur = next;
    }
    cur
}

pub fn ensure_character(tx: &mut Tx<'_>, player: &str) -> Result<CharacterRecord, RpgError> {
    if let Some(existing) = tx.character(player)? {
        return Ok(existing);
    }
    debug!("creating character for {}", player);
    let record = CharacterRecord::new(player, tx.now());
    tx.put_character(record.clone());
    Ok(record)
}

pub fn ensure_wallet(tx: &mut Tx<'_>, player: &str) -> Result<WalletRecord, RpgError> {
    if let Some(existing) = tx.wallet(player)? {
        return Ok(existing);
    }
    let record = WalletRecord::new(player);
    tx.put_wallet(record.clone());
    Ok(record)
}

/// Add `gold` to the player's wallet and return the new balance.
pub fn credit_gold(tx: &mut Tx<'_>, player: &str, gold: u64) -> Result<u64, RpgError> {
    let mut wallet = ensure_wallet(tx, player)?;
    wallet.gold = wallet.gold.saturating_add(gold);
    let balance = wallet.gold;
    tx.put_wallet(wallet);
    Ok(balance)
}

/// Apply every level-up the character's XP pays for, stopping at the cap.
/// Leftover XP carries over. Returns the cascade message, or `None` if nothing changed.
pub fn apply_level_ups(character: &mut CharacterRecord) -> Option<String> {
    let mut messages = Vec::new();
    while character.level < MAX_LEVEL {
        let needed = exp_for_level(character.level);
        if character.exp < needed {
            break;
        }
        character.exp -= needed;
        character.level += 1;
        let level = character.level;
        character.max_hp += (1 + level / 5).max(1);
        character.attack += (1 + level / 10).max(1);
        if level % 2 == 0 {
            character.defense += 1;
        }

        let mut message = format!("LEVEL UP! You reached level {}!", level);
        if level >= MAX_LEVEL {
            message.push_str(" Congratulations! You've reached the maximum level cap!");
        } else {
            message.push_str(&format!(" Next level at {} XP.", exp_for_level(level)));
        }
        messages.push(message);
    }
    if messages.is_empty() {
        return None;
    }
    info!(
        "{} reached level {} (+{} levels)",
        character.player_id,
        character.level,
        messages.len()
    );
    Some(messages.join(" "))
}

/// Percent of the way to the next level, floored.
pub fn level_percent(character: &CharacterRecord) -> u64 {
    let needed = exp_for_level(character.level).max(1);
    character.exp.saturating_mul(100) / needed
}

/// Compact progress line appended to quest results.
pub fn progress_line(character: &CharacterRecord) -> String {
    if character.is_max_level() {
        return format!("Level {} (Maximum level reached)", MAX_LEVEL);
    }
    let needed = exp_for_level(character.level);
    format!(
        "Lv {}: {}% ({} XP to next)",
        character.level,
        level_percent(character),
        needed.saturating_sub(character.exp)
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DailyBonus {
    pub given: bool,
    /// True when this collection created the wallet.
    pub first_time: bool,
    pub amount: u64,
    pub rolls: Vec<u32>,
}

impl DailyBonus {
    pub fn message(&self) -> Option<String> {
        if !self.given {
            return None;
        }
        let rolled = self
            .rolls
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(" + ");
        Some(format!(
            "You also received a daily quest bonus of {} gold! (Rolled: {})",
            self.amount, rolled
        ))
    }
}

/// Grant the once-per-UTC-day gold bonus if it has not been collected today.
pub fn add_daily_gold_bonus<R: Rng + ?Sized>(
    tx: &mut Tx<'_>,
    player: &str,
    rng: &mut R,
) -> Result<DailyBonus, RpgError> {
    let today = tx.now().date_naive();
    let existing = tx.wallet(player)?;
    if let Some(wallet) = &existing {
        if wallet.last_collected_day == Some(today) {
            return Ok(DailyBonus::default());
        }
    }
    let first_time = existing.is_none();
    let roll = DAILY_BONUS_DICE.roll(rng);
    let mut wallet = existing.unwrap_or_else(|| WalletRecord::new(player));
    wallet.gold = wallet.gold.saturating_add(roll.total);
    wallet.last_collected_day = Some(today);
    tx.put_wallet(wallet);
    debug!("daily bonus for {}: {} gold", player, roll.total);
    Ok(DailyBonus {
        given: true,
        first_time,
        amount: roll.total,
        rolls: roll.rolls,
    })
}

/// `2 hours and 5 minutes`, `1 hour`, `45 minutes`.
pub fn rest_time_text(total_minutes: i64) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    let mut text = String::new();
    if hours > 0 {
        text.push_str(&format!("{} hour{}", hours, if hours > 1 { "s" } else { "" }));
        if minutes > 0 {
            text.push_str(" and ");
        }
    }
    if minutes > 0 || hours == 0 {
        text.push_str(&format!(
            "{} minute{}",
            minutes,
            if minutes > 1 { "s" } else { "" }
        ));
    }
    text
}

pub fn wallet_view(tx: &mut Tx<'_>, player: &str) -> Result<String, RpgError> {
    let wallet = ensure_wallet(tx, player)?;
    Ok(format!("Your gold: {}", wallet.gold))
}

/// One-line character sheet. Resolves an expired rest before reporting.
pub fn character_status(tx: &mut Tx<'_>, player: &str) -> Result<String, RpgError> {
    let mut character = ensure_character(tx, player)?;
    let now = tx.now();
    let mut resting = String::new();
    if let Some(left) = character.rest_remaining(now) {
        let minutes = ceil_minutes(left);
        resting = format!(" | RESTING: {}h {}m remaining", minutes / 60, minutes % 60);
    } else if character.finish_rest_if_due(now) {
        tx.put_character(character.clone());
    }

    let mods = combat_modifiers(tx, player, false)?;
    let wallet = ensure_wallet(tx, player)?;
    Ok([
        format!("Level {}", character.level),
        format!("XP: {}/{}", character.exp, exp_for_level(character.level)),
        format!("HP: {}/{}", character.current_hp, character.max_hp),
        format!(
            "Attack: Base: {} (total: {})",
            character.attack,
            character.attack + mods.extra_attack
        ),
        format!(
            "Defense: Base: {} (total: {})",
            character.defense,
            character.defense + mods.extra_defense
        ),
        format!("Gold: {}{}", wallet.gold, resting),
    ]
    .join(" | "))
}

/// Progress bar toward the next level.
pub fn exp_progress(tx: &mut Tx<'_>, player: &str) -> Result<String, RpgError> {
    let character = ensure_character(tx, player)?;
    if character.is_max_level() {
        return Ok(format!(
            "Level {} - Maximum level reached! You are at the pinnacle of power!",
            character.level
        ));
    }
    let needed = exp_for_level(character.level);
    let percent = level_percent(&character).min(100);
    let filled = (percent * PROGRESS_BAR_SEGMENTS / 100) as usize;
    let bar = format!(
        "[{}{}]",
        "=".repeat(filled),
        " ".repeat(PROGRESS_BAR_SEGMENTS as usize - filled)
    );
    Ok(format!(
        "Level {} progress: {} {}%\nXP: {}/{} ({} more needed for level {})",
        character.level,
        bar,
        percent,
        character.exp,
        needed,
        needed.saturating_sub(character.exp),
        character.level + 1
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpg::memory::MemoryStore;
    use crate::rpg::storage::RpgRepository;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn exp_curve_follows_shifted_fibonacci() {
        let expected = [2u64, 3, 5, 8, 13, 21, 34, 55];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(exp_for_level(i as u32 + 1), *want, "level {}", i + 1);
        }
        assert_eq!(exp_for_level(20), 17_711);
        for level in 1..MAX_LEVEL {
            assert!(exp_for_level(level + 1) > exp_for_level(level));
        }
    }

    #[test]
    fn level_up_keeps_remainder_and_current_hp() {
        let mut c = CharacterRecord::new("ash", noon());
        c.exp = 3; // level 1 needs 2
        c.current_hp = 4;
        let message = apply_level_ups(&mut c).expect("level up");
        assert_eq!(message, "LEVEL UP! You reached level 2! Next level at 3 XP.");
        assert_eq!((c.level, c.exp), (2, 1));
        assert_eq!(c.max_hp, 6);
        assert_eq!(c.attack, 2);
        assert_eq!(c.defense, 1);
        assert_eq!(c.current_hp, 4);
    }

    #[test]
    fn cascading_level_ups_join_messages() {
        let mut c = CharacterRecord::new("ash", noon());
        c.exp = 2 + 3 + 5 + 1;
        let message = apply_level_ups(&mut c).unwrap();
        assert_eq!(c.level, 4);
        assert_eq!(c.exp, 1);
        assert_eq!(message.matches("LEVEL UP!").count(), 3);
        assert!(message.contains("level 3! Next level at 8 XP. LEVEL UP! You reached level 4!"));
    }

    #[test]
    fn level_cap_stops_cascade() {
        let mut c = CharacterRecord::new("ash", noon());
        c.exp = u64::MAX / 2;
        let message = apply_level_ups(&mut c).unwrap();
        assert_eq!(c.level, MAX_LEVEL);
        assert!(message.ends_with("Congratulations! You've reached the maximum level cap!"));
        assert!(apply_level_ups(&mut c).is_none());
    }

    #[test]
    fn no_level_up_returns_none() {
        let mut c = CharacterRecord::new("ash", noon());
        c.exp = 1;
        assert!(apply_level_ups(&mut c).is_none());
        assert_eq!(progress_line(&c), "Lv 1: 50% (1 XP to next)");
    }

    #[test]
    fn daily_bonus_once_per_utc_day() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(5);
        let mut tx = Tx::new(&store, noon());
        let first = add_daily_gold_bonus(&mut tx, "ash", &mut rng).unwrap();
        assert!(first.given && first.first_time);
        assert!((2..=8).contains(&first.amount));
        assert_eq!(first.rolls.len(), 2);
        let second = add_daily_gold_bonus(&mut tx, "ash", &mut rng).unwrap();
        assert!(!second.given);
        assert!(second.message().is_none());
        assert_eq!(tx.wallet("ash").unwrap().unwrap().gold, first.amount);

        let store_changes = tx.into_changes();
        store.apply(&store_changes).unwrap();
        let mut next_day = Tx::new(&store, noon() + Duration::hours(12));
        let third = add_daily_gold_bonus(&mut next_day, "ash", &mut rng).unwrap();
        assert!(third.given && !third.first_time);
    }

    #[test]
    fn bonus_message_lists_each_die() {
        let bonus = DailyBonus {
            given: true,
            first_time: false,
            amount: 5,
            rolls: vec![2, 3],
        };
        assert_eq!(
            bonus.message().unwrap(),
            "You also received a daily quest bonus of 5 gold! (Rolled: 2 + 3)"
        );
    }

    #[test]
    fn rest_time_text_pluralizes() {
        assert_eq!(rest_time_text(180), "3 hours");
        assert_eq!(rest_time_text(61), "1 hour and 1 minute");
        assert_eq!(rest_time_text(125), "2 hours and 5 minutes");
        assert_eq!(rest_time_text(1), "1 minute");
    }

    #[test]
    fn progress_bar_has_twenty_segments() {
        let store = MemoryStore::new();
        let mut tx = Tx::new(&store, noon());
        let mut c = ensure_character(&mut tx, "ash").unwrap();
        c.level = 3;
        c.exp = 2; // of 5 -> 40%
        tx.put_character(c);
        let text = exp_progress(&mut tx, "ash").unwrap();
        assert_eq!(
            text,
            "Level 3 progress: [========            ] 40%\nXP: 2/5 (3 more needed for level 4)"
        );
    }
}
