//! Quest and duel resolution.
//!
//! The numeric core is a set of pure functions (odds, score, damage, XP) so the formulas can
//! be checked in isolation. [`resolve_quest`] and [`resolve_duel`] wire them to the unit of
//! work and draw randomness from the caller's RNG in a fixed order.
use chrono::Duration;
use log::{debug, info};
use rand::Rng;

use crate::config::GameConfig;
use crate::rpg::equipment::combat_modifiers;
use crate::rpg::errors::RpgError;
use crate::rpg::items::{item_name, ConsumableEffect, ItemKind, ITEMS};
use crate::rpg::monsters::{select_monster, AbilityEffect};
use crate::rpg::progression::{
    add_daily_gold_bonus, apply_level_ups, credit_gold, ensure_character, level_percent,
    progress_line, rest_time_text,
};
use crate::rpg::tx::Tx;
use crate::rpg::types::{ceil_minutes, CharacterRecord, MAX_LEVEL};

pub const MIN_SUCCESS: f64 = 0.35;
pub const MAX_SUCCESS: f64 = 0.75;
pub const SUCCESS_FLOOR: f64 = 0.2;
pub const VICTORY_THRESHOLD: f64 = 0.5;

/// Loot for flawless wins: cumulative roll thresholds.
const FLAWLESS_DROPS: [(f64, &str); 4] = [
    (0.25, "time scroll"),
    (0.65, "treasure"),
    (0.85, "potion"),
    (1.0, "amulet"),
];
const NORMAL_DROPS: [(f64, &str); 4] = [
    (0.15, "rare treasure"),
    (0.6, "treasure"),
    (0.8, "potion"),
    (1.0, "amulet"),
];

/// Pre-roll odds for one quest encounter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestOdds {
    pub attack_ratio: f64,
    pub defense_ratio: f64,
    pub health_ratio: f64,
    pub advantage: f64,
    pub level_modifier: f64,
    /// Clamped into `[MIN_SUCCESS, MAX_SUCCESS]`, before ability penalties.
    pub success_chance: f64,
}

/// Effective player stats going into a fight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fighter {
    pub level: u32,
    pub attack: u32,
    pub defense: u32,
    pub current_hp: u32,
    pub max_hp: u32,
}

impl Fighter {
    fn health_ratio(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.current_hp as f64 / self.max_hp as f64
    }
}

pub fn quest_odds(
    player: &Fighter,
    monster_damage: u32,
    monster_hp: u32,
    monster_level: u32,
    item_bonus: f64,
) -> QuestOdds {
    let attack_ratio = player.attack as f64 / monster_damage.max(1) as f64;
    let defense_ratio = player.defense as f64 / monster_hp.max(5) as f64;
    let health_ratio = player.health_ratio();
    let advantage = attack_ratio * 0.4 + defense_ratio * 0.4 + health_ratio * 0.2;

    let level_diff = player.level as i64 - monster_level as i64;
    let level_modifier = (level_diff as f64 * 0.05).clamp(-0.2, 0.2);

    let base = MIN_SUCCESS + advantage * 0.4;
    let success_chance = (base + level_modifier + item_bonus).clamp(MIN_SUCCESS, MAX_SUCCESS);
    QuestOdds {
        attack_ratio,
        defense_ratio,
        health_ratio,
        advantage,
        level_modifier,
        success_chance,
    }
}

/// Success chance after an ability penalty, never below [`SUCCESS_FLOOR`].
pub fn final_success(success_chance: f64, penalty: f64) -> f64 {
    (success_chance - penalty).max(SUCCESS_FLOOR)
}

/// Share of the score left to luck: 0.5 for an unprepared fighter down to 0.2.
pub fn random_weight(advantage: f64) -> f64 {
    let skill = advantage.min(1.0);
    0.5 - skill * 0.3
}

/// `luck` is a uniform draw in `[0, 1)`.
pub fn combat_score(advantage: f64, final_success: f64, luck: f64) -> f64 {
    let weight = random_weight(advantage);
    (1.0 - weight) * final_success + luck * weight
}

pub fn flawless_chance(advantage: f64) -> f64 {
    (0.05 + advantage * 0.25).min(0.3)
}

fn damage_reduction(defense: u32) -> f64 {
    defense as f64 / (defense as f64 + 10.0)
}

/// Damage taken on a non-flawless win, and the hit ratio shown to the player.
pub fn victory_damage(monster_damage: u32, defense: u32, score: f64) -> (u32, f64) {
    let margin = score - VICTORY_THRESHOLD;
    let ratio = 0.4 - margin * 0.8;
    let base = monster_damage as f64 * ratio.max(0.05);
    let dealt = (base * (1.0 - damage_reduction(defense))).floor().max(1.0);
    (dealt as u32, ratio)
}

/// Damage taken on a defeat, and the power multiplier shown to the player.
pub fn defeat_damage(monster_damage: u32, defense: u32, score: f64) -> (u32, f64) {
    let margin = VICTORY_THRESHOLD - score;
    let multiplier = 0.7 + margin * 0.6;
    let base = monster_damage as f64 * multiplier;
    let dealt = (base * (1.0 - damage_reduction(defense))).floor().max(1.0);
    (dealt as u32, multiplier)
}

/// XP for a win, scaled by how far the monster out-levels the player.
pub fn quest_exp(monster_exp: u64, monster_level: u32, player_level: u32, xp_boost: f64) -> u64 {
    let level_diff = monster_level as i64 - player_level as i64;
    let factor = (1.0 + level_diff as f64 * 0.1).max(0.5);
    (monster_exp as f64 * factor * (1.0 + xp_boost)).ceil() as u64
}

pub fn consolation_chance(score: f64) -> f64 {
    let margin = VICTORY_THRESHOLD - score;
    0.3 + 0.3 * (1.0 - margin)
}

pub fn consolation_exp(monster_exp: u64, xp_boost: f64) -> u64 {
    ((monster_exp as f64 * 0.3 * (1.0 + xp_boost)).floor() as u64).max(1)
}

fn defeat_reason(odds: &QuestOdds, fired: Option<AbilityEffect>) -> String {
    if odds.attack_ratio < 0.8 {
        "Your attack was too weak".to_string()
    } else if odds.defense_ratio < 0.7 {
        "Your defense was insufficient".to_string()
    } else if odds.health_ratio < 0.5 {
        "Low health before fight".to_string()
    } else if let Some(effect) = fired {
        format!("Monster's {} ability", effect.combat_tag())
    } else {
        "Bad luck this time".to_string()
    }
}

fn pick_drop(table: &[(f64, &'static str)], roll: f64) -> &'static str {
    table
        .iter()
        .find(|(threshold, _)| roll < *threshold)
        .or_else(|| table.last())
        .map(|(_, id)| *id)
        .unwrap_or("treasure")
}

/// Spend one held combat charm and return the HP it strips from the enemy.
pub fn spend_combat_charm(tx: &mut Tx<'_>, player: &str) -> Result<u32, RpgError> {
    for item in ITEMS {
        if let ItemKind::Consumable(ConsumableEffect::ArmedInCombat { monster_debuff }) = item.kind {
            if tx.remove_item(player, item.id, 1)? {
                debug!("{} triggers {}", player, item.id);
                return Ok(monster_debuff);
            }
        }
    }
    Ok(0)
}

/// Rest and cooldown gates shared by quests and raids. `Some` is the rejection reply.
pub fn rest_gate(tx: &mut Tx<'_>, character: &mut CharacterRecord) -> Option<String> {
    let now = tx.now();
    if let Some(left) = character.rest_remaining(now) {
        return Some(format!(
            "You're too wounded to quest! Rest for {} more or use a health potion.",
            rest_time_text(ceil_minutes(left))
        ));
    }
    if character.finish_rest_if_due(now) {
        tx.put_character(character.clone());
        return Some(format!(
            "You've rested and recovered to {}/{} HP.",
            character.current_hp, character.max_hp
        ));
    }
    None
}

pub fn resolve_quest<R: Rng + ?Sized>(
    tx: &mut Tx<'_>,
    player: &str,
    rules: &GameConfig,
    rng: &mut R,
) -> Result<String, RpgError> {
    let mut character = ensure_character(tx, player)?;
    if let Some(reply) = rest_gate(tx, &mut character) {
        return Ok(reply);
    }

    let now = tx.now();
    let cooldown = Duration::minutes(rules.quest_cooldown_minutes as i64);
    if let Some(last) = character.last_quest_time {
        let elapsed = now - last;
        if elapsed < cooldown {
            return Ok(format!(
                "Wait {} more minute(s) before questing again.",
                ceil_minutes(cooldown - elapsed)
            ));
        }
    }

    let Some(mut monster) = select_monster(character.level, rng) else {
        return Ok("No monsters roam near your level right now. Try again later.".to_string());
    };
    character.last_quest_time = Some(now);
    tx.put_character(character.clone());

    let debuff = spend_combat_charm(tx, player)?;
    if debuff > 0 {
        monster.hp = monster.hp.saturating_sub(debuff).max(1);
    }

    let mods = combat_modifiers(tx, player, true)?;
    character.temp_attack_buff = 0;

    let fighter = Fighter {
        level: character.level,
        attack: character.attack + mods.extra_attack + mods.temp_attack_bonus,
        defense: character.defense + mods.extra_defense,
        current_hp: character.current_hp,
        max_hp: character.max_hp,
    };
    let odds = quest_odds(
        &fighter,
        monster.damage,
        monster.hp,
        monster.level,
        mods.success_bonus,
    );

    let mut penalty = 0.0;
    let mut fired = None;
    let mut monster_damage = monster.damage;
    if let Some(ability) = monster.ability {
        if rng.gen::<f64>() < ability.chance {
            fired = Some(ability.effect);
            match ability.effect {
                AbilityEffect::DamageOverTime => penalty = 0.1,
                AbilityEffect::CriticalHit => {
                    monster_damage = (monster_damage as f64 * 1.5).floor() as u32
                }
                AbilityEffect::Dodge => penalty = 0.15,
                AbilityEffect::LifeSteal => {}
            }
        }
    }
    let chance = final_success(odds.success_chance, penalty);

    let daily = add_daily_gold_bonus(tx, player, rng)?;
    let daily_line = daily
        .message()
        .map(|message| format!("\n{}", message))
        .unwrap_or_default();
    let welcome = if daily.given && daily.first_time {
        "Welcome adventurer! "
    } else {
        ""
    };

    let mut combat_line = format!(
        "[{}You (ATK:{}{}/DEF:{}) vs {} (ATK:{}{})]",
        welcome,
        fighter.attack,
        if mods.temp_attack_bonus > 0 { "*" } else { "" },
        fighter.defense,
        monster.describe(),
        monster_damage,
        fired
            .map(|effect| format!(" {}", effect.combat_tag()))
            .unwrap_or_default()
    );
    if mods.temp_attack_bonus > 0 {
        combat_line.push_str(&format!(
            " (Combat Scroll Active: +{} ATK*.)",
            mods.temp_attack_bonus
        ));
    }

    let score = combat_score(odds.advantage, chance, rng.gen::<f64>());
    let display_roll: u32 = rng.gen_range(1..=100);
    let roll_text = format!("[Roll: {}/{}]", display_roll, (chance * 100.0).floor() as i64);
    let at_cap = character.is_max_level();

    if score >= VICTORY_THRESHOLD {
        let flawless = rng.gen::<f64>() < flawless_chance(odds.advantage);
        let exp_gain = quest_exp(monster.exp, monster.level, character.level, mods.xp_boost);
        let rolled = monster.gold.roll(rng).total;
        let mut gold = if flawless {
            (rolled as f64 * 1.2).ceil() as u64
        } else {
            rolled
        };
        if at_cap {
            gold += (exp_gain as f64 / 3.0).ceil() as u64;
        } else {
            character.exp = character.exp.saturating_add(exp_gain);
        }
        credit_gold(tx, player, gold)?;

        let mut damage_text = String::new();
        if !flawless {
            let (taken, ratio) = victory_damage(monster_damage, fighter.defense, score);
            character.current_hp = character.current_hp.saturating_sub(taken).max(1);
            damage_text = format!(
                " Took {} damage ({}% hit). HP: {}/{}",
                taken,
                (ratio * 100.0).floor() as i64,
                character.current_hp,
                character.max_hp
            );
        }

        let mut result = format!(
            "{}{} Found {} gold",
            if flawless { "Flawless Victory! " } else { "Victory! " },
            roll_text,
            gold
        );
        if at_cap {
            result.push_str(" (includes max level bonus)");
        }
        result.push('.');

        let drop_chance = if flawless { 0.5 } else { 0.35 };
        if rng.gen::<f64>() < drop_chance {
            let table: &[(f64, &'static str)] = if flawless {
                &FLAWLESS_DROPS
            } else {
                &NORMAL_DROPS
            };
            let drop = pick_drop(table, rng.gen::<f64>());
            tx.give_item(player, drop, 1)?;
            result.push_str(&format!(" +{}", item_name(drop)));
        }

        let tail = if at_cap {
            format!("Level {} (Maximum level reached)", MAX_LEVEL)
        } else {
            apply_level_ups(&mut character).unwrap_or_else(|| progress_line(&character))
        };
        debug!(
            "{} beat {} (score {:.3}, flawless {})",
            player, monster.id, score, flawless
        );
        tx.put_character(character);
        return Ok(format!(
            "{}\n{}{}{}\n{}",
            combat_line, result, damage_text, daily_line, tail
        ));
    }

    let (taken, multiplier) = defeat_damage(monster_damage, fighter.defense, score);
    character.current_hp = character.current_hp.saturating_sub(taken);
    let mut result = format!(
        "Defeat! {} {} hit for {} damage ({}% power, {})",
        roll_text,
        monster.describe(),
        taken,
        (multiplier * 100.0).floor() as i64,
        defeat_reason(&odds, fired)
    );
    if character.current_hp == 0 {
        character.rest_until = Some(now + Duration::hours(rules.rest_hours as i64));
        result.push_str(&format!(
            ". Knocked out! Rest {}h or use potion.",
            rules.rest_hours
        ));
        info!("{} was knocked out by {}", player, monster.id);
    } else {
        result.push_str(&format!(
            ". HP: {}/{}",
            character.current_hp, character.max_hp
        ));
    }

    let mut consolation = String::new();
    if rng.gen::<f64>() < consolation_chance(score) {
        let exp_gain = consolation_exp(monster.exp, mods.xp_boost);
        if at_cap {
            consolation = "\nNo XP gained (max level reached)".to_string();
        } else {
            character.exp = character.exp.saturating_add(exp_gain);
            consolation = match apply_level_ups(&mut character) {
                Some(levels) => format!("\nGained {} XP despite defeat!\n{}", exp_gain, levels),
                None => format!(
                    "\nGained {} XP. (Lv {}: {}%)",
                    exp_gain,
                    character.level,
                    level_percent(&character)
                ),
            };
        }
    }
    tx.put_character(character);
    Ok(format!(
        "{}\n{}{}{}",
        combat_line, result, daily_line, consolation
    ))
}

/// Chance that the challenger wins, given a uniform `luck` draw.
pub fn duel_win_probability(challenger: &Fighter, defender: &Fighter, luck: f64) -> f64 {
    let challenger_power = challenger.attack as f64 / (defender.defense as f64 + 5.0)
        * (0.5 + challenger.health_ratio() * 0.5);
    let defender_power = defender.attack as f64 / (challenger.defense as f64 + 5.0)
        * (0.5 + defender.health_ratio() * 0.5);
    let total = challenger_power + defender_power;
    let base = if total > 0.0 {
        challenger_power / total
    } else {
        0.5
    };
    (base * (0.75 + luck * 0.5)).clamp(0.1, 0.9)
}

fn duelist(tx: &mut Tx<'_>, player: &str) -> Result<(Fighter, bool), RpgError> {
    let character = ensure_character(tx, player)?;
    let mods = combat_modifiers(tx, player, false)?;
    Ok((
        Fighter {
            level: character.level,
            attack: character.attack + mods.extra_attack + mods.temp_attack_bonus,
            defense: character.defense + mods.extra_defense,
            current_hp: character.current_hp,
            max_hp: character.max_hp,
        },
        mods.temp_attack_bonus > 0,
    ))
}

/// Friendly duel: reads both sheets, writes nothing.
pub fn resolve_duel<R: Rng + ?Sized>(
    tx: &mut Tx<'_>,
    challenger: &str,
    defender: &str,
    rng: &mut R,
) -> Result<String, RpgError> {
    let (left, left_buffed) = duelist(tx, challenger)?;
    let (right, right_buffed) = duelist(tx, defender)?;

    let probability = duel_win_probability(&left, &right, rng.gen::<f64>());
    let roll: f64 = rng.gen();
    let winner = if roll < probability { challenger } else { defender };
    info!(
        "duel {} vs {}: {} wins ({:.2} vs {:.2})",
        challenger, defender, winner, roll, probability
    );

    let line = |name: &str, f: &Fighter, buffed: bool| {
        format!(
            "{} (L{} | ATK:{}{}/DEF:{} | HP:{}/{})\n",
            name,
            f.level,
            f.attack,
            if buffed { "*" } else { "" },
            f.defense,
            f.current_hp,
            f.max_hp
        )
    };
    let mut log = format!("Duel: {} vs {}\n", challenger, defender);
    log.push_str(&line(challenger, &left, left_buffed));
    log.push_str(&line(defender, &right, right_buffed));
    log.push_str(&format!(
        "[Roll: {}/{}] {} wins the duel!",
        (roll * 100.0).round() as i64,
        (probability * 100.0).round() as i64,
        winner
    ));
    log.push_str("\n(Friendly duel - no HP loss or rewards)");
    Ok(log)
}
