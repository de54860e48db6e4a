//! Interpreter for [`ConsumableEffect`].
//!
//! The caller has already matched an owned consumable. This module decides whether it is
//! spent, applies the effect to the unit of work and phrases the reply.
use log::info;

use crate::rpg::errors::RpgError;
use crate::rpg::items::{with_article, ConsumableEffect, ItemDefinition};
use crate::rpg::progression::{apply_level_ups, credit_gold, ensure_character, progress_line};
use crate::rpg::tx::Tx;

pub const CURSED_MESSAGE: &str = "💀 The cursed milk burns as it goes down... Your character has been permanently deleted! All progress, items, and gold have been lost. You'll need to start over completely. The curse has claimed another victim... 💀";

pub fn apply_consumable(
    tx: &mut Tx<'_>,
    player: &str,
    item: &ItemDefinition,
    effect: ConsumableEffect,
) -> Result<String, RpgError> {
    // Charms stay in the bag until a fight picks them up.
    let spent = !matches!(effect, ConsumableEffect::ArmedInCombat { .. });
    if spent && !tx.remove_item(player, item.id, 1)? {
        return Err(RpgError::Internal(format!(
            "{} vanished from {}'s inventory",
            item.id, player
        )));
    }
    let mut character = ensure_character(tx, player)?;
    let reply = match effect {
        ConsumableEffect::Heal { amount, revives } => {
            if revives && character.rest_until.is_some() {
                character.current_hp = (1 + amount).min(character.max_hp);
                character.rest_until = None;
                format!(
                    "You used {} while resting and recovered from unconsciousness! Your HP is now {}/{}.",
                    with_article(item.name), character.current_hp, character.max_hp
                )
            } else {
                character.current_hp = (character.current_hp + amount).min(character.max_hp);
                if revives {
                    format!(
                        "You used {} and recovered {} HP! (HP: {}/{})",
                        with_article(item.name), amount, character.current_hp, character.max_hp
                    )
                } else {
                    format!(
                        "{} healed {} HP! (Now: {}/{})",
                        item.name, amount, character.current_hp, character.max_hp
                    )
                }
            }
        }
        ConsumableEffect::FullHeal => {
            let was_resting = character.rest_until.take().is_some();
            character.current_hp = character.max_hp;
            if was_resting {
                format!(
                    "You used {} while resting and fully recovered from unconsciousness! Your HP is now {}/{}!",
                    with_article(item.name), character.max_hp, character.max_hp
                )
            } else {
                format!(
                    "You used {} and fully recovered! (HP: {}/{})",
                    with_article(item.name), character.max_hp, character.max_hp
                )
            }
        }
        ConsumableEffect::GrantGold { base, per_level } => {
            let bonus = (character.level as f64 * per_level).floor() as u64;
            let total = base + bonus;
            credit_gold(tx, player, total)?;
            if bonus == 0 && per_level == 0.0 {
                format!("You found {} gold in the {}!", total, item.name)
            } else {
                format!(
                    "You opened the {} and found {} gold! (Base: {} + Level Bonus: {})",
                    item.name, total, base, bonus
                )
            }
        }
        ConsumableEffect::GrantXp { amount } => {
            if character.is_max_level() {
                format!(
                    "The {} holds nothing more to teach you. You are already at the maximum level.",
                    item.name
                )
            } else {
                character.exp = character.exp.saturating_add(amount);
                let follow_up = apply_level_ups(&mut character)
                    .unwrap_or_else(|| progress_line(&character));
                format!("The {} grants you {} XP!\n{}", item.name, amount, follow_up)
            }
        }
        ConsumableEffect::AttackBuff { amount } => {
            character.temp_attack_buff += amount;
            format!(
                "You activate the {}! Your next quest's attack is empowered (+{} ATK, +{} pending).",
                item.name, amount, character.temp_attack_buff
            )
        }
        ConsumableEffect::ResetCooldown => {
            character.last_quest_time = None;
            "The sands of time reverse! Quest cooldown reset - you can adventure again immediately!"
                .to_string()
        }
        ConsumableEffect::PermanentBonus { percent, guard } => {
            if guard.is_spent(&character) {
                format!(
                    "You have already absorbed the power of {}. It cannot be stacked.",
                    with_article(item.name)
                )
            } else {
                guard.spend(&mut character);
                character.quest_success_chance += percent;
                format!(
                    "The {} releases its power into you! You permanently gain +{}% quest success chance!",
                    item.name, percent
                )
            }
        }
        ConsumableEffect::DeleteCharacter => {
            tx.purge_player(player)?;
            info!("{} drank cursed milk; character purged", player);
            return Ok(CURSED_MESSAGE.to_string());
        }
        ConsumableEffect::ArmedInCombat { monster_debuff } => {
            return Ok(format!(
                "The {} hums with energy. It triggers by itself at the start of your next quest or raid, dealing {} damage to the enemy.",
                item.name, monster_debuff
            ));
        }
    };
    tx.put_character(character);
    Ok(reply)
}
