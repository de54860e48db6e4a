//! Loadout management and the modifiers it feeds into combat.
use log::debug;

use crate::rpg::effects::apply_consumable;
use crate::rpg::errors::RpgError;
use crate::rpg::items::{find_item, item_name, ItemDefinition, ItemKind, ITEMS};
use crate::rpg::progression::ensure_character;
use crate::rpg::tx::Tx;
use crate::rpg::types::EquipSlot;

/// Everything on top of base stats that a fight should account for.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CombatModifiers {
    pub extra_attack: u32,
    pub extra_defense: u32,
    /// Equipment bonuses plus the permanent `quest_success_chance / 100`.
    pub success_bonus: f64,
    /// One-shot attack bonus from combat scrolls.
    pub temp_attack_bonus: u32,
    pub xp_boost: f64,
}

/// Sum equipment, permanent and temporary modifiers for `player`.
///
/// With `consume` set the pending temp attack buff is zeroed in the same unit of work, so it
/// is spent exactly once. Status views pass `false`.
pub fn combat_modifiers(
    tx: &mut Tx<'_>,
    player: &str,
    consume: bool,
) -> Result<CombatModifiers, RpgError> {
    let mut mods = CombatModifiers::default();
    let loadout = tx.equipment(player)?;
    for id in loadout.equipped() {
        if let Some(gear) = find_item(id).and_then(|item| item.equip_mods()) {
            mods.extra_attack += gear.attack;
            mods.extra_defense += gear.defense;
            mods.success_bonus += gear.success_bonus;
            mods.xp_boost += gear.xp_boost;
        }
    }

    if let Some(mut character) = tx.character(player)? {
        if character.quest_success_chance > 0 {
            mods.success_bonus += character.quest_success_chance as f64 / 100.0;
        }
        mods.temp_attack_bonus = character.temp_attack_buff;
        if consume && character.temp_attack_buff > 0 {
            debug!(
                "{} spends temp attack buff +{}",
                player, character.temp_attack_buff
            );
            character.temp_attack_buff = 0;
            tx.put_character(character);
        }
    }
    Ok(mods)
}

/// First owned item (catalog order) whose id or name contains `query`.
fn owned_match(
    tx: &mut Tx<'_>,
    player: &str,
    query: &str,
    filter: impl Fn(&ItemDefinition) -> bool,
) -> Result<Option<&'static ItemDefinition>, RpgError> {
    let owned = tx.inventory(player)?;
    Ok(ITEMS.iter().find(|item| {
        filter(item) && item.matches(query) && owned.get(item.id).copied().unwrap_or(0) > 0
    }))
}

pub fn equip_item(tx: &mut Tx<'_>, player: &str, query: &str) -> Result<String, RpgError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok("Specify an item to equip. Type 'inv' to see your inventory.".to_string());
    }
    let Some(item) = owned_match(tx, player, query, ItemDefinition::is_equipment)? else {
        let known = ITEMS
            .iter()
            .find(|item| item.is_equipment() && item.matches(query));
        return Ok(match known {
            Some(item) => format!(
                "You don't have a \"{}\" in your inventory. Type 'inv' to see your items.",
                item.name
            ),
            None => format!(
                "No equipment named \"{}\" found or you don't own it. Type 'inv' to see your inventory.",
                query
            ),
        });
    };
    let ItemKind::Equipment { slot, .. } = item.kind else {
        return Err(RpgError::Internal(format!("{} is not equipment", item.id)));
    };

    let mut loadout = tx.equipment(player)?;
    let mut message = String::new();
    if let Some(old) = loadout.replace(slot, Some(item.id.to_string())) {
        tx.give_item(player, &old, 1)?;
        message = format!("Unequipped {}. ", item_name(&old));
    }
    tx.put_equipment(player, loadout);
    tx.remove_item(player, item.id, 1)?;
    debug!("{} equipped {} ({})", player, item.id, slot.as_str());
    message.push_str(&format!("Equipped {} in {} slot.", item.name, slot.as_str()));
    Ok(message)
}

pub fn unequip_item(tx: &mut Tx<'_>, player: &str, query: &str) -> Result<String, RpgError> {
    let Some(slot) = EquipSlot::from_query(query) else {
        return Ok("Invalid slot. Use 'weapon', 'armor', or 'accessory'.".to_string());
    };
    let mut loadout = tx.equipment(player)?;
    let Some(old) = loadout.replace(slot, None) else {
        return Ok(format!("Nothing equipped in {} slot.", slot.as_str()));
    };
    tx.give_item(player, &old, 1)?;
    tx.put_equipment(player, loadout);
    Ok(format!(
        "Unequipped {} from {} slot.",
        item_name(&old),
        slot.as_str()
    ))
}

/// Use an owned item: equipment is equipped, consumables are spent and applied.
pub fn use_item(tx: &mut Tx<'_>, player: &str, query: &str) -> Result<String, RpgError> {
    ensure_character(tx, player)?;
    let query = query.trim();
    if query.is_empty() {
        return Ok("Specify an item to use. Type 'inv' to see your inventory.".to_string());
    }
    let Some(item) = owned_match(tx, player, query, |_| true)? else {
        return Ok(format!(
            "You don't have an item matching \"{}\" in your inventory. Type 'inv' to see your items.",
            query
        ));
    };
    match item.kind {
        ItemKind::Equipment { .. } => equip_item(tx, player, query),
        ItemKind::Consumable(effect) => apply_consumable(tx, player, item, effect),
    }
}

pub fn view_inventory(tx: &mut Tx<'_>, player: &str) -> Result<String, RpgError> {
    let owned = tx.inventory(player)?;
    let mut gear = Vec::new();
    let mut consumables = Vec::new();
    for (id, quantity) in &owned {
        let Some(item) = find_item(id) else {
            continue;
        };
        let line = format!("{} ({}) x{}", item.name, item.effect, quantity);
        if item.is_equipment() {
            gear.push(line);
        } else {
            consumables.push(line);
        }
    }

    let mut response = String::from("Inventory:");
    if owned.is_empty() {
        response.push_str(" Empty! Visit the shop with 'shop' command.");
    } else {
        if !gear.is_empty() {
            response.push_str(&format!("\nEquipment: {}", gear.join(", ")));
        }
        if !consumables.is_empty() {
            response.push_str(&format!("\nConsumables: {}", consumables.join(", ")));
        }
    }

    let loadout = tx.equipment(player)?;
    response.push_str("\n\nEquipped:");
    for slot in EquipSlot::ALL {
        let name = loadout.get(slot).map(item_name).unwrap_or("None");
        response.push_str(&format!("\n- {}: {}", slot.label(), name));
    }
    Ok(response)
}
