//! Buying and selling against the static catalog.
use chrono::Duration;
use log::debug;

use crate::rpg::errors::RpgError;
use crate::rpg::items::{with_article, ConsumableEffect, ItemDefinition, ItemKind, ITEMS};
use crate::rpg::progression::{ensure_character, ensure_wallet};
use crate::rpg::tx::Tx;

/// Items with a rolling once-per-day purchase limit.
const DAILY_LIMITED: &[&str] = &["time scroll"];

fn purchase_window() -> Duration {
    Duration::hours(24)
}

/// `shop`, `shop <item>` and `shop sell <item>`.
pub fn handle_shop(tx: &mut Tx<'_>, player: &str, param: &str, link: &str) -> Result<String, RpgError> {
    ensure_character(tx, player)?;
    let param = param.trim();
    if param.is_empty() {
        return Ok(format!("check the shop: {}", link));
    }
    match param.split_once(' ') {
        Some(("sell", rest)) => sell_item(tx, player, rest),
        _ if param == "sell" => sell_item(tx, player, ""),
        _ => buy_item(tx, player, param),
    }
}

fn stocked(item: &ItemDefinition) -> bool {
    item.purchasable && !item.is_treasure()
}

pub fn buy_item(tx: &mut Tx<'_>, player: &str, query: &str) -> Result<String, RpgError> {
    let query = query.trim();
    let Some(item) = ITEMS.iter().find(|item| stocked(item) && item.matches(query)) else {
        return Ok(format!(
            "Item \"{}\" not found in shop. Try 'shop' to see available items.",
            query
        ));
    };

    if let ItemKind::Consumable(ConsumableEffect::PermanentBonus { guard, .. }) = item.kind {
        let character = ensure_character(tx, player)?;
        if guard.is_spent(&character) {
            return Ok(format!(
                "You have already absorbed the power of {} and cannot benefit from another.",
                with_article(item.name)
            ));
        }
    }

    let now = tx.now();
    let limited = DAILY_LIMITED.contains(&item.id);
    if limited {
        if let Some(last) = tx.last_purchase(player, item.id)? {
            let since = now - last;
            if since < purchase_window() {
                let left = purchase_window() - since;
                let hours = (left.num_seconds() as f64 / 3600.0).ceil() as i64;
                return Ok(format!(
                    "You can only buy {}s once per day. Come back in {} hours.",
                    item.name, hours
                ));
            }
        }
    }

    let mut wallet = ensure_wallet(tx, player)?;
    if wallet.gold < item.value {
        return Ok(format!(
            "You need {} gold to buy {} (you have {}).",
            item.value, item.name, wallet.gold
        ));
    }
    wallet.gold -= item.value;
    tx.put_wallet(wallet);
    tx.give_item(player, item.id, 1)?;
    if limited {
        tx.record_purchase(player, item.id);
    }
    debug!("{} bought {} for {}", player, item.id, item.value);
    Ok(format!(
        "You bought {} for {} gold! Use 'use {}' to use it.",
        item.name, item.value, item.id
    ))
}

pub fn sell_item(tx: &mut Tx<'_>, player: &str, query: &str) -> Result<String, RpgError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok("Please specify what item you want to sell. Use 'shop sell [item name]'.".to_string());
    }
    let owned = tx.inventory(player)?;
    let Some(item) = ITEMS
        .iter()
        .find(|item| item.matches(query) && owned.get(item.id).copied().unwrap_or(0) > 0)
    else {
        return Ok(format!(
            "You don't have an item matching \"{}\" to sell. Type 'inv' to see your inventory.",
            query
        ));
    };

    let value = item.sell_value();
    tx.remove_item(player, item.id, 1)?;
    let mut wallet = ensure_wallet(tx, player)?;
    wallet.gold = wallet.gold.saturating_add(value);
    let balance = wallet.gold;
    tx.put_wallet(wallet);
    Ok(format!(
        "You sold {} for {} gold. (You now have {} gold)",
        item.name, value, balance
    ))
}
