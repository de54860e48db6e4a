//! Chat command tokenizer and dispatch.
//!
//! The first word of the (lowercased) message selects the handler; the remainder is passed
//! through as the parameter. Aliases map onto the same variant.
use rand::Rng;

use crate::config::GameConfig;
use crate::rpg::combat::resolve_quest;
use crate::rpg::duel::{handle_duel, DuelAction};
use crate::rpg::equipment::{equip_item, unequip_item, use_item, view_inventory};
use crate::rpg::errors::RpgError;
use crate::rpg::progression::{character_status, ensure_character, exp_progress, wallet_view};
use crate::rpg::raid::{handle_raid, RAID_DISABLED};
use crate::rpg::shop::handle_shop;
use crate::rpg::tx::Tx;
use crate::validation::{normalize_player_id, split_command};

pub const HELP_TEXT: &str = "Commands: quest (adventure & collect daily gold bonus), char (view character), inv (check inventory), wallet (check gold), shop (buy items), use [item], equip [item], unequip [slot], exp (show progress), duel [player]";

pub const CHECKIN_RETIRED: &str = "[daily bonus is part of questing now]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpgCommand {
    Wallet,
    Checkin,
    Character,
    Quest,
    Inventory,
    Shop(String),
    Use(String),
    Equip(String),
    Unequip(String),
    Progress,
    Help,
    Duel(DuelAction),
    Raid(String),
    Unknown,
}

impl RpgCommand {
    pub fn parse(text: &str) -> Self {
        let (head, param) = split_command(text);
        match head.as_str() {
            "wallet" | "gold" => RpgCommand::Wallet,
            "checkin" | "check" | "daily" => RpgCommand::Checkin,
            "char" | "character" | "stats" => RpgCommand::Character,
            "quest" | "adventure" => RpgCommand::Quest,
            "inv" | "inventory" => RpgCommand::Inventory,
            "shop" | "buy" => RpgCommand::Shop(param),
            "use" => RpgCommand::Use(param),
            "equip" => RpgCommand::Equip(param),
            "unequip" => RpgCommand::Unequip(param),
            "exp" | "xp" | "progress" => RpgCommand::Progress,
            "help" => RpgCommand::Help,
            "duel" => RpgCommand::Duel(normalize_duel_target(DuelAction::parse(&param))),
            "raid" => RpgCommand::Raid(param),
            _ => RpgCommand::Unknown,
        }
    }

    /// Player ids whose rows this command may touch, besides the caller.
    pub fn other_players(&self) -> Vec<&str> {
        match self {
            RpgCommand::Duel(action) => action.counterpart().into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Commands answered without touching (or creating) the caller's character.
    fn is_stateless(&self, rules: &GameConfig) -> bool {
        match self {
            RpgCommand::Help | RpgCommand::Checkin | RpgCommand::Unknown => true,
            RpgCommand::Raid(_) => !rules.raid_enabled,
            _ => false,
        }
    }
}

/// Duel targets are stored under their canonical id; unusable names pass through so the
/// registry can report them as unknown players.
fn normalize_duel_target(action: DuelAction) -> DuelAction {
    let canon = |target: String| normalize_player_id(&target).unwrap_or(target);
    match action {
        DuelAction::Help => DuelAction::Help,
        DuelAction::Challenge(target) => DuelAction::Challenge(canon(target)),
        DuelAction::Accept(target) => DuelAction::Accept(target.map(canon)),
        DuelAction::Reject(target) => DuelAction::Reject(target.map(canon)),
        DuelAction::Cancel(target) => DuelAction::Cancel(target.map(canon)),
    }
}

pub fn dispatch<R: Rng + ?Sized>(
    tx: &mut Tx<'_>,
    player: &str,
    command: RpgCommand,
    rules: &GameConfig,
    rng: &mut R,
) -> Result<String, RpgError> {
    if !command.is_stateless(rules) {
        ensure_character(tx, player)?;
    }
    match command {
        RpgCommand::Wallet => wallet_view(tx, player),
        RpgCommand::Checkin => Ok(CHECKIN_RETIRED.to_string()),
        RpgCommand::Character => character_status(tx, player),
        RpgCommand::Quest => resolve_quest(tx, player, rules, rng),
        RpgCommand::Inventory => view_inventory(tx, player),
        RpgCommand::Shop(param) => handle_shop(tx, player, &param, &rules.shop_link),
        RpgCommand::Use(param) => use_item(tx, player, &param),
        RpgCommand::Equip(param) => equip_item(tx, player, &param),
        RpgCommand::Unequip(param) => unequip_item(tx, player, &param),
        RpgCommand::Progress => exp_progress(tx, player),
        RpgCommand::Help => Ok(HELP_TEXT.to_string()),
        RpgCommand::Duel(action) => handle_duel(tx, player, action, rng),
        RpgCommand::Raid(_) if !rules.raid_enabled => Ok(RAID_DISABLED.to_string()),
        RpgCommand::Raid(param) => handle_raid(tx, player, &param, rules, rng),
        RpgCommand::Unknown => Ok(format!(
            "type {} rpg help for commands",
            rules.bot_keyword
        )),
    }
}
