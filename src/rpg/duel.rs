//! Duel challenge registry.
//!
//! At most one pending challenge exists per unordered pair of players. Accepting deletes the
//! row and hands both players to [`resolve_duel`]; rejecting or cancelling only deletes it.
use log::{debug, info};
use rand::Rng;

use crate::rpg::combat::resolve_duel;
use crate::rpg::errors::RpgError;
use crate::rpg::tx::Tx;
use crate::rpg::types::DuelChallenge;

pub const DUEL_HELP: &str = "Duel Commands: 'duel [player]' to challenge, 'duel accept [player]' to accept, 'duel reject [player]' to decline, 'duel cancel [player]' to cancel challenge";

/// Parsed `duel ...` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuelAction {
    Help,
    Challenge(String),
    Accept(Option<String>),
    Reject(Option<String>),
    Cancel(Option<String>),
}

impl DuelAction {
    pub fn parse(param: &str) -> Self {
        let mut parts = param.split_whitespace();
        let Some(first) = parts.next() else {
            return DuelAction::Help;
        };
        let target = parts.next().map(str::to_string);
        match first {
            "help" => DuelAction::Help,
            "accept" => DuelAction::Accept(target),
            "reject" => DuelAction::Reject(target),
            "cancel" => DuelAction::Cancel(target),
            _ => DuelAction::Challenge(param.trim().to_string()),
        }
    }

    /// The other player this action touches, if any.
    pub fn counterpart(&self) -> Option<&str> {
        match self {
            DuelAction::Help => None,
            DuelAction::Challenge(target) => Some(target.as_str()),
            DuelAction::Accept(target) | DuelAction::Reject(target) | DuelAction::Cancel(target) => {
                target.as_deref()
            }
        }
    }
}

pub fn handle_duel<R: Rng + ?Sized>(
    tx: &mut Tx<'_>,
    player: &str,
    action: DuelAction,
    rng: &mut R,
) -> Result<String, RpgError> {
    match action {
        DuelAction::Help => Ok(DUEL_HELP.to_string()),
        DuelAction::Challenge(target) => challenge(tx, player, &target),
        DuelAction::Accept(None) => {
            Ok("Please specify who's duel challenge you want to accept.".to_string())
        }
        DuelAction::Accept(Some(challenger)) => accept(tx, player, &challenger, rng),
        DuelAction::Reject(None) => {
            Ok("Please specify who's duel challenge you want to reject.".to_string())
        }
        DuelAction::Reject(Some(challenger)) => reject(tx, player, &challenger),
        DuelAction::Cancel(None) => {
            Ok("Please specify which duel challenge you want to cancel.".to_string())
        }
        DuelAction::Cancel(Some(defender)) => cancel(tx, player, &defender),
    }
}

pub fn challenge(tx: &mut Tx<'_>, challenger: &str, defender: &str) -> Result<String, RpgError> {
    if defender.eq_ignore_ascii_case(challenger) {
        return Ok("You can't duel yourself!".to_string());
    }
    if tx.character(defender)?.is_none() {
        return Ok(format!(
            "Player \"{}\" doesn't exist in the RPG system.",
            defender
        ));
    }
    if tx.duel(challenger, defender)?.is_some() {
        return Ok(format!(
            "You've already challenged {} to a duel. Wait for them to respond or use 'duel cancel {}'.",
            defender, defender
        ));
    }
    if tx.duel(defender, challenger)?.is_some() {
        return Ok(format!(
            "{} has already challenged you to a duel! Use 'duel accept {}' to accept or 'duel reject {}' to decline.",
            defender, defender, defender
        ));
    }
    tx.put_duel(DuelChallenge::new(challenger, defender, tx.now()));
    debug!("{} challenged {}", challenger, defender);
    Ok(format!(
        "You challenged {} to a friendly duel! They can accept with 'duel accept {}' or decline with 'duel reject {}'.",
        defender, challenger, challenger
    ))
}

pub fn accept<R: Rng + ?Sized>(
    tx: &mut Tx<'_>,
    defender: &str,
    challenger: &str,
    rng: &mut R,
) -> Result<String, RpgError> {
    if tx.duel(challenger, defender)?.is_none() {
        return Ok(format!("No duel challenge from {} found.", challenger));
    }
    tx.remove_duel(challenger, defender);
    info!("{} accepted a duel from {}", defender, challenger);
    resolve_duel(tx, challenger, defender, rng)
}

pub fn reject(tx: &mut Tx<'_>, defender: &str, challenger: &str) -> Result<String, RpgError> {
    if tx.duel(challenger, defender)?.is_none() {
        return Ok(format!("No duel challenge from {} found.", challenger));
    }
    tx.remove_duel(challenger, defender);
    Ok(format!(
        "You declined the duel challenge from {}.",
        challenger
    ))
}

pub fn cancel(tx: &mut Tx<'_>, challenger: &str, defender: &str) -> Result<String, RpgError> {
    if tx.duel(challenger, defender)?.is_none() {
        return Ok(format!(
            "You don't have an active duel challenge with {}.",
            defender
        ));
    }
    tx.remove_duel(challenger, defender);
    Ok(format!("You cancelled your duel challenge to {}.", defender))
}
