//! Public entry point: one chat message in, one reply out.
//!
//! Each command runs under the locks of every player it touches, reads through a fresh
//! [`Tx`] and commits the resulting [`ChangeSet`] in one `apply`. A failed read aborts the
//! command before anything is written; a failed commit is retried with the same change set,
//! so no dice are ever re-rolled.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use rand::Rng;

use crate::config::GameConfig;
use crate::rpg::commands::{dispatch, RpgCommand};
use crate::rpg::errors::RpgError;
use crate::rpg::locks::PlayerLocks;
use crate::rpg::storage::{ChangeSet, RpgRepository};
use crate::rpg::tx::Tx;
use crate::validation::{escape_log, normalize_player_id};

pub const FAILURE_REPLY: &str = "Something went wrong with the RPG. Please try again later.";
pub const UNKNOWN_PLAYER_REPLY: &str = "I couldn't tell who you are.";

/// Cheap to clone; clones share the store and the lock registry.
#[derive(Clone)]
pub struct RpgEngine {
    store: Arc<dyn RpgRepository>,
    locks: Arc<PlayerLocks>,
    rules: Arc<GameConfig>,
}

impl RpgEngine {
    pub fn new(store: Arc<dyn RpgRepository>, rules: GameConfig) -> Self {
        Self {
            store,
            locks: Arc::new(PlayerLocks::new()),
            rules: Arc::new(rules),
        }
    }

    pub fn rules(&self) -> &GameConfig {
        &self.rules
    }

    pub fn store(&self) -> &Arc<dyn RpgRepository> {
        &self.store
    }

    /// Handle `text` from `player` using the wall clock and the thread-local RNG.
    pub fn handle_command(&self, player: &str, text: &str) -> String {
        let mut rng = rand::thread_rng();
        self.handle_command_at(player, text, Utc::now(), &mut rng)
    }

    /// Deterministic variant of [`handle_command`](Self::handle_command).
    pub fn handle_command_at<R: Rng + ?Sized>(
        &self,
        player: &str,
        text: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> String {
        let Some(player) = normalize_player_id(player) else {
            debug!("rejecting command from unusable id {:?}", escape_log(player));
            return UNKNOWN_PLAYER_REPLY.to_string();
        };
        let command = RpgCommand::parse(text);
        debug!("{} -> {:?} ({})", player, command, escape_log(text));

        let others: Vec<String> = command
            .other_players()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut keys = vec![player.as_str()];
        keys.extend(others.iter().map(String::as_str));

        self.locks.with_players(&keys, || {
            match self.execute(&player, command, now, rng) {
                Ok(reply) => reply,
                Err(e) => {
                    error!(
                        "rpg command {:?} from {} aborted: {}",
                        escape_log(text),
                        player,
                        e
                    );
                    FAILURE_REPLY.to_string()
                }
            }
        })
    }

    fn execute<R: Rng + ?Sized>(
        &self,
        player: &str,
        command: RpgCommand,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<String, RpgError> {
        let mut tx = Tx::new(self.store.as_ref(), now);
        let reply = dispatch(&mut tx, player, command, &self.rules, rng)?;
        let changes = tx.into_changes();
        if !changes.is_empty() {
            self.commit(&changes)?;
        }
        Ok(reply)
    }

    fn commit(&self, changes: &ChangeSet) -> Result<(), RpgError> {
        let attempts = self.rules.commit_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.store.apply(changes) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < attempts => {
                    warn!("commit attempt {}/{} failed: {}", attempt, attempts, e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn player_count(&self) -> Result<usize, RpgError> {
        Ok(self.store.list_player_ids()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpg::memory::MemoryStore;
    use rand::rngs::mock::StepRng;

    fn engine() -> RpgEngine {
        RpgEngine::new(Arc::new(MemoryStore::new()), GameConfig::default())
    }

    #[test]
    fn rejects_unusable_ids() {
        let engine = engine();
        assert_eq!(engine.handle_command("@!!", "quest"), UNKNOWN_PLAYER_REPLY);
        assert_eq!(engine.player_count().unwrap(), 0);
    }

    #[test]
    fn ids_are_case_and_at_insensitive() {
        let engine = engine();
        let now = Utc::now();
        let mut rng = StepRng::new(0, 0);
        engine.handle_command_at("@Alice", "char", now, &mut rng);
        engine.handle_command_at("alice", "char", now, &mut rng);
        assert_eq!(engine.store().list_player_ids().unwrap(), vec!["alice".to_string()]);
    }

    #[test]
    fn help_does_not_register_player() {
        let engine = engine();
        let reply = engine.handle_command("viewer", "help");
        assert!(reply.starts_with("Commands: quest"));
        assert_eq!(engine.player_count().unwrap(), 0);
    }
}
