//! Commands commit all of their changes or none, and concurrent commands serialize per player.
mod common;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};

use chatquest::config::GameConfig;
use chatquest::rpg::engine::FAILURE_REPLY;
use chatquest::rpg::{
    ChangeSet, CharacterRecord, DuelChallenge, EquipmentLoadout, MemoryStore, RpgEngine,
    RpgError, RpgRepository, WalletRecord,
};
use common::{character, gold_of, held, memory_engine, seed_character, seed_item};

/// Wraps a [`MemoryStore`], failing the first `failing_commits` applies and, optionally,
/// every inventory read.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing_commits: AtomicUsize,
    commit_calls: AtomicUsize,
    fail_inventory: AtomicBool,
}

impl RpgRepository for FlakyStore {
    fn character(&self, player: &str) -> Result<Option<CharacterRecord>, RpgError> {
        self.inner.character(player)
    }

    fn wallet(&self, player: &str) -> Result<Option<WalletRecord>, RpgError> {
        self.inner.wallet(player)
    }

    fn inventory(&self, player: &str) -> Result<BTreeMap<String, u32>, RpgError> {
        if self.fail_inventory.load(Ordering::SeqCst) {
            return Err(RpgError::Internal("inventory unavailable".into()));
        }
        self.inner.inventory(player)
    }

    fn equipment(&self, player: &str) -> Result<Option<EquipmentLoadout>, RpgError> {
        self.inner.equipment(player)
    }

    fn duel(&self, challenger: &str, defender: &str) -> Result<Option<DuelChallenge>, RpgError> {
        self.inner.duel(challenger, defender)
    }

    fn duels_involving(&self, player: &str) -> Result<Vec<DuelChallenge>, RpgError> {
        self.inner.duels_involving(player)
    }

    fn last_purchase(
        &self,
        player: &str,
        item_id: &str,
    ) -> Result<Option<DateTime<Utc>>, RpgError> {
        self.inner.last_purchase(player, item_id)
    }

    fn list_player_ids(&self) -> Result<Vec<String>, RpgError> {
        self.inner.list_player_ids()
    }

    fn apply(&self, changes: &ChangeSet) -> Result<(), RpgError> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_commits.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_commits.store(remaining - 1, Ordering::SeqCst);
            return Err(RpgError::Internal("disk full".into()));
        }
        self.inner.apply(changes)
    }
}

fn flaky_engine(failing_commits: usize) -> (Arc<FlakyStore>, RpgEngine) {
    let store = Arc::new(FlakyStore::default());
    store.failing_commits.store(failing_commits, Ordering::SeqCst);
    let engine = RpgEngine::new(store.clone(), GameConfig::default());
    (store, engine)
}

#[test]
fn failed_commit_leaves_no_trace() {
    let (store, engine) = flaky_engine(usize::MAX);
    assert_eq!(engine.handle_command("ash", "quest"), FAILURE_REPLY);
    assert!(store.character("ash").unwrap().is_none());
    assert!(store.wallet("ash").unwrap().is_none());
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), 3);
}

#[test]
fn commit_is_retried_with_same_changes() {
    let (store, engine) = flaky_engine(2);
    assert_eq!(engine.handle_command("ash", "wallet"), "Your gold: 0");
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), 3);
    assert!(store.character("ash").unwrap().is_some());
}

#[test]
fn failed_read_aborts_before_any_write() {
    let (store, engine) = flaky_engine(0);
    seed_character(&store.inner, character("ash"));
    seed_item(&store.inner, "ash", "potion", 1);
    store.fail_inventory.store(true, Ordering::SeqCst);

    assert_eq!(engine.handle_command("ash", "use potion"), FAILURE_REPLY);
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), 0);

    store.fail_inventory.store(false, Ordering::SeqCst);
    assert_eq!(held(&store.inner, "ash", "potion"), 1);
}

#[test]
fn read_only_commands_do_not_commit() {
    let (store, engine) = flaky_engine(0);
    engine.handle_command("ash", "char");
    let after_create = store.commit_calls.load(Ordering::SeqCst);
    engine.handle_command("ash", "inv");
    engine.handle_command("ash", "exp");
    engine.handle_command("ash", "help");
    assert_eq!(store.commit_calls.load(Ordering::SeqCst), after_create);
}

#[test]
fn concurrent_sales_never_lose_gold() {
    let (store, engine) = memory_engine();
    seed_item(&*store, "ash", "treasure", 20);

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            thread::spawn(move || {
                (0..5)
                    .filter(|_| engine.handle_command("ash", "shop sell treasure").starts_with("You sold"))
                    .count()
            })
        })
        .collect();
    let sold: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();

    assert_eq!(sold, 20);
    assert_eq!(held(&*store, "ash", "treasure"), 0);
    assert_eq!(gold_of(&*store, "ash"), 60);
}
