//! Per-player serialization of command handlers.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Registry size past which idle entries are dropped.
const PRUNE_THRESHOLD: usize = 1024;

/// One mutex per player id. A command holds the locks of every player it touches for its
/// whole read-modify-write cycle; multi-player commands acquire them in sorted order.
#[derive(Debug, Default)]
pub struct PlayerLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PlayerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted, de-duplicated lock handles for `players`.
    fn handles(&self, players: &[&str]) -> Vec<Arc<Mutex<()>>> {
        let mut keys: Vec<&str> = players.iter().copied().filter(|p| !p.is_empty()).collect();
        keys.sort_unstable();
        keys.dedup();

        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if map.len() > PRUNE_THRESHOLD {
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        keys.into_iter()
            .map(|key| map.entry(key.to_string()).or_default().clone())
            .collect()
    }

    /// Run `f` while holding the locks of all `players`.
    pub fn with_players<T>(&self, players: &[&str], f: impl FnOnce() -> T) -> T {
        let handles = self.handles(players);
        let _guards: Vec<_> = handles
            .iter()
            .map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner))
            .collect();
        f()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
