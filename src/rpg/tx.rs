//! Per-command unit of work.
//!
//! A [`Tx`] reads through to the repository once per row, keeps every write in memory and
//! hands the result to the engine as a single [`ChangeSet`]. Nothing reaches the store unless
//! the whole command succeeds, and the command sees one consistent clock value (`now`).
use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::rpg::errors::RpgError;
use crate::rpg::storage::{ChangeSet, InventoryChange, PurchaseChange, RpgRepository};
use crate::rpg::types::{CharacterRecord, DuelChallenge, EquipmentLoadout, WalletRecord};

type PairKey = (String, String);

fn pair(left: &str, right: &str) -> PairKey {
    (left.to_string(), right.to_string())
}

pub struct Tx<'a> {
    store: &'a dyn RpgRepository,
    now: DateTime<Utc>,
    characters: HashMap<String, Option<CharacterRecord>>,
    wallets: HashMap<String, Option<WalletRecord>>,
    inventories: HashMap<String, BTreeMap<String, u32>>,
    equipment: HashMap<String, Option<EquipmentLoadout>>,
    duels: HashMap<PairKey, Option<DuelChallenge>>,
    purchases: HashMap<PairKey, Option<DateTime<Utc>>>,
    dirty_characters: BTreeSet<String>,
    dirty_wallets: BTreeSet<String>,
    dirty_inventory: BTreeSet<PairKey>,
    dirty_equipment: BTreeSet<String>,
    dirty_duels: BTreeSet<PairKey>,
    dirty_purchases: BTreeSet<PairKey>,
    purged: Vec<String>,
}

impl<'a> Tx<'a> {
    pub fn new(store: &'a dyn RpgRepository, now: DateTime<Utc>) -> Self {
        Self {
            store,
            now,
            characters: HashMap::new(),
            wallets: HashMap::new(),
            inventories: HashMap::new(),
            equipment: HashMap::new(),
            duels: HashMap::new(),
            purchases: HashMap::new(),
            dirty_characters: BTreeSet::new(),
            dirty_wallets: BTreeSet::new(),
            dirty_inventory: BTreeSet::new(),
            dirty_equipment: BTreeSet::new(),
            dirty_duels: BTreeSet::new(),
            dirty_purchases: BTreeSet::new(),
            purged: Vec::new(),
        }
    }

    /// The clock reading shared by every check in this command.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn character(&mut self, player: &str) -> Result<Option<CharacterRecord>, RpgError> {
        if !self.characters.contains_key(player) {
            let loaded = self.store.character(player)?;
            self.characters.insert(player.to_string(), loaded);
        }
        Ok(self.characters.get(player).cloned().flatten())
    }

    pub fn put_character(&mut self, mut record: CharacterRecord) {
        record.enforce_hp_bounds();
        let player = record.player_id.clone();
        self.characters.insert(player.clone(), Some(record));
        self.dirty_characters.insert(player);
    }

    pub fn wallet(&mut self, player: &str) -> Result<Option<WalletRecord>, RpgError> {
        if !self.wallets.contains_key(player) {
            let loaded = self.store.wallet(player)?;
            self.wallets.insert(player.to_string(), loaded);
        }
        Ok(self.wallets.get(player).cloned().flatten())
    }

    pub fn put_wallet(&mut self, record: WalletRecord) {
        let player = record.player_id.clone();
        self.wallets.insert(player.clone(), Some(record));
        self.dirty_wallets.insert(player);
    }

    fn inventory_mut(&mut self, player: &str) -> Result<&mut BTreeMap<String, u32>, RpgError> {
        if !self.inventories.contains_key(player) {
            let loaded = self.store.inventory(player)?;
            self.inventories.insert(player.to_string(), loaded);
        }
        self.inventories
            .get_mut(player)
            .ok_or_else(|| RpgError::Internal(format!("inventory cache miss for {}", player)))
    }

    /// Owned items of `player` keyed by item id (quantities are always positive).
    pub fn inventory(&mut self, player: &str) -> Result<BTreeMap<String, u32>, RpgError> {
        Ok(self.inventory_mut(player)?.clone())
    }

    pub fn quantity(&mut self, player: &str, item: &str) -> Result<u32, RpgError> {
        Ok(self.inventory_mut(player)?.get(item).copied().unwrap_or(0))
    }

    pub fn give_item(&mut self, player: &str, item: &str, quantity: u32) -> Result<(), RpgError> {
        if quantity == 0 {
            return Ok(());
        }
        *self.inventory_mut(player)?.entry(item.to_string()).or_insert(0) += quantity;
        self.dirty_inventory.insert(pair(player, item));
        Ok(())
    }

    /// Remove up to `quantity` of `item`; rows that reach zero disappear.
    /// Returns false when the player held none.
    pub fn remove_item(&mut self, player: &str, item: &str, quantity: u32) -> Result<bool, RpgError> {
        let rows = self.inventory_mut(player)?;
        let Some(held) = rows.get_mut(item) else {
            return Ok(false);
        };
        *held = held.saturating_sub(quantity);
        if *held == 0 {
            rows.remove(item);
        }
        self.dirty_inventory.insert(pair(player, item));
        Ok(true)
    }

    /// The player's loadout; an absent row reads as three empty slots.
    pub fn equipment(&mut self, player: &str) -> Result<EquipmentLoadout, RpgError> {
        if !self.equipment.contains_key(player) {
            let loaded = self.store.equipment(player)?;
            self.equipment.insert(player.to_string(), loaded);
        }
        Ok(self
            .equipment
            .get(player)
            .cloned()
            .flatten()
            .unwrap_or_else(EquipmentLoadout::empty))
    }

    pub fn put_equipment(&mut self, player: &str, loadout: EquipmentLoadout) {
        self.equipment.insert(player.to_string(), Some(loadout));
        self.dirty_equipment.insert(player.to_string());
    }

    pub fn duel(&mut self, challenger: &str, defender: &str) -> Result<Option<DuelChallenge>, RpgError> {
        let key = pair(challenger, defender);
        if !self.duels.contains_key(&key) {
            let loaded = self.store.duel(challenger, defender)?;
            self.duels.insert(key.clone(), loaded);
        }
        Ok(self.duels.get(&key).cloned().flatten())
    }

    pub fn put_duel(&mut self, duel: DuelChallenge) {
        let key = pair(&duel.challenger, &duel.defender);
        self.duels.insert(key.clone(), Some(duel));
        self.dirty_duels.insert(key);
    }

    pub fn remove_duel(&mut self, challenger: &str, defender: &str) {
        let key = pair(challenger, defender);
        self.duels.insert(key.clone(), None);
        self.dirty_duels.insert(key);
    }

    pub fn duels_involving(&mut self, player: &str) -> Result<Vec<DuelChallenge>, RpgError> {
        for duel in self.store.duels_involving(player)? {
            self.duels
                .entry(pair(&duel.challenger, &duel.defender))
                .or_insert(Some(duel));
        }
        let mut found: Vec<DuelChallenge> = self
            .duels
            .values()
            .flatten()
            .filter(|duel| duel.involves(player))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        Ok(found)
    }

    pub fn last_purchase(&mut self, player: &str, item: &str) -> Result<Option<DateTime<Utc>>, RpgError> {
        let key = pair(player, item);
        if !self.purchases.contains_key(&key) {
            let loaded = self.store.last_purchase(player, item)?;
            self.purchases.insert(key.clone(), loaded);
        }
        Ok(self.purchases.get(&key).copied().flatten())
    }

    pub fn record_purchase(&mut self, player: &str, item: &str) {
        let key = pair(player, item);
        self.purchases.insert(key.clone(), Some(self.now));
        self.dirty_purchases.insert(key);
    }

    /// Drop every row belonging to `player`, including duel challenges on either side.
    pub fn purge_player(&mut self, player: &str) -> Result<(), RpgError> {
        for duel in self.duels_involving(player)? {
            self.duels
                .insert(pair(&duel.challenger, &duel.defender), None);
        }
        self.characters.insert(player.to_string(), None);
        self.wallets.insert(player.to_string(), None);
        self.inventories.insert(player.to_string(), BTreeMap::new());
        self.equipment.insert(player.to_string(), None);
        self.purchases.retain(|(owner, _), _| owner != player);

        self.dirty_characters.remove(player);
        self.dirty_wallets.remove(player);
        self.dirty_equipment.remove(player);
        self.dirty_inventory.retain(|(owner, _)| owner != player);
        self.dirty_purchases.retain(|(owner, _)| owner != player);
        self.dirty_duels
            .retain(|(challenger, defender)| challenger != player && defender != player);
        self.purged.push(player.to_string());
        Ok(())
    }

    pub fn into_changes(self) -> ChangeSet {
        let mut changes = ChangeSet {
            purged_players: self.purged,
            ..ChangeSet::default()
        };
        for player in &self.dirty_characters {
            if let Some(Some(record)) = self.characters.get(player) {
                changes.characters.push(record.clone());
            }
        }
        for player in &self.dirty_wallets {
            if let Some(Some(record)) = self.wallets.get(player) {
                changes.wallets.push(record.clone());
            }
        }
        for (player, item) in &self.dirty_inventory {
            let quantity = self
                .inventories
                .get(player)
                .and_then(|rows| rows.get(item))
                .copied()
                .unwrap_or(0);
            changes.inventory.push(InventoryChange {
                player: player.clone(),
                item: item.clone(),
                quantity,
            });
        }
        for player in &self.dirty_equipment {
            if let Some(Some(loadout)) = self.equipment.get(player) {
                changes.equipment.push((player.clone(), loadout.clone()));
            }
        }
        for key in &self.dirty_duels {
            match self.duels.get(key) {
                Some(Some(duel)) => changes.duels_put.push(duel.clone()),
                _ => changes.duels_removed.push(key.clone()),
            }
        }
        for key in &self.dirty_purchases {
            if let Some(Some(at)) = self.purchases.get(key) {
                changes.purchases.push(PurchaseChange {
                    player: key.0.clone(),
                    item: key.1.clone(),
                    at: *at,
                });
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpg::memory::MemoryStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn writes_are_visible_before_commit_and_absent_after_drop() {
        let store = MemoryStore::new();
        {
            let mut tx = Tx::new(&store, now());
            tx.put_character(CharacterRecord::new("ash", now()));
            tx.give_item("ash", "potion", 2).unwrap();
            assert!(tx.character("ash").unwrap().is_some());
            assert_eq!(tx.quantity("ash", "potion").unwrap(), 2);
        }
        assert!(store.character("ash").unwrap().is_none());
        assert!(store.inventory("ash").unwrap().is_empty());
    }

    #[test]
    fn removing_last_item_emits_zero_quantity_row() {
        let store = MemoryStore::new();
        let mut tx = Tx::new(&store, now());
        tx.give_item("ash", "potion", 1).unwrap();
        assert!(tx.remove_item("ash", "potion", 1).unwrap());
        assert!(!tx.remove_item("ash", "potion", 1).unwrap());
        let changes = tx.into_changes();
        assert_eq!(changes.inventory.len(), 1);
        assert_eq!(changes.inventory[0].quantity, 0);
    }

    #[test]
    fn purge_discards_pending_writes_for_that_player() {
        let store = MemoryStore::new();
        let mut tx = Tx::new(&store, now());
        tx.put_character(CharacterRecord::new("ash", now()));
        tx.put_character(CharacterRecord::new("misty", now()));
        tx.put_duel(DuelChallenge::new("misty", "ash", now()));
        tx.purge_player("ash").unwrap();
        let changes = tx.into_changes();
        assert_eq!(changes.purged_players, vec!["ash".to_string()]);
        assert_eq!(changes.characters.len(), 1);
        assert_eq!(changes.characters[0].player_id, "misty");
        assert!(changes.duels_put.is_empty());
    }

    #[test]
    fn hp_is_clamped_on_write() {
        let store = MemoryStore::new();
        let mut tx = Tx::new(&store, now());
        let mut record = CharacterRecord::new("ash", now());
        record.current_hp = 99;
        tx.put_character(record);
        assert_eq!(tx.character("ash").unwrap().unwrap().current_hp, 5);
    }
}
