//! In-memory [`RpgRepository`] used by tests and throwaway sessions.
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::rpg::errors::RpgError;
use crate::rpg::storage::{ChangeSet, RpgRepository};
use crate::rpg::types::{CharacterRecord, DuelChallenge, EquipmentLoadout, WalletRecord};

#[derive(Debug, Default, Clone)]
struct Tables {
    characters: BTreeMap<String, CharacterRecord>,
    wallets: BTreeMap<String, WalletRecord>,
    inventory: BTreeMap<(String, String), u32>,
    equipment: BTreeMap<String, EquipmentLoadout>,
    duels: BTreeMap<(String, String), DuelChallenge>,
    purchases: BTreeMap<(String, String), DateTime<Utc>>,
}

/// All tables behind a single mutex; a change set is applied while holding it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RpgError> {
        self.tables
            .lock()
            .map_err(|_| RpgError::Internal("memory store lock poisoned".into()))
    }
}

impl RpgRepository for MemoryStore {
    fn character(&self, player: &str) -> Result<Option<CharacterRecord>, RpgError> {
        Ok(self.lock()?.characters.get(player).cloned())
    }

    fn wallet(&self, player: &str) -> Result<Option<WalletRecord>, RpgError> {
        Ok(self.lock()?.wallets.get(player).cloned())
    }

    fn inventory(&self, player: &str) -> Result<BTreeMap<String, u32>, RpgError> {
        let tables = self.lock()?;
        Ok(tables
            .inventory
            .iter()
            .filter(|((owner, _), qty)| owner == player && **qty > 0)
            .map(|((_, item), qty)| (item.clone(), *qty))
            .collect())
    }

    fn equipment(&self, player: &str) -> Result<Option<EquipmentLoadout>, RpgError> {
        Ok(self.lock()?.equipment.get(player).cloned())
    }

    fn duel(&self, challenger: &str, defender: &str) -> Result<Option<DuelChallenge>, RpgError> {
        Ok(self
            .lock()?
            .duels
            .get(&(challenger.to_string(), defender.to_string()))
            .cloned())
    }

    fn duels_involving(&self, player: &str) -> Result<Vec<DuelChallenge>, RpgError> {
        Ok(self
            .lock()?
            .duels
            .values()
            .filter(|duel| duel.involves(player))
            .cloned()
            .collect())
    }

    fn last_purchase(
        &self,
        player: &str,
        item_id: &str,
    ) -> Result<Option<DateTime<Utc>>, RpgError> {
        Ok(self
            .lock()?
            .purchases
            .get(&(player.to_string(), item_id.to_string()))
            .copied())
    }

    fn list_player_ids(&self) -> Result<Vec<String>, RpgError> {
        Ok(self.lock()?.characters.keys().cloned().collect())
    }

    fn apply(&self, changes: &ChangeSet) -> Result<(), RpgError> {
        let mut tables = self.lock()?;
        for player in &changes.purged_players {
            tables.characters.remove(player);
            tables.wallets.remove(player);
            tables.equipment.remove(player);
            tables.inventory.retain(|(owner, _), _| owner != player);
            tables.purchases.retain(|(owner, _), _| owner != player);
            tables.duels.retain(|_, duel| !duel.involves(player));
        }
        for record in &changes.characters {
            tables
                .characters
                .insert(record.player_id.clone(), record.clone());
        }
        for record in &changes.wallets {
            tables.wallets.insert(record.player_id.clone(), record.clone());
        }
        for change in &changes.inventory {
            let key = (change.player.clone(), change.item.clone());
            if change.quantity == 0 {
                tables.inventory.remove(&key);
            } else {
                tables.inventory.insert(key, change.quantity);
            }
        }
        for (player, loadout) in &changes.equipment {
            tables.equipment.insert(player.clone(), loadout.clone());
        }
        for (challenger, defender) in &changes.duels_removed {
            tables
                .duels
                .remove(&(challenger.clone(), defender.clone()));
        }
        for duel in &changes.duels_put {
            tables.duels.insert(
                (duel.challenger.clone(), duel.defender.clone()),
                duel.clone(),
            );
        }
        for purchase in &changes.purchases {
            tables
                .purchases
                .insert((purchase.player.clone(), purchase.item.clone()), purchase.at);
        }
        Ok(())
    }
}
