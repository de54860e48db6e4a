//! Durable storage for RPG state.
//!
//! [`RpgRepository`] is the small data-access interface the engine is written against. Handlers
//! never write directly: a command reads through a [`crate::rpg::tx::Tx`] and commits one
//! [`ChangeSet`] at the end, which implementations must apply atomically.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{IVec, Transactional};

use crate::rpg::errors::RpgError;
use crate::rpg::types::{
    CharacterRecord, DuelChallenge, EquipmentLoadout, WalletRecord, CHARACTER_SCHEMA_VERSION,
    DUEL_SCHEMA_VERSION, EQUIPMENT_SCHEMA_VERSION, WALLET_SCHEMA_VERSION,
};

const TREE_CHARACTERS: &str = "rpg_characters";
const TREE_WALLETS: &str = "rpg_wallets";
const TREE_INVENTORY: &str = "rpg_inventory";
const TREE_EQUIPMENT: &str = "rpg_equipment";
const TREE_DUELS: &str = "rpg_duels";
const TREE_PURCHASES: &str = "rpg_purchases";

/// Key-indexed access to the persisted RPG tables.
pub trait RpgRepository: Send + Sync {
    fn character(&self, player: &str) -> Result<Option<CharacterRecord>, RpgError>;
    fn wallet(&self, player: &str) -> Result<Option<WalletRecord>, RpgError>;
    /// All inventory rows of `player`, keyed by item id.
    fn inventory(&self, player: &str) -> Result<BTreeMap<String, u32>, RpgError>;
    fn equipment(&self, player: &str) -> Result<Option<EquipmentLoadout>, RpgError>;
    fn duel(&self, challenger: &str, defender: &str) -> Result<Option<DuelChallenge>, RpgError>;
    /// Every challenge where `player` is either side.
    fn duels_involving(&self, player: &str) -> Result<Vec<DuelChallenge>, RpgError>;
    fn last_purchase(&self, player: &str, item_id: &str)
        -> Result<Option<DateTime<Utc>>, RpgError>;
    fn list_player_ids(&self) -> Result<Vec<String>, RpgError>;
    /// Apply a change set atomically: either every change lands or none does.
    fn apply(&self, changes: &ChangeSet) -> Result<(), RpgError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryChange {
    pub player: String,
    pub item: String,
    /// New quantity; zero removes the row.
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseChange {
    pub player: String,
    pub item: String,
    pub at: DateTime<Utc>,
}

/// Everything one command wants to persist. Purges run before the upserts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub purged_players: Vec<String>,
    pub characters: Vec<CharacterRecord>,
    pub wallets: Vec<WalletRecord>,
    pub inventory: Vec<InventoryChange>,
    pub equipment: Vec<(String, EquipmentLoadout)>,
    pub duels_put: Vec<DuelChallenge>,
    pub duels_removed: Vec<(String, String)>,
    pub purchases: Vec<PurchaseChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.purged_players.is_empty()
            && self.characters.is_empty()
            && self.wallets.is_empty()
            && self.inventory.is_empty()
            && self.equipment.is_empty()
            && self.duels_put.is_empty()
            && self.duels_removed.is_empty()
            && self.purchases.is_empty()
    }
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct SledStoreBuilder {
    path: PathBuf,
}

impl SledStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(self) -> Result<SledStore, RpgError> {
        SledStore::open(self.path)
    }
}

/// Sled-backed persistence, one tree per logical table.
pub struct SledStore {
    db: sled::Db,
    characters: sled::Tree,
    wallets: sled::Tree,
    inventory: sled::Tree,
    equipment: sled::Tree,
    duels: sled::Tree,
    purchases: sled::Tree,
}

/// Pre-encoded writes, so the transaction closure only moves bytes.
#[derive(Default)]
struct EncodedChanges {
    remove_characters: Vec<Vec<u8>>,
    remove_wallets: Vec<Vec<u8>>,
    remove_inventory: Vec<Vec<u8>>,
    remove_equipment: Vec<Vec<u8>>,
    remove_duels: Vec<Vec<u8>>,
    remove_purchases: Vec<Vec<u8>>,
    put_characters: Vec<(Vec<u8>, Vec<u8>)>,
    put_wallets: Vec<(Vec<u8>, Vec<u8>)>,
    put_inventory: Vec<(Vec<u8>, Vec<u8>)>,
    put_equipment: Vec<(Vec<u8>, Vec<u8>)>,
    put_duels: Vec<(Vec<u8>, Vec<u8>)>,
    put_purchases: Vec<(Vec<u8>, Vec<u8>)>,
}

impl SledStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RpgError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let characters = db.open_tree(TREE_CHARACTERS)?;
        let wallets = db.open_tree(TREE_WALLETS)?;
        let inventory = db.open_tree(TREE_INVENTORY)?;
        let equipment = db.open_tree(TREE_EQUIPMENT)?;
        let duels = db.open_tree(TREE_DUELS)?;
        let purchases = db.open_tree(TREE_PURCHASES)?;
        Ok(Self {
            db,
            characters,
            wallets,
            inventory,
            equipment,
            duels,
            purchases,
        })
    }

    fn player_key(player: &str) -> Vec<u8> {
        player.to_ascii_lowercase().into_bytes()
    }

    fn pair_key(left: &str, right: &str) -> Vec<u8> {
        format!(
            "{}:{}",
            left.to_ascii_lowercase(),
            right.to_ascii_lowercase()
        )
        .into_bytes()
    }

    fn player_prefix(player: &str) -> Vec<u8> {
        format!("{}:", player.to_ascii_lowercase()).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, RpgError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, RpgError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    fn check_version(entity: &'static str, expected: u8, found: u8) -> Result<(), RpgError> {
        if expected != found {
            return Err(RpgError::SchemaMismatch {
                entity,
                expected,
                found,
            });
        }
        Ok(())
    }

    fn decode_duel(bytes: IVec) -> Result<DuelChallenge, RpgError> {
        let record: DuelChallenge = Self::deserialize(bytes)?;
        Self::check_version("duel", DUEL_SCHEMA_VERSION, record.schema_version)?;
        Ok(record)
    }

    fn encode(&self, changes: &ChangeSet) -> Result<EncodedChanges, RpgError> {
        let mut out = EncodedChanges::default();

        for player in &changes.purged_players {
            let key = Self::player_key(player);
            out.remove_characters.push(key.clone());
            out.remove_wallets.push(key.clone());
            out.remove_equipment.push(key);
            let prefix = Self::player_prefix(player);
            for entry in self.inventory.scan_prefix(&prefix) {
                let (key, _) = entry?;
                out.remove_inventory.push(key.to_vec());
            }
            for entry in self.purchases.scan_prefix(&prefix) {
                let (key, _) = entry?;
                out.remove_purchases.push(key.to_vec());
            }
            for entry in self.duels.iter() {
                let (key, bytes) = entry?;
                if Self::decode_duel(bytes)?.involves(player) {
                    out.remove_duels.push(key.to_vec());
                }
            }
        }

        for record in &changes.characters {
            let mut record = record.clone();
            record.schema_version = CHARACTER_SCHEMA_VERSION;
            out.put_characters
                .push((Self::player_key(&record.player_id), Self::serialize(&record)?));
        }
        for record in &changes.wallets {
            let mut record = record.clone();
            record.schema_version = WALLET_SCHEMA_VERSION;
            out.put_wallets
                .push((Self::player_key(&record.player_id), Self::serialize(&record)?));
        }
        for change in &changes.inventory {
            let key = Self::pair_key(&change.player, &change.item);
            if change.quantity == 0 {
                out.remove_inventory.push(key);
            } else {
                out.put_inventory
                    .push((key, Self::serialize(&change.quantity)?));
            }
        }
        for (player, loadout) in &changes.equipment {
            let mut loadout = loadout.clone();
            loadout.schema_version = EQUIPMENT_SCHEMA_VERSION;
            out.put_equipment
                .push((Self::player_key(player), Self::serialize(&loadout)?));
        }
        for (challenger, defender) in &changes.duels_removed {
            out.remove_duels.push(Self::pair_key(challenger, defender));
        }
        for duel in &changes.duels_put {
            let mut duel = duel.clone();
            duel.schema_version = DUEL_SCHEMA_VERSION;
            out.put_duels.push((
                Self::pair_key(&duel.challenger, &duel.defender),
                Self::serialize(&duel)?,
            ));
        }
        for purchase in &changes.purchases {
            out.put_purchases.push((
                Self::pair_key(&purchase.player, &purchase.item),
                Self::serialize(&purchase.at)?,
            ));
        }
        Ok(out)
    }
}

impl RpgRepository for SledStore {
    fn character(&self, player: &str) -> Result<Option<CharacterRecord>, RpgError> {
        let Some(bytes) = self.characters.get(Self::player_key(player))? else {
            return Ok(None);
        };
        let record: CharacterRecord = Self::deserialize(bytes)?;
        Self::check_version("character", CHARACTER_SCHEMA_VERSION, record.schema_version)?;
        Ok(Some(record))
    }

    fn wallet(&self, player: &str) -> Result<Option<WalletRecord>, RpgError> {
        let Some(bytes) = self.wallets.get(Self::player_key(player))? else {
            return Ok(None);
        };
        let record: WalletRecord = Self::deserialize(bytes)?;
        Self::check_version("wallet", WALLET_SCHEMA_VERSION, record.schema_version)?;
        Ok(Some(record))
    }

    fn inventory(&self, player: &str) -> Result<BTreeMap<String, u32>, RpgError> {
        let prefix = Self::player_prefix(player);
        let mut rows = BTreeMap::new();
        for entry in self.inventory.scan_prefix(&prefix) {
            let (key, bytes) = entry?;
            let text = String::from_utf8_lossy(&key);
            let Some(item) = text.split_once(':').map(|(_, item)| item.to_string()) else {
                continue;
            };
            let quantity: u32 = Self::deserialize(bytes)?;
            if quantity > 0 {
                rows.insert(item, quantity);
            }
        }
        Ok(rows)
    }

    fn equipment(&self, player: &str) -> Result<Option<EquipmentLoadout>, RpgError> {
        let Some(bytes) = self.equipment.get(Self::player_key(player))? else {
            return Ok(None);
        };
        let record: EquipmentLoadout = Self::deserialize(bytes)?;
        Self::check_version("equipment", EQUIPMENT_SCHEMA_VERSION, record.schema_version)?;
        Ok(Some(record))
    }

    fn duel(&self, challenger: &str, defender: &str) -> Result<Option<DuelChallenge>, RpgError> {
        match self.duels.get(Self::pair_key(challenger, defender))? {
            Some(bytes) => Ok(Some(Self::decode_duel(bytes)?)),
            None => Ok(None),
        }
    }

    fn duels_involving(&self, player: &str) -> Result<Vec<DuelChallenge>, RpgError> {
        let mut found = Vec::new();
        for entry in self.duels.iter() {
            let (_, bytes) = entry?;
            let duel = Self::decode_duel(bytes)?;
            if duel.involves(player) {
                found.push(duel);
            }
        }
        Ok(found)
    }

    fn last_purchase(
        &self,
        player: &str,
        item_id: &str,
    ) -> Result<Option<DateTime<Utc>>, RpgError> {
        match self.purchases.get(Self::pair_key(player, item_id))? {
            Some(bytes) => Ok(Some(Self::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    fn list_player_ids(&self) -> Result<Vec<String>, RpgError> {
        let mut ids = Vec::new();
        for entry in self.characters.iter() {
            let (key, _) = entry?;
            ids.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(ids)
    }

    fn apply(&self, changes: &ChangeSet) -> Result<(), RpgError> {
        if changes.is_empty() {
            return Ok(());
        }
        let encoded = self.encode(changes)?;
        (
            &self.characters,
            &self.wallets,
            &self.inventory,
            &self.equipment,
            &self.duels,
            &self.purchases,
        )
            .transaction(|(characters, wallets, inventory, equipment, duels, purchases)| {
                for key in &encoded.remove_characters {
                    characters.remove(key.as_slice())?;
                }
                for key in &encoded.remove_wallets {
                    wallets.remove(key.as_slice())?;
                }
                for key in &encoded.remove_inventory {
                    inventory.remove(key.as_slice())?;
                }
                for key in &encoded.remove_equipment {
                    equipment.remove(key.as_slice())?;
                }
                for key in &encoded.remove_duels {
                    duels.remove(key.as_slice())?;
                }
                for key in &encoded.remove_purchases {
                    purchases.remove(key.as_slice())?;
                }
                for (key, value) in &encoded.put_characters {
                    characters.insert(key.as_slice(), value.as_slice())?;
                }
                for (key, value) in &encoded.put_wallets {
                    wallets.insert(key.as_slice(), value.as_slice())?;
                }
                for (key, value) in &encoded.put_inventory {
                    inventory.insert(key.as_slice(), value.as_slice())?;
                }
                for (key, value) in &encoded.put_equipment {
                    equipment.insert(key.as_slice(), value.as_slice())?;
                }
                for (key, value) in &encoded.put_duels {
                    duels.insert(key.as_slice(), value.as_slice())?;
                }
                for (key, value) in &encoded.put_purchases {
                    purchases.insert(key.as_slice(), value.as_slice())?;
                }
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(()) => RpgError::Internal("transaction aborted".into()),
                TransactionError::Storage(err) => RpgError::Sled(err),
            })?;
        self.db.flush()?;
        Ok(())
    }
}
