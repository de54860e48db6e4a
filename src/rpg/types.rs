use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

pub const CHARACTER_SCHEMA_VERSION: u8 = 1;
pub const WALLET_SCHEMA_VERSION: u8 = 1;
pub const EQUIPMENT_SCHEMA_VERSION: u8 = 1;
pub const DUEL_SCHEMA_VERSION: u8 = 1;

/// Highest attainable character level.
pub const MAX_LEVEL: u32 = 21;

pub const STARTING_MAX_HP: u32 = 5;
pub const STARTING_ATTACK: u32 = 1;
pub const STARTING_DEFENSE: u32 = 0;

/// Persistent per-player character sheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterRecord {
    pub player_id: String,
    pub level: u32,
    pub exp: u64,
    pub max_hp: u32,
    pub current_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub last_quest_time: Option<DateTime<Utc>>,
    /// Set when HP hits zero; questing is blocked until this passes.
    pub rest_until: Option<DateTime<Utc>>,
    /// One-shot attack bonus, zeroed by the next quest or raid.
    pub temp_attack_buff: u32,
    /// Permanent success bonus in whole percent.
    pub quest_success_chance: u32,
    pub has_used_enhancement_stone: bool,
    pub has_used_scroll_enhancement: bool,
    pub last_raid_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl CharacterRecord {
    pub fn new(player_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            player_id: player_id.to_string(),
            level: 1,
            exp: 0,
            max_hp: STARTING_MAX_HP,
            current_hp: STARTING_MAX_HP,
            attack: STARTING_ATTACK,
            defense: STARTING_DEFENSE,
            last_quest_time: None,
            rest_until: None,
            temp_attack_buff: 0,
            quest_success_chance: 0,
            has_used_enhancement_stone: false,
            has_used_scroll_enhancement: false,
            last_raid_time: None,
            created_at: now,
            schema_version: CHARACTER_SCHEMA_VERSION,
        }
    }

    pub fn health_ratio(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.current_hp as f64 / self.max_hp as f64
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_LEVEL
    }

    /// Remaining rest time, or `None` when not resting or the rest already expired.
    pub fn rest_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.rest_until {
            Some(until) if now < until => Some(until - now),
            _ => None,
        }
    }

    /// Resolve an expired rest: recover to half of max HP and clear the timer.
    /// Returns true when a recovery happened.
    pub fn finish_rest_if_due(&mut self, now: DateTime<Utc>) -> bool {
        match self.rest_until {
            Some(until) if now >= until => {
                self.current_hp = self.max_hp / 2;
                self.rest_until = None;
                true
            }
            _ => false,
        }
    }

    /// Clamp HP into `0..=max_hp`. Out-of-range HP means a gating bug upstream.
    pub fn enforce_hp_bounds(&mut self) {
        if self.current_hp > self.max_hp {
            warn!(
                "hp invariant violated for {}: {}/{}; clamping",
                self.player_id, self.current_hp, self.max_hp
            );
            self.current_hp = self.max_hp;
        }
    }
}

/// Gold wallet plus the daily-bonus bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletRecord {
    pub player_id: String,
    pub gold: u64,
    pub last_collected_day: Option<NaiveDate>,
    pub schema_version: u8,
}

impl WalletRecord {
    pub fn new(player_id: &str) -> Self {
        Self {
            player_id: player_id.to_string(),
            gold: 0,
            last_collected_day: None,
            schema_version: WALLET_SCHEMA_VERSION,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Armor,
    Accessory,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 3] = [EquipSlot::Weapon, EquipSlot::Armor, EquipSlot::Accessory];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipSlot::Weapon => "weapon",
            EquipSlot::Armor => "armor",
            EquipSlot::Accessory => "accessory",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EquipSlot::Weapon => "Weapon",
            EquipSlot::Armor => "Armor",
            EquipSlot::Accessory => "Accessory",
        }
    }

    /// Loose slot lookup: any text containing the slot name selects it.
    pub fn from_query(query: &str) -> Option<Self> {
        let q = query.to_ascii_lowercase();
        Self::ALL.into_iter().find(|slot| q.contains(slot.as_str()))
    }
}

/// The three equipment slots of one player.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EquipmentLoadout {
    pub weapon: Option<String>,
    pub armor: Option<String>,
    pub accessory: Option<String>,
    pub schema_version: u8,
}

impl EquipmentLoadout {
    pub fn empty() -> Self {
        Self {
            schema_version: EQUIPMENT_SCHEMA_VERSION,
            ..Self::default()
        }
    }

    pub fn get(&self, slot: EquipSlot) -> Option<&str> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_deref(),
            EquipSlot::Armor => self.armor.as_deref(),
            EquipSlot::Accessory => self.accessory.as_deref(),
        }
    }

    /// Put `item` into `slot`, returning whatever was there before.
    pub fn replace(&mut self, slot: EquipSlot, item: Option<String>) -> Option<String> {
        let target = match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
            EquipSlot::Accessory => &mut self.accessory,
        };
        std::mem::replace(target, item)
    }

    pub fn equipped(&self) -> impl Iterator<Item = &str> {
        EquipSlot::ALL.into_iter().filter_map(move |slot| self.get(slot))
    }

    pub fn is_empty(&self) -> bool {
        self.equipped().next().is_none()
    }
}

/// A pending duel request from `challenger` to `defender`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuelChallenge {
    pub challenger: String,
    pub defender: String,
    pub requested_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl DuelChallenge {
    pub fn new(challenger: &str, defender: &str, now: DateTime<Utc>) -> Self {
        Self {
            challenger: challenger.to_string(),
            defender: defender.to_string(),
            requested_at: now,
            schema_version: DUEL_SCHEMA_VERSION,
        }
    }

    pub fn involves(&self, player: &str) -> bool {
        self.challenger == player || self.defender == player
    }
}

/// Round a duration up to whole minutes (never below zero).
pub fn ceil_minutes(duration: Duration) -> i64 {
    let secs = duration.num_milliseconds().max(0);
    (secs + 59_999) / 60_000
}
