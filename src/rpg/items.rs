//! Static item catalog.
//!
//! Definitions are plain data: equipment carries its stat deltas, consumables carry a
//! [`ConsumableEffect`] tag that [`crate::rpg::effects::apply_consumable`] interprets.
use crate::rpg::types::{CharacterRecord, EquipSlot};

/// Stat deltas granted while an item is equipped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EquipMods {
    pub attack: u32,
    pub defense: u32,
    /// Added to the quest success chance (0.05 = +5%).
    pub success_bonus: f64,
    /// Multiplier bonus on quest XP (0.20 = +20%).
    pub xp_boost: f64,
}

impl EquipMods {
    const fn stats(attack: u32, defense: u32) -> Self {
        Self {
            attack,
            defense,
            success_bonus: 0.0,
            xp_boost: 0.0,
        }
    }

    const fn with_success(mut self, bonus: f64) -> Self {
        self.success_bonus = bonus;
        self
    }

    const fn with_xp(mut self, boost: f64) -> Self {
        self.xp_boost = boost;
        self
    }
}

/// Which one-time flag guards a permanent bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusGuard {
    EnhancementStone,
    ScrollOfEnhancement,
}

impl BonusGuard {
    pub fn is_spent(&self, character: &CharacterRecord) -> bool {
        match self {
            BonusGuard::EnhancementStone => character.has_used_enhancement_stone,
            BonusGuard::ScrollOfEnhancement => character.has_used_scroll_enhancement,
        }
    }

    pub fn spend(&self, character: &mut CharacterRecord) {
        match self {
            BonusGuard::EnhancementStone => character.has_used_enhancement_stone = true,
            BonusGuard::ScrollOfEnhancement => character.has_used_scroll_enhancement = true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsumableEffect {
    /// Restore `amount` HP. With `revives`, a resting character wakes at `1 + amount`.
    Heal { amount: u32, revives: bool },
    /// Restore all HP and end any rest.
    FullHeal,
    /// `base + floor(level * per_level)` gold.
    GrantGold { base: u64, per_level: f64 },
    GrantXp { amount: u64 },
    /// Stacking attack bonus for the next quest.
    AttackBuff { amount: u32 },
    ResetCooldown,
    /// Permanent success chance in whole percent, once per guard flag.
    PermanentBonus { percent: u32, guard: BonusGuard },
    /// Spent automatically at the start of a quest or raid; lowers monster HP.
    ArmedInCombat { monster_debuff: u32 },
    /// Wipes the character and every row that belongs to it.
    DeleteCharacter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemKind {
    Equipment { slot: EquipSlot, mods: EquipMods },
    Consumable(ConsumableEffect),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemDefinition {
    pub id: &'static str,
    pub name: &'static str,
    /// Short effect text shown in inventory listings.
    pub effect: &'static str,
    /// Shop price; also the basis of the sell price.
    pub value: u64,
    pub kind: ItemKind,
    /// Raid trophies cannot be bought.
    pub purchasable: bool,
}

impl ItemDefinition {
    pub fn is_equipment(&self) -> bool {
        matches!(self.kind, ItemKind::Equipment { .. })
    }

    pub fn slot(&self) -> Option<EquipSlot> {
        match self.kind {
            ItemKind::Equipment { slot, .. } => Some(slot),
            ItemKind::Consumable(_) => None,
        }
    }

    pub fn equip_mods(&self) -> Option<EquipMods> {
        match self.kind {
            ItemKind::Equipment { mods, .. } => Some(mods),
            ItemKind::Consumable(_) => None,
        }
    }

    /// Case-insensitive substring match on id or display name.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_ascii_lowercase();
        !q.is_empty() && (self.id.contains(&q) || self.name.to_ascii_lowercase().contains(&q))
    }

    /// Treasure ids sell back at full value and are never stocked by the shop.
    pub fn is_treasure(&self) -> bool {
        self.id.contains("treasure")
    }

    pub fn sell_value(&self) -> u64 {
        if self.is_treasure() {
            self.value
        } else {
            (self.value as f64 * 0.25).floor() as u64
        }
    }
}

const fn gear(
    id: &'static str,
    name: &'static str,
    effect: &'static str,
    value: u64,
    slot: EquipSlot,
    mods: EquipMods,
) -> ItemDefinition {
    ItemDefinition {
        id,
        name,
        effect,
        value,
        kind: ItemKind::Equipment { slot, mods },
        purchasable: true,
    }
}

const fn consumable(
    id: &'static str,
    name: &'static str,
    effect: &'static str,
    value: u64,
    use_effect: ConsumableEffect,
) -> ItemDefinition {
    ItemDefinition {
        id,
        name,
        effect,
        value,
        kind: ItemKind::Consumable(use_effect),
        purchasable: true,
    }
}

const fn trophy(
    id: &'static str,
    name: &'static str,
    effect: &'static str,
    value: u64,
    use_effect: ConsumableEffect,
) -> ItemDefinition {
    ItemDefinition {
        id,
        name,
        effect,
        value,
        kind: ItemKind::Consumable(use_effect),
        purchasable: false,
    }
}

use ConsumableEffect as Fx;
use EquipSlot::{Accessory, Armor, Weapon};

/// Catalog order matters: fuzzy lookups take the first match.
pub static ITEMS: &[ItemDefinition] = &[
    gear("sword", "Sword", "+2 attack", 10, Weapon, EquipMods::stats(2, 0)),
    gear("shield", "Shield", "+2 defense", 10, Armor, EquipMods::stats(0, 2)),
    gear("iron sword", "Iron Sword", "+3 attack", 20, Weapon, EquipMods::stats(3, 0)),
    gear("steel armor", "Steel Armor", "+3 defense", 20, Armor, EquipMods::stats(0, 3)),
    consumable(
        "potion",
        "Health Potion",
        "Heal 5 HP",
        5,
        Fx::Heal {
            amount: 5,
            revives: true,
        },
    ),
    consumable(
        "treasure",
        "Treasure",
        "Sell for gold",
        3,
        Fx::GrantGold {
            base: 3,
            per_level: 0.0,
        },
    ),
    consumable(
        "rare treasure",
        "Rare Treasure",
        "Sell for extra gold",
        8,
        Fx::GrantGold {
            base: 8,
            per_level: 0.5,
        },
    ),
    gear(
        "amulet",
        "Lucky Amulet",
        "+10% quest success chance",
        15,
        Accessory,
        EquipMods::stats(0, 0).with_success(0.10),
    ),
    consumable(
        "bandage",
        "Bandage",
        "Quick heal 2 HP",
        3,
        Fx::Heal {
            amount: 2,
            revives: false,
        },
    ),
    consumable("time scroll", "Time Scroll", "Resets quest cooldown", 15, Fx::ResetCooldown),
    gear("enchanted blade", "Enchanted Blade", "+4 attack", 35, Weapon, EquipMods::stats(4, 0)),
    gear("dragon slayer", "Dragon Slayer", "+6 attack", 60, Weapon, EquipMods::stats(6, 0)),
    gear(
        "balanced dagger",
        "Balanced Dagger",
        "+2 attack, +1 defense",
        25,
        Weapon,
        EquipMods::stats(2, 1),
    ),
    gear(
        "staff of wisdom",
        "Staff of Wisdom",
        "+3 attack, +5% quest success",
        40,
        Weapon,
        EquipMods::stats(3, 0).with_success(0.05),
    ),
    gear("mythril armor", "Mythril Armor", "+4 defense", 35, Armor, EquipMods::stats(0, 4)),
    gear(
        "dragon scale",
        "Dragon Scale Armor",
        "+6 defense",
        60,
        Armor,
        EquipMods::stats(0, 6),
    ),
    gear(
        "agility garb",
        "Agility Garb",
        "+2 defense, +5% quest success",
        30,
        Armor,
        EquipMods::stats(0, 2).with_success(0.05),
    ),
    gear(
        "battle plating",
        "Battle Plating",
        "+3 defense, +1 attack",
        28,
        Armor,
        EquipMods::stats(1, 3),
    ),
    gear(
        "hero medallion",
        "Hero Medallion",
        "+15% quest success chance",
        30,
        Accessory,
        EquipMods::stats(0, 0).with_success(0.15),
    ),
    gear(
        "warriors band",
        "Warrior's Band",
        "+1 attack, +1 defense",
        25,
        Accessory,
        EquipMods::stats(1, 1),
    ),
    gear(
        "dragons eye",
        "Dragon's Eye",
        "+20% quest success chance",
        45,
        Accessory,
        EquipMods::stats(0, 0).with_success(0.20),
    ),
    gear(
        "charm of balance",
        "Charm of Balance",
        "+2 attack, +2 defense",
        40,
        Accessory,
        EquipMods::stats(2, 2),
    ),
    consumable(
        "greater potion",
        "Greater Health Potion",
        "Heal 10 HP",
        8,
        Fx::Heal {
            amount: 10,
            revives: true,
        },
    ),
    consumable("elixir", "Elixir of Restoration", "Full heal", 25, Fx::FullHeal),
    consumable(
        "combat scroll",
        "Combat Scroll",
        "Temp +2 attack next quest",
        10,
        Fx::AttackBuff { amount: 2 },
    ),
    consumable(
        "damage charm",
        "Damage Charm",
        "Deal 3 damage to enemies",
        8,
        Fx::ArmedInCombat { monster_debuff: 3 },
    ),
    consumable(
        "legendary treasure",
        "Legendary Treasure",
        "Sell for massive gold",
        20,
        Fx::GrantGold {
            base: 20,
            per_level: 1.5,
        },
    ),
    consumable(
        "enhancement stone",
        "Enhancement Stone",
        "+5% perm quest success (one time use)",
        40,
        Fx::PermanentBonus {
            percent: 5,
            guard: BonusGuard::EnhancementStone,
        },
    ),
    gear(
        "scholar ring",
        "Scholar's Ring",
        "+20% XP gain from quests",
        40,
        Accessory,
        EquipMods::stats(0, 0).with_xp(0.20),
    ),
    consumable(
        "tome of knowledge",
        "Tome of Knowledge",
        "Grants 500 XP",
        50,
        Fx::GrantXp { amount: 500 },
    ),
    gear(
        "celestial blade",
        "Celestial Blade",
        "+8 attack, +5% quest success",
        85,
        Weapon,
        EquipMods::stats(8, 0).with_success(0.05),
    ),
    gear("void reaver", "Void Reaver", "+10 attack", 100, Weapon, EquipMods::stats(10, 0)),
    gear(
        "equilibrium edge",
        "Equilibrium Edge",
        "+6 attack, +3 defense",
        95,
        Weapon,
        EquipMods::stats(6, 3),
    ),
    gear(
        "celestial plate",
        "Celestial Plate",
        "+8 defense, +5% quest success",
        85,
        Armor,
        EquipMods::stats(0, 8).with_success(0.05),
    ),
    gear("void guardian", "Void Guardian", "+10 defense", 100, Armor, EquipMods::stats(0, 10)),
    gear(
        "equilibrium shell",
        "Equilibrium Shell",
        "+3 attack, +6 defense",
        95,
        Armor,
        EquipMods::stats(3, 6),
    ),
    gear(
        "celestial emblem",
        "Celestial Emblem",
        "+30% quest success chance",
        80,
        Accessory,
        EquipMods::stats(0, 0).with_success(0.30),
    ),
    gear(
        "legendary catalyst",
        "Legendary Catalyst",
        "+35% XP gain from quests",
        75,
        Accessory,
        EquipMods::stats(0, 0).with_xp(0.35),
    ),
    gear(
        "grand totem",
        "Grand Totem",
        "+3 attack, +3 defense, +10% quest success",
        90,
        Accessory,
        EquipMods::stats(3, 3).with_success(0.10),
    ),
    gear(
        "relic of the ancients",
        "Relic of the Ancients",
        "+4 attack, +4 defense, +15% XP gain",
        110,
        Accessory,
        EquipMods::stats(4, 4).with_xp(0.15),
    ),
    consumable(
        "combat catalyst",
        "Combat Catalyst",
        "Temp +4 attack next quest",
        25,
        Fx::AttackBuff { amount: 4 },
    ),
    consumable(
        "ancient wisdom",
        "Ancient Wisdom",
        "Grants 1500 XP",
        100,
        Fx::GrantXp { amount: 1500 },
    ),
    consumable(
        "scroll of enhancement",
        "Scroll of Enhancement",
        "+7% perm quest success (one time use)",
        200,
        Fx::PermanentBonus {
            percent: 7,
            guard: BonusGuard::ScrollOfEnhancement,
        },
    ),
    consumable(
        "cursed milk",
        "Cursed Milk",
        "WARNING: Permanently deletes character!",
        42069,
        Fx::DeleteCharacter,
    ),
    trophy(
        "cosmic core",
        "Cosmic Core",
        "Raid trophy, crack open for gold",
        60,
        Fx::GrantGold {
            base: 40,
            per_level: 2.0,
        },
    ),
    trophy(
        "elemental core",
        "Elemental Core",
        "Raid trophy, crack open for gold",
        50,
        Fx::GrantGold {
            base: 35,
            per_level: 2.0,
        },
    ),
];

pub fn find_item(id: &str) -> Option<&'static ItemDefinition> {
    ITEMS.iter().find(|item| item.id == id)
}

/// Display name for an item id, falling back to the id itself.
pub fn item_name(id: &str) -> &str {
    find_item(id).map(|item| item.name).unwrap_or(id)
}

/// `a Bandage`, `an Elixir of Restoration`.
pub fn with_article(name: &str) -> String {
    let vowel = name
        .chars()
        .next()
        .map(|c| "aeiouAEIOU".contains(c))
        .unwrap_or(false);
    format!("{} {}", if vowel { "an" } else { "a" }, name)
}
