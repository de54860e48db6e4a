//! Monster catalog, encounter selection and raid boss definitions.
use rand::Rng;

use crate::rpg::dice::DiceSpec;

/// Static stat block for one monster kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonsterDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub hp: u32,
    pub damage: u32,
    pub exp: u64,
    pub gold: DiceSpec,
    pub level: u32,
}

const fn monster(
    id: &'static str,
    name: &'static str,
    hp: u32,
    damage: u32,
    exp: u64,
    gold: DiceSpec,
    level: u32,
) -> MonsterDefinition {
    MonsterDefinition {
        id,
        name,
        hp,
        damage,
        exp,
        gold,
        level,
    }
}

pub static MONSTERS: &[MonsterDefinition] = &[
    // Level 1
    monster("rat", "Giant Rat", 3, 1, 1, DiceSpec::new(1, 2, 0), 1),
    monster("bat", "Cave Bat", 2, 2, 1, DiceSpec::new(1, 2, 0), 1),
    // Level 2
    monster("kobold", "Kobold", 4, 2, 2, DiceSpec::new(1, 3, 0), 2),
    monster("spider", "Giant Spider", 5, 3, 2, DiceSpec::new(1, 3, 0), 2),
    // Level 3
    monster("goblin", "Goblin", 6, 5, 3, DiceSpec::new(1, 4, 0), 3),
    monster("zombie", "Zombie", 7, 4, 4, DiceSpec::new(1, 4, 0), 3),
    monster("wolf", "Dire Wolf", 6, 6, 3, DiceSpec::new(1, 4, 1), 3),
    // Level 4
    monster("bandit", "Bandit", 8, 7, 5, DiceSpec::new(1, 6, 0), 4),
    monster("gnoll", "Gnoll", 9, 6, 5, DiceSpec::new(1, 6, 1), 4),
    monster("slime", "Acidic Slime", 8, 8, 6, DiceSpec::new(1, 6, 0), 4),
    // Level 5
    monster("ghost", "Ghost", 7, 7, 6, DiceSpec::new(2, 4, 0), 5),
    monster("skeleton", "Skeleton", 8, 6, 7, DiceSpec::new(2, 4, 1), 5),
    monster("wight", "Wight", 7, 8, 7, DiceSpec::new(2, 4, 0), 5),
    monster("specter", "Specter", 8, 7, 8, DiceSpec::new(2, 4, 1), 5),
    // Level 6
    monster("basilisk", "Basilisk", 9, 10, 9, DiceSpec::new(2, 5, 0), 6),
    monster("orc", "Orc", 10, 9, 10, DiceSpec::new(2, 5, 1), 6),
    monster("minotaur", "Minotaur", 9, 11, 11, DiceSpec::new(2, 5, 0), 6),
    monster("cockatrice", "Cockatrice", 10, 10, 10, DiceSpec::new(2, 5, 1), 6),
    // Level 7
    monster("phase_cat", "Phase Cat", 11, 12, 13, DiceSpec::new(2, 6, 0), 7),
    monster("troll", "Troll", 12, 11, 14, DiceSpec::new(2, 6, 1), 7),
    monster("manticore", "Manticore", 11, 13, 15, DiceSpec::new(2, 6, 0), 7),
    monster("hellhound", "Hellhound", 12, 12, 14, DiceSpec::new(2, 6, 1), 7),
    // Level 8
    monster("banshee", "Banshee", 13, 14, 18, DiceSpec::new(3, 5, 0), 8),
    monster("ogre", "Ogre", 14, 13, 19, DiceSpec::new(3, 5, 1), 8),
    monster("cyclops", "Cyclops", 13, 15, 20, DiceSpec::new(3, 5, 0), 8),
    monster("death_knight", "Death Knight", 14, 14, 19, DiceSpec::new(3, 5, 1), 8),
    // Level 9
    monster("gorgon", "Gorgon", 15, 16, 27, DiceSpec::new(3, 6, 0), 9),
    monster("wraith", "Wraith", 16, 15, 28, DiceSpec::new(3, 6, 1), 9),
    monster("lich", "Lich", 15, 17, 30, DiceSpec::new(3, 6, 0), 9),
    monster("beholder", "Beholder", 16, 16, 29, DiceSpec::new(3, 6, 1), 9),
    monster("wyvern", "Wyvern", 17, 15, 28, DiceSpec::new(3, 6, 0), 9),
    monster("vampire", "Vampire", 16, 17, 31, DiceSpec::new(3, 6, 1), 9),
    // Level 10
    monster("treant", "Treant", 18, 18, 39, DiceSpec::new(3, 7, 0), 10),
    monster("frost_giant", "Frost Giant", 19, 17, 41, DiceSpec::new(3, 7, 2), 10),
    monster("earth_elemental", "Earth Elemental", 20, 16, 40, DiceSpec::new(3, 7, 0), 10),
    monster("dragon_wyrmling", "Dragon Wyrmling", 18, 19, 43, DiceSpec::new(3, 7, 2), 10),
    monster("storm_dragon", "Storm Dragon", 19, 18, 44, DiceSpec::new(3, 7, 0), 10),
    monster("flesh_golem", "Flesh Golem", 20, 17, 42, DiceSpec::new(3, 7, 2), 10),
    // Level 11
    monster("iron_golem", "Iron Golem", 22, 20, 120, DiceSpec::new(4, 6, 0), 11),
    monster("storm_giant", "Storm Giant", 23, 21, 125, DiceSpec::new(4, 6, 2), 11),
    monster("mind_flayer", "Mind Flayer", 21, 22, 130, DiceSpec::new(4, 6, 0), 11),
    monster("black_dragon", "Black Dragon", 24, 20, 125, DiceSpec::new(4, 6, 2), 11),
    monster("death_slaad", "Death Slaad", 22, 22, 128, DiceSpec::new(4, 6, 0), 11),
    monster("elder_brain", "Elder Brain", 23, 21, 122, DiceSpec::new(4, 6, 2), 11),
    // Level 12
    monster("chimera", "Chimera", 25, 23, 175, DiceSpec::new(4, 7, 0), 12),
    monster("fire_giant", "Fire Giant", 26, 22, 180, DiceSpec::new(4, 7, 2), 12),
    monster("hydra", "Hydra", 27, 21, 185, DiceSpec::new(4, 7, 0), 12),
    monster("shadow_dragon", "Shadow Dragon", 25, 24, 182, DiceSpec::new(4, 7, 2), 12),
    monster("planetar", "Planetar", 26, 23, 178, DiceSpec::new(4, 7, 0), 12),
    monster("prismatic_beast", "Prismatic Beast", 27, 22, 188, DiceSpec::new(4, 7, 2), 12),
    // Level 13
    monster("ancient_mummy", "Ancient Mummy", 32, 27, 310, DiceSpec::new(5, 6, 0), 13),
    monster("pit_fiend", "Pit Fiend", 33, 28, 320, DiceSpec::new(5, 6, 3), 13),
    monster("thunderbird", "Thunderbird", 34, 26, 315, DiceSpec::new(5, 6, 0), 13),
    monster("kraken_priest", "Kraken Priest", 33, 27, 325, DiceSpec::new(5, 6, 3), 13),
    monster("time_eater", "Time Eater", 32, 29, 330, DiceSpec::new(5, 6, 0), 13),
    monster("solar_phoenix", "Solar Phoenix", 34, 27, 318, DiceSpec::new(5, 6, 3), 13),
    // Level 14
    monster("nightshade", "Nightshade", 38, 30, 420, DiceSpec::new(5, 7, 0), 14),
    monster("aboleth", "Aboleth", 39, 31, 430, DiceSpec::new(5, 7, 3), 14),
    monster("balor", "Balor", 40, 29, 415, DiceSpec::new(5, 7, 0), 14),
    monster("kraken", "Kraken", 38, 32, 435, DiceSpec::new(5, 7, 3), 14),
    monster("tarrasque_cub", "Tarrasque Cub", 40, 30, 440, DiceSpec::new(5, 7, 0), 14),
    monster("void_reaper", "Void Reaper", 39, 31, 425, DiceSpec::new(5, 7, 3), 14),
    // Level 15
    monster("eldritch_horror", "Eldritch Horror", 45, 35, 540, DiceSpec::new(6, 6, 0), 15),
    monster("astral_dreadnought", "Astral Dreadnought", 46, 36, 550, DiceSpec::new(6, 6, 4), 15),
    monster("archlich", "Archlich", 47, 34, 560, DiceSpec::new(6, 6, 0), 15),
    monster("world_serpent", "World Serpent", 45, 37, 545, DiceSpec::new(6, 6, 4), 15),
    monster("dream_devourer", "Dream Devourer", 46, 35, 555, DiceSpec::new(6, 6, 0), 15),
    monster("quantum_behemoth", "Quantum Behemoth", 47, 36, 565, DiceSpec::new(6, 6, 4), 15),
    // Level 16
    monster("tarrasque", "Tarrasque", 55, 42, 890, DiceSpec::new(6, 7, 0), 16),
    monster("overmind", "Overmind", 56, 43, 900, DiceSpec::new(6, 7, 4), 16),
    monster("reality_breaker", "Reality Breaker", 57, 41, 910, DiceSpec::new(6, 7, 0), 16),
    monster("eternity_wurm", "Eternity Wurm", 55, 44, 905, DiceSpec::new(6, 7, 4), 16),
    monster("infinity_golem", "Infinity Golem", 56, 42, 895, DiceSpec::new(6, 7, 0), 16),
    monster("cosmic_juggernaut", "Cosmic Juggernaut", 57, 43, 915, DiceSpec::new(6, 7, 4), 16),
    // Level 17
    monster("phoenix_overlord", "Phoenix Overlord", 75, 55, 2150, DiceSpec::new(7, 7, 0), 17),
    monster("leviathan_prime", "Leviathan Prime", 76, 56, 2200, DiceSpec::new(7, 7, 5), 17),
    monster("chaos_titan", "Chaos Titan", 77, 54, 2250, DiceSpec::new(7, 7, 0), 17),
    monster("omniversal_warden", "Omniversal Warden", 75, 57, 2180, DiceSpec::new(7, 7, 5), 17),
    monster("void_tyrant", "Void Tyrant", 76, 55, 2220, DiceSpec::new(7, 7, 0), 17),
    monster("hyperion_beast", "Hyperion Beast", 77, 56, 2230, DiceSpec::new(7, 7, 5), 17),
    // Level 18
    monster("phoenix", "Phoenix", 90, 65, 3900, DiceSpec::new(8, 7, 0), 18),
    monster("leviathan", "Leviathan", 92, 66, 4000, DiceSpec::new(8, 7, 6), 18),
    monster("titan", "Titan", 93, 64, 4100, DiceSpec::new(8, 7, 0), 18),
    monster("primal_dragon", "Primal Dragon", 91, 67, 4050, DiceSpec::new(8, 7, 6), 18),
    monster("omnipotent_entity", "Omnipotent Entity", 100, 70, 4300, DiceSpec::new(10, 7, 0), 18),
    monster("finality_warden", "Finality Warden", 95, 68, 4200, DiceSpec::new(9, 7, 0), 18),
    // Level 19
    monster("chronophage_eclipse", "Chronophage Eclipse", 110, 72, 4100, DiceSpec::new(9, 7, 0), 19),
    monster("shadow_emperor", "Shadow Emperor", 108, 70, 4200, DiceSpec::new(8, 7, 6), 19),
    monster("wyrm_of_endings", "Wyrm of Endings", 112, 74, 4300, DiceSpec::new(10, 7, 0), 19),
    monster("harbinger_of_oblivion", "Harbinger of Oblivion", 109, 73, 4000, DiceSpec::new(9, 7, 0), 19),
    monster("colossus_of_the_deep", "Colossus of the Deep", 111, 72, 4150, DiceSpec::new(8, 7, 6), 19),
    monster("beast_beyond_stars", "Beast Beyond Stars", 113, 75, 4300, DiceSpec::new(10, 7, 0), 19),
    // Level 20
    monster("forgefather_of_gods", "Forgefather of Gods", 120, 78, 4250, DiceSpec::new(10, 7, 0), 20),
    monster("seraph_of_ruin", "Seraph of Ruin", 118, 77, 4200, DiceSpec::new(9, 7, 0), 20),
    monster("netherbound_monarch", "Netherbound Monarch", 122, 79, 4300, DiceSpec::new(10, 7, 0), 20),
    monster("echo_of_the_unwritten", "Echo of the Unwritten", 119, 76, 4100, DiceSpec::new(8, 7, 6), 20),
    monster("wrath_of_the_eternals", "Wrath of the Eternals", 121, 78, 4150, DiceSpec::new(9, 7, 0), 20),
    monster("infinity_shatterer", "Infinity Shatterer", 123, 80, 4300, DiceSpec::new(10, 7, 0), 20),
    // Level 21
    monster("voidking_ascendant", "Voidking Ascendant", 130, 85, 4300, DiceSpec::new(10, 7, 0), 21),
    monster("ninefold_hydra", "Ninefold Hydra", 128, 83, 4250, DiceSpec::new(9, 7, 4), 21),
    monster("time_unraveler", "Time Unraveler", 132, 86, 4200, DiceSpec::new(9, 7, 0), 21),
    monster("crown_of_the_endless", "Crown of the Endless", 129, 84, 4300, DiceSpec::new(10, 7, 0), 21),
    monster("oblivion_prime", "Oblivion Prime", 131, 87, 4150, DiceSpec::new(9, 7, 3), 21),
    monster("final_godbreaker", "Final Godbreaker", 135, 90, 4300, DiceSpec::new(10, 7, 0), 21),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Elite,
    Boss,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Elite => "elite",
            Variant::Boss => "boss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityEffect {
    /// Lowers the player's success chance by 0.10.
    DamageOverTime,
    /// Multiplies the monster's damage by 1.5.
    CriticalHit,
    /// Lowers the player's success chance by 0.15.
    Dodge,
    /// Cosmetic only.
    LifeSteal,
}

impl AbilityEffect {
    /// Short tag shown in the combat line when the ability fires.
    pub fn combat_tag(&self) -> &'static str {
        match self {
            AbilityEffect::DamageOverTime => "poisoned",
            AbilityEffect::CriticalHit => "critical hit",
            AbilityEffect::Dodge => "agile",
            AbilityEffect::LifeSteal => "life-draining",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialAbility {
    pub name: &'static str,
    pub effect: AbilityEffect,
    /// Per-encounter activation chance.
    pub chance: f64,
}

/// Abilities that may be attached to a monster without one of its own.
pub const RANDOM_ABILITIES: [SpecialAbility; 4] = [
    SpecialAbility {
        name: "Poison",
        effect: AbilityEffect::DamageOverTime,
        chance: 0.2,
    },
    SpecialAbility {
        name: "Critical Strike",
        effect: AbilityEffect::CriticalHit,
        chance: 0.15,
    },
    SpecialAbility {
        name: "Evasion",
        effect: AbilityEffect::Dodge,
        chance: 0.2,
    },
    SpecialAbility {
        name: "Life Drain",
        effect: AbilityEffect::LifeSteal,
        chance: 0.25,
    },
];

pub const BOSS_CHANCE: f64 = 0.01;
pub const ELITE_CHANCE: f64 = 0.05;
pub const ABILITY_ATTACH_CHANCE: f64 = 0.3;

/// A monster rolled for one encounter.
#[derive(Debug, Clone, PartialEq)]
pub struct MonsterInstance {
    pub id: &'static str,
    pub name: String,
    pub hp: u32,
    pub damage: u32,
    pub exp: u64,
    pub gold: DiceSpec,
    pub level: u32,
    pub variant: Option<Variant>,
    pub ability: Option<SpecialAbility>,
}

impl MonsterInstance {
    pub fn from_definition(def: &MonsterDefinition) -> Self {
        Self {
            id: def.id,
            name: def.name.to_string(),
            hp: def.hp,
            damage: def.damage,
            exp: def.exp,
            gold: def.gold,
            level: def.level,
            variant: None,
            ability: None,
        }
    }

    pub fn apply_variant(&mut self, variant: Variant) {
        match variant {
            Variant::Boss => {
                self.name = format!("{} Boss", self.name);
                self.hp *= 2;
                self.damage += 2;
                self.exp = (self.exp as f64 * 1.5).floor() as u64;
            }
            Variant::Elite => {
                self.name = format!("Elite {}", self.name);
                self.hp = (self.hp as f64 * 1.3).floor() as u32;
                self.damage += 1;
                self.exp = (self.exp as f64 * 1.2).floor() as u64;
            }
        }
        self.variant = Some(variant);
    }

    /// Name plus variant tier, e.g. `Elite Goblin (elite)`.
    pub fn describe(&self) -> String {
        match self.variant {
            Some(variant) => format!("{} ({})", self.name, variant.as_str()),
            None => self.name.clone(),
        }
    }
}

/// Pool weight for a monster `distance` levels away from the player.
pub fn level_weight(distance: u32) -> usize {
    match distance {
        0 => 5,
        1 => 3,
        2 => 1,
        _ => 0,
    }
}

/// Weighted candidate pool: each definition appears `level_weight` times.
pub fn candidate_pool(level: u32) -> Vec<&'static MonsterDefinition> {
    MONSTERS
        .iter()
        .flat_map(|def| {
            let weight = level_weight(def.level.abs_diff(level));
            std::iter::repeat(def).take(weight)
        })
        .collect()
}

/// Draw an encounter for a character of `level`. `None` when nothing is within two levels.
pub fn select_monster<R: Rng + ?Sized>(level: u32, rng: &mut R) -> Option<MonsterInstance> {
    let pool = candidate_pool(level);
    if pool.is_empty() {
        return None;
    }
    let def = pool[rng.gen_range(0..pool.len())];
    let mut monster = MonsterInstance::from_definition(def);

    let variant_roll: f64 = rng.gen();
    if variant_roll < BOSS_CHANCE {
        monster.apply_variant(Variant::Boss);
    } else if variant_roll < ELITE_CHANCE {
        monster.apply_variant(Variant::Elite);
    }

    if monster.ability.is_none() && rng.gen::<f64>() < ABILITY_ATTACH_CHANCE {
        monster.ability = Some(RANDOM_ABILITIES[rng.gen_range(0..RANDOM_ABILITIES.len())]);
    }
    Some(monster)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaidEffect {
    /// Player strikes land at 70%.
    CosmicBarrier,
    /// Extra damage equal to a quarter of the phase damage, ignoring defense.
    VoidLash,
    /// The boss strikes twice.
    CosmicRend,
    /// Player strikes land at 75%.
    FrostAura,
    /// Flat burn damage on top of the hit.
    Inferno,
    /// Player strikes scaled by a uniform draw in [0.5, 1.5].
    ElementalShift,
    CriticalHit,
    Dodge,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaidAbility {
    pub effect: RaidEffect,
    pub description: &'static str,
    pub chance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaidPhase {
    pub name: &'static str,
    pub hp: u32,
    pub damage: u32,
    pub defense: u32,
    pub ability: Option<RaidAbility>,
    /// XP granted for clearing the raid; only the final phase carries any.
    pub exp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaidBoss {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub phases: &'static [RaidPhase],
    pub min_level: u32,
    pub cooldown_hours: i64,
    pub reward_gold: DiceSpec,
    /// Item id granted on victory.
    pub trophy: &'static str,
}

pub static RAID_BOSSES: &[RaidBoss] = &[
    RaidBoss {
        key: "tyrant",
        name: "Eternity Tyrant",
        description: "A colossal being of cosmic malevolence that threatens reality itself.",
        phases: &[
            RaidPhase {
                name: "Eternity Tyrant (Phase 1)",
                hp: 200,
                damage: 18,
                defense: 0,
                ability: Some(RaidAbility {
                    effect: RaidEffect::CosmicBarrier,
                    description: "Reduces damage taken by 30%",
                    chance: 1.0,
                }),
                exp: 0,
            },
            RaidPhase {
                name: "Eternity Tyrant (Phase 2)",
                hp: 220,
                damage: 22,
                defense: 0,
                ability: Some(RaidAbility {
                    effect: RaidEffect::VoidLash,
                    description: "Deals additional damage that bypasses defense",
                    chance: 0.4,
                }),
                exp: 0,
            },
            RaidPhase {
                name: "Eternity Tyrant (Final Form)",
                hp: 250,
                damage: 25,
                defense: 0,
                ability: Some(RaidAbility {
                    effect: RaidEffect::CosmicRend,
                    description: "Can hit multiple times in one attack",
                    chance: 0.3,
                }),
                exp: 9000,
            },
        ],
        min_level: 15,
        cooldown_hours: 24,
        reward_gold: DiceSpec::new(3, 10, 0),
        trophy: "cosmic core",
    },
    RaidBoss {
        key: "leviathan",
        name: "Chroma Leviathan",
        description: "An ancient elemental beast with mastery over all elements.",
        phases: &[
            RaidPhase {
                name: "Chroma Leviathan (Ice Form)",
                hp: 190,
                damage: 9,
                defense: 0,
                ability: Some(RaidAbility {
                    effect: RaidEffect::FrostAura,
                    description: "Reduces attack speed and effectiveness",
                    chance: 0.5,
                }),
                exp: 0,
            },
            RaidPhase {
                name: "Chroma Leviathan (Fire Form)",
                hp: 210,
                damage: 10,
                defense: 0,
                ability: Some(RaidAbility {
                    effect: RaidEffect::Inferno,
                    description: "Deals burn damage over time",
                    chance: 0.4,
                }),
                exp: 0,
            },
            RaidPhase {
                name: "Chroma Leviathan (Primal Form)",
                hp: 240,
                damage: 11,
                defense: 0,
                ability: Some(RaidAbility {
                    effect: RaidEffect::ElementalShift,
                    description: "Changes weaknesses and resistances unpredictably",
                    chance: 0.3,
                }),
                exp: 8500,
            },
        ],
        min_level: 14,
        cooldown_hours: 20,
        reward_gold: DiceSpec::new(3, 10, 0),
        trophy: "elemental core",
    },
];

/// Look up a raid boss by key or name fragment; empty input picks the first boss.
pub fn find_raid_boss(query: &str) -> Option<&'static RaidBoss> {
    let q = query.trim().to_ascii_lowercase();
    if q.is_empty() {
        return RAID_BOSSES.first();
    }
    RAID_BOSSES
        .iter()
        .find(|boss| boss.key.contains(&q) || boss.name.to_ascii_lowercase().contains(&q))
}
