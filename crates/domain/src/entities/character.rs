//! Character record.
//!
//! The record is owned by whichever store persists it. The rules engine only
//! ever reads a borrowed record or returns a modified copy.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::CharacterId;
use crate::value_objects::{Ability, Skill};

/// Spell levels that carry slots.
pub const SPELL_SLOT_LEVELS: std::ops::RangeInclusive<u8> = 1..=9;

/// Where the authoritative copy of a character lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CharacterSource {
    #[default]
    Local,
    Cloud,
}

impl std::fmt::Display for CharacterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Cloud => write!(f, "cloud"),
        }
    }
}

/// Raw ability scores. Conventionally 1-30, but any integer is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl AbilityScores {
    pub fn uniform(score: i32) -> Self {
        Self {
            strength: score,
            dexterity: score,
            constitution: score,
            intelligence: score,
            wisdom: score,
            charisma: score,
        }
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        let slot = match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        };
        *slot = score;
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::uniform(10)
    }
}

/// Training in a single skill. `expertise` is only meaningful with `proficient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillProficiency {
    #[serde(default)]
    pub proficient: bool,
    #[serde(default)]
    pub expertise: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveProficiency {
    #[serde(default)]
    pub proficient: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeathSaves {
    pub successes: u8,
    pub failures: u8,
}

/// Combat block. `current_hp` may drop below zero in some flows; the edit
/// path rejects negative values but stored records are carried as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combat {
    #[serde(rename = "maxHP")]
    pub max_hp: i32,
    #[serde(rename = "currentHP")]
    pub current_hp: i32,
    #[serde(rename = "temporaryHP")]
    pub temporary_hp: i32,
    pub armor_class: i32,
    pub initiative: i32,
    pub speed: i32,
    pub hit_dice: String,
    #[serde(default)]
    pub death_saves: DeathSaves,
}

impl Default for Combat {
    fn default() -> Self {
        Self {
            max_hp: 0,
            current_hp: 0,
            temporary_hp: 0,
            armor_class: 10,
            initiative: 0,
            speed: 30,
            hit_dice: "1d8".to_string(),
            death_saves: DeathSaves::default(),
        }
    }
}

/// Slot accounting for one spell level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpellSlot {
    pub total: u8,
    pub used: u8,
}

impl SpellSlot {
    /// Slots left to spend; zero when `used` exceeds a shrunken `total`.
    pub fn available(&self) -> u8 {
        self.total.saturating_sub(self.used)
    }
}

/// Slot table keyed by spell level 1-9.
pub type SpellSlots = BTreeMap<u8, SpellSlot>;

/// Empty table with every spell level present.
pub fn empty_spell_slots() -> SpellSlots {
    SPELL_SLOT_LEVELS
        .map(|level| (level, SpellSlot::default()))
        .collect()
}

/// Spellcasting block. Entirely derived except for the `used` counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spellcasting {
    #[serde(default)]
    pub ability: Option<Ability>,
    #[serde(default)]
    pub spell_attack: i32,
    #[serde(default, rename = "spellSaveDC")]
    pub spell_save_dc: i32,
    #[serde(default = "empty_spell_slots")]
    pub slots: SpellSlots,
}

impl Default for Spellcasting {
    fn default() -> Self {
        Self {
            ability: None,
            spell_attack: 0,
            spell_save_dc: 0,
            slots: empty_spell_slots(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub name: String,
    pub quantity: u32,
    /// Weight of a single unit, in pounds.
    #[serde(default)]
    pub weight: f64,
}

/// Which proficiency set an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyKind {
    Languages,
    Tools,
    Armor,
    Weapons,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Proficiencies {
    #[serde(default)]
    pub languages: BTreeSet<String>,
    #[serde(default)]
    pub tools: BTreeSet<String>,
    #[serde(default)]
    pub armor: BTreeSet<String>,
    #[serde(default)]
    pub weapons: BTreeSet<String>,
}

impl Proficiencies {
    pub fn set_mut(&mut self, kind: ProficiencyKind) -> &mut BTreeSet<String> {
        match kind {
            ProficiencyKind::Languages => &mut self.languages,
            ProficiencyKind::Tools => &mut self.tools,
            ProficiencyKind::Armor => &mut self.armor,
            ProficiencyKind::Weapons => &mut self.weapons,
        }
    }
}

/// A player character record as stored locally or in the account service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    #[serde(default)]
    pub source: CharacterSource,

    pub name: String,
    #[serde(default)]
    pub race: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub subclass: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub alignment: String,
    #[serde(default)]
    pub gender: String,

    pub level: u8,
    #[serde(default)]
    pub experience: u32,

    #[serde(default)]
    pub abilities: AbilityScores,
    #[serde(default)]
    pub skills: BTreeMap<Skill, SkillProficiency>,
    #[serde(default)]
    pub saving_throws: BTreeMap<Ability, SaveProficiency>,
    #[serde(default)]
    pub combat: Combat,
    #[serde(default)]
    pub spellcasting: Spellcasting,
    /// Derived: 10 + skill modifier for every skill.
    #[serde(default)]
    pub passive_skills: BTreeMap<Skill, i32>,

    #[serde(default)]
    pub equipment: Vec<EquipmentItem>,
    #[serde(default)]
    pub proficiencies: Proficiencies,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    /// A fresh level-1 character with every score at 10 and no training.
    pub fn new(name: impl Into<String>, source: CharacterSource, now: DateTime<Utc>) -> Self {
        Self {
            id: CharacterId::new(),
            source,
            name: name.into(),
            race: String::new(),
            class: String::new(),
            subclass: String::new(),
            background: String::new(),
            alignment: String::new(),
            gender: String::new(),
            level: 1,
            experience: 0,
            abilities: AbilityScores::default(),
            skills: Skill::ALL
                .into_iter()
                .map(|s| (s, SkillProficiency::default()))
                .collect(),
            saving_throws: Ability::ALL
                .into_iter()
                .map(|a| (a, SaveProficiency::default()))
                .collect(),
            combat: Combat::default(),
            spellcasting: Spellcasting::default(),
            passive_skills: BTreeMap::new(),
            equipment: Vec::new(),
            proficiencies: Proficiencies::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_ability(mut self, ability: Ability, score: i32) -> Self {
        self.abilities.set(ability, score);
        self
    }

    pub fn with_skill(mut self, skill: Skill, proficient: bool, expertise: bool) -> Self {
        self.skills.insert(
            skill,
            SkillProficiency {
                proficient,
                expertise,
            },
        );
        self
    }

    pub fn with_save(mut self, ability: Ability, proficient: bool) -> Self {
        self.saving_throws
            .insert(ability, SaveProficiency { proficient });
        self
    }

    /// Training in a skill; absent entries are untrained.
    pub fn skill(&self, skill: Skill) -> SkillProficiency {
        self.skills.get(&skill).copied().unwrap_or_default()
    }

    pub fn is_save_proficient(&self, ability: Ability) -> bool {
        self.saving_throws
            .get(&ability)
            .map(|s| s.proficient)
            .unwrap_or(false)
    }

    /// Total carried weight in pounds.
    pub fn carried_weight(&self) -> f64 {
        self.equipment
            .iter()
            .map(|item| item.quantity as f64 * item.weight)
            .sum()
    }
}
