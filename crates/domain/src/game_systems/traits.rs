//! Rule-system traits.
//!
//! The character sheet engine is written against these traits so the
//! arithmetic is independent of the rule tables that feed it.

use serde::{Serialize, Serializer};

use crate::value_objects::Ability;

/// Score and level arithmetic.
pub trait CalculationEngine: Send + Sync {
    /// Modifier derived from an ability score.
    ///
    /// For d20 systems: floor((score - 10) / 2)
    fn ability_modifier(&self, score: i32) -> i32;

    /// Level-scaled bonus for trained skills, saves and spells.
    fn proficiency_bonus(&self, level: u8) -> i32;

    /// Hit die size for a class.
    fn hit_die(&self, class: &str) -> u8;

    /// Suggested max HP for a single-class character.
    fn max_hp(&self, level: u8, class: &str, constitution_modifier: i32) -> i32;

    /// Experience needed to reach the level after `level`.
    fn xp_for_next_level(&self, level: u8) -> u32;

    /// Level implied by an experience total.
    fn level_from_xp(&self, xp: u32) -> u8;
}

/// Static per-class spellcasting tables.
pub trait SpellcastingSystem: Send + Sync {
    /// The spellcasting row for a class, if the class casts at all.
    fn spellcasting_class(&self, class: &str) -> Option<SpellcastingClass>;

    /// Slot totals for spell levels 1-9, all zero for non-casters.
    fn slot_totals(&self, class: &str, level: u8) -> [u8; 9];

    /// Cantrips known at a level, zero for classes without cantrips.
    fn cantrips_known(&self, class: &str, level: u8) -> u8;

    /// Spells a class knows at a level; `None` for non-casters.
    fn known_spells(&self, class: &str, level: u8) -> Option<KnownSpells>;
}

/// How quickly a class gains spell slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CasterType {
    /// Bard, cleric, druid, sorcerer, wizard
    Full,
    /// Paladin, ranger
    Half,
    /// Warlock pact magic: few slots, all of one level
    Pact,
}

/// One row of the spellcasting-class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpellcastingClass {
    pub class: &'static str,
    pub ability: Ability,
    pub caster_type: CasterType,
    /// First level at which the class casts.
    pub min_level: u8,
}

/// Size of a class's spell repertoire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownSpells {
    Count(u8),
    /// Unrestricted access to the class spell list.
    All,
}

impl Serialize for KnownSpells {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KnownSpells::Count(n) => serializer.serialize_u8(*n),
            KnownSpells::All => serializer.serialize_str("all"),
        }
    }
}

impl std::fmt::Display for KnownSpells {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnownSpells::Count(n) => write!(f, "{}", n),
            KnownSpells::All => write!(f, "all"),
        }
    }
}
