//! Domain entities: the character record and read-only reference data.

mod catalog;
mod character;
mod spell;

pub use catalog::{BackgroundEntry, ClassEntry, RaceEntry, SubclassEntry};
pub use character::{
    empty_spell_slots, AbilityScores, Character, CharacterSource, Combat, DeathSaves,
    EquipmentItem, Proficiencies, ProficiencyKind, SaveProficiency, SkillProficiency, SpellSlot,
    SpellSlots, Spellcasting, SPELL_SLOT_LEVELS,
};
pub use spell::{Spell, SpellFilter};
