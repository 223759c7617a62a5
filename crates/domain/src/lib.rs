//! Character sheet domain: records, rule tables, derived statistics and
//! edit validation. Pure and synchronous; no I/O.

pub mod character_sheet;
pub mod entities;
pub mod error;
pub mod game_systems;
pub mod ids;
pub mod validation;
pub mod value_objects;

pub use character_sheet::{
    derive_sheet, recompute_derived, CharacterSheetEngine, SheetView, MAX_LEVEL, MIN_LEVEL,
};
pub use entities::{
    empty_spell_slots, AbilityScores, BackgroundEntry, Character, CharacterSource, ClassEntry,
    Combat, DeathSaves, EquipmentItem, Proficiencies, ProficiencyKind, RaceEntry,
    SaveProficiency, SkillProficiency, Spell, SpellFilter, SpellSlot, SpellSlots, Spellcasting,
    SubclassEntry, SPELL_SLOT_LEVELS,
};
pub use error::{DomainError, ValidationError};
pub use game_systems::{
    CalculationEngine, CasterType, Dnd5eSystem, KnownSpells, SpellcastingClass,
    SpellcastingSystem,
};
pub use ids::CharacterId;
pub use validation::{
    apply_edit, apply_edits, normalize, validate_character, CharacterEdit, IdentityField,
    MAX_DEATH_SAVES,
};
pub use value_objects::{Ability, DiceFormula, DiceParseError, DiceRollResult, Skill};
