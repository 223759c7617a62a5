//! Rule systems.
//!
//! Only D&D 5e is implemented; the traits keep the engine's arithmetic
//! separate from the static class tables.

mod dnd5e;
mod traits;

pub use dnd5e::Dnd5eSystem;
pub use traits::{
    CalculationEngine, CasterType, KnownSpells, SpellcastingClass, SpellcastingSystem,
};
