//! Application use cases.
//!
//! Each module exposes a use case container wired with the ports it needs.

pub mod character_sheet;
pub mod dice;
pub mod spells;

pub use character_sheet::{CharacterSheet, CharacterSheetError, CharacterSheetUseCases, NewCharacter};
pub use dice::{DiceError, DiceUseCases};
pub use spells::{SpellError, SpellUseCases};
