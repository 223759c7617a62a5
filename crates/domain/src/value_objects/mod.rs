//! Value objects: small immutable types identified by their value.

mod ability;
mod dice;

pub use ability::{Ability, Skill};
pub use dice::{DiceFormula, DiceParseError, DiceRollResult};
