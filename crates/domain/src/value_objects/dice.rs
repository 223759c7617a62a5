//! Dice formulas and roll results
//!
//! Supports formulas like "1d20+5", "2d6-1", "d8". Randomness is injected:
//! the caller passes a closure returning a uniform integer in `min..=max`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error when parsing a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    /// The formula string is empty
    #[error("Empty dice formula")]
    Empty,
    /// Invalid format - expected XdY or XdY+Z
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    /// Dice count must be at least 1
    #[error("Dice count must be at least 1")]
    InvalidDiceCount,
    /// Die size must be at least 2
    #[error("Die size must be at least 2")]
    InvalidDieSize,
    /// Modifier outside the supported range
    #[error("Modifier must be between -{max} and {max}", max = MAX_MODIFIER)]
    InvalidModifier,
}

/// Largest flat modifier a formula may carry, in either direction.
pub const MAX_MODIFIER: i32 = 1000;

/// A parsed dice formula like "2d6+3"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceFormula {
    /// Number of dice to roll (X in XdY)
    pub dice_count: u8,
    /// Size of each die (Y in XdY)
    pub die_size: u16,
    /// Added after summing the dice
    pub modifier: i32,
}

impl DiceFormula {
    pub fn new(dice_count: u8, die_size: u16, modifier: i32) -> Result<Self, DiceParseError> {
        if dice_count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }
        if die_size < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }
        if !(-MAX_MODIFIER..=MAX_MODIFIER).contains(&modifier) {
            return Err(DiceParseError::InvalidModifier);
        }
        Ok(Self {
            dice_count,
            die_size,
            modifier,
        })
    }

    /// A single d20 with a modifier, the shape of every check and save.
    pub fn d20(modifier: i32) -> Self {
        Self {
            dice_count: 1,
            die_size: 20,
            modifier,
        }
    }

    /// Parse "XdY", "XdY+Z", "XdY-Z" or "dY". Whitespace is ignored.
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if compact.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let (count_part, rest) = compact.split_once('d').ok_or_else(|| {
            DiceParseError::InvalidFormat(format!("Missing 'd' separator in '{}'", compact))
        })?;

        let dice_count: u8 = if count_part.is_empty() {
            1
        } else {
            count_part.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid dice count: '{}'", count_part))
            })?
        };

        let (size_part, modifier) = match rest.find(['+', '-']) {
            Some(0) => {
                return Err(DiceParseError::InvalidFormat(format!(
                    "Invalid die size: '{}'",
                    rest
                )))
            }
            Some(pos) => {
                let (size, signed) = rest.split_at(pos);
                let modifier: i32 = signed.parse().map_err(|_| {
                    DiceParseError::InvalidFormat(format!("Invalid modifier: '{}'", signed))
                })?;
                (size, modifier)
            }
            None => (rest, 0),
        };

        let die_size: u16 = size_part.parse().map_err(|_| {
            DiceParseError::InvalidFormat(format!("Invalid die size: '{}'", size_part))
        })?;

        Self::new(dice_count, die_size, modifier)
    }

    /// Roll with an injected uniform source: `rng(min, max)` must return a
    /// value in `min..=max`.
    pub fn roll_with(&self, mut rng: impl FnMut(i32, i32) -> i32) -> DiceRollResult {
        let individual_rolls: Vec<i32> = (0..self.dice_count)
            .map(|_| rng(1, self.die_size as i32))
            .collect();
        let dice_total: i32 = individual_rolls.iter().sum();

        DiceRollResult {
            formula: *self,
            individual_rolls,
            dice_total,
            total: dice_total.saturating_add(self.modifier),
        }
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.dice_count, self.die_size)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{}", m),
            m => write!(f, "{}", m),
        }
    }
}

impl std::str::FromStr for DiceFormula {
    type Err = DiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Result of rolling dice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRollResult {
    pub formula: DiceFormula,
    pub individual_rolls: Vec<i32>,
    /// Sum of dice before modifier
    pub dice_total: i32,
    /// dice_total + modifier
    pub total: i32,
}

impl DiceRollResult {
    /// Breakdown string, e.g. "2d6+3 [4, 5] = 12".
    pub fn breakdown(&self) -> String {
        let rolls: Vec<String> = self.individual_rolls.iter().map(|r| r.to_string()).collect();
        format!("{} [{}] = {}", self.formula, rolls.join(", "), self.total)
    }

    pub fn is_natural_20(&self) -> bool {
        self.formula.die_size == 20
            && self.formula.dice_count == 1
            && self.individual_rolls.first() == Some(&20)
    }

    pub fn is_natural_1(&self) -> bool {
        self.formula.die_size == 20
            && self.formula.dice_count == 1
            && self.individual_rolls.first() == Some(&1)
    }
}
