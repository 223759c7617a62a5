//! Dice rolling.

use std::sync::Arc;

use charsheet_domain::{DiceFormula, DiceRollResult, DomainError};

use crate::infrastructure::ports::RandomPort;

#[derive(Debug, thiserror::Error)]
pub enum DiceError {
    #[error("Invalid dice formula: {0}")]
    Domain(#[from] DomainError),
}

/// Container for dice use cases.
pub struct DiceUseCases {
    random: Arc<dyn RandomPort>,
}

impl DiceUseCases {
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self { random }
    }

    /// Roll a formula such as `2d6+3` or `d20`.
    pub fn roll(&self, formula: &str) -> Result<DiceRollResult, DiceError> {
        let formula = DiceFormula::parse(formula).map_err(DomainError::from)?;
        Ok(self.roll_formula(&formula))
    }

    /// A d20 check with a flat modifier.
    pub fn roll_check(&self, modifier: i32) -> DiceRollResult {
        self.roll_formula(&DiceFormula::d20(modifier))
    }

    fn roll_formula(&self, formula: &DiceFormula) -> DiceRollResult {
        let result = formula.roll_with(|min, max| self.random.gen_range(min, max));
        tracing::debug!(formula = %formula, total = result.total, "Rolled dice");
        result
    }
}
