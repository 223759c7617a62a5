//! Ability and skill identifiers.
//!
//! The skill → ability mapping is a fixed rules table, not configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    pub fn all() -> [Ability; 6] {
        Self::ALL
    }

    /// Key used in stored records and edit field paths.
    pub fn key(&self) -> &'static str {
        match self {
            Ability::Strength => "strength",
            Ability::Dexterity => "dexterity",
            Ability::Constitution => "constitution",
            Ability::Intelligence => "intelligence",
            Ability::Wisdom => "wisdom",
            Ability::Charisma => "charisma",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Ability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strength" | "str" => Ok(Ability::Strength),
            "dexterity" | "dex" => Ok(Ability::Dexterity),
            "constitution" | "con" => Ok(Ability::Constitution),
            "intelligence" | "int" => Ok(Ability::Intelligence),
            "wisdom" | "wis" => Ok(Ability::Wisdom),
            "charisma" | "cha" => Ok(Ability::Charisma),
            _ => Err(DomainError::parse(format!("Unknown ability: {}", s))),
        }
    }
}

/// The eighteen fixed skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    pub const ALL: [Skill; 18] = [
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Arcana,
        Skill::Athletics,
        Skill::Deception,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Nature,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::Religion,
        Skill::SleightOfHand,
        Skill::Stealth,
        Skill::Survival,
    ];

    pub fn all() -> [Skill; 18] {
        Self::ALL
    }

    /// The ability that governs this skill.
    pub fn ability(&self) -> Ability {
        match self {
            Skill::Athletics => Ability::Strength,
            Skill::Acrobatics | Skill::SleightOfHand | Skill::Stealth => Ability::Dexterity,
            Skill::Arcana
            | Skill::History
            | Skill::Investigation
            | Skill::Nature
            | Skill::Religion => Ability::Intelligence,
            Skill::AnimalHandling
            | Skill::Insight
            | Skill::Medicine
            | Skill::Perception
            | Skill::Survival => Ability::Wisdom,
            Skill::Deception | Skill::Intimidation | Skill::Performance | Skill::Persuasion => {
                Ability::Charisma
            }
        }
    }

    /// Key used in stored records and edit field paths.
    pub fn key(&self) -> &'static str {
        match self {
            Skill::Acrobatics => "acrobatics",
            Skill::AnimalHandling => "animalHandling",
            Skill::Arcana => "arcana",
            Skill::Athletics => "athletics",
            Skill::Deception => "deception",
            Skill::History => "history",
            Skill::Insight => "insight",
            Skill::Intimidation => "intimidation",
            Skill::Investigation => "investigation",
            Skill::Medicine => "medicine",
            Skill::Nature => "nature",
            Skill::Perception => "perception",
            Skill::Performance => "performance",
            Skill::Persuasion => "persuasion",
            Skill::Religion => "religion",
            Skill::SleightOfHand => "sleightOfHand",
            Skill::Stealth => "stealth",
            Skill::Survival => "survival",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Skill::Acrobatics => "Acrobatics",
            Skill::AnimalHandling => "Animal Handling",
            Skill::Arcana => "Arcana",
            Skill::Athletics => "Athletics",
            Skill::Deception => "Deception",
            Skill::History => "History",
            Skill::Insight => "Insight",
            Skill::Intimidation => "Intimidation",
            Skill::Investigation => "Investigation",
            Skill::Medicine => "Medicine",
            Skill::Nature => "Nature",
            Skill::Perception => "Perception",
            Skill::Performance => "Performance",
            Skill::Persuasion => "Persuasion",
            Skill::Religion => "Religion",
            Skill::SleightOfHand => "Sleight of Hand",
            Skill::Stealth => "Stealth",
            Skill::Survival => "Survival",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Skill {
    type Err = DomainError;

    /// Accepts `sleightOfHand`, `sleight_of_hand` and `Sleight of Hand`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Skill::ALL
            .into_iter()
            .find(|skill| skill.key().to_ascii_lowercase() == folded)
            .ok_or_else(|| DomainError::parse(format!("Unknown skill: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_ability_mapping() {
        assert_eq!(Skill::Athletics.ability(), Ability::Strength);
        assert_eq!(Skill::Stealth.ability(), Ability::Dexterity);
        assert_eq!(Skill::Arcana.ability(), Ability::Intelligence);
        assert_eq!(Skill::Perception.ability(), Ability::Wisdom);
        assert_eq!(Skill::Persuasion.ability(), Ability::Charisma);
    }

    #[test]
    fn every_ability_governs_some_skill_except_constitution() {
        for ability in Ability::ALL {
            let governed = Skill::ALL.iter().filter(|s| s.ability() == ability).count();
            if ability == Ability::Constitution {
                assert_eq!(governed, 0);
            } else {
                assert!(governed > 0, "{} governs no skill", ability);
            }
        }
    }

    #[test]
    fn skill_parses_from_any_spelling() {
        assert_eq!("sleightOfHand".parse::<Skill>().unwrap(), Skill::SleightOfHand);
        assert_eq!("sleight_of_hand".parse::<Skill>().unwrap(), Skill::SleightOfHand);
        assert_eq!("Animal Handling".parse::<Skill>().unwrap(), Skill::AnimalHandling);
        assert!("juggling".parse::<Skill>().is_err());
    }

    #[test]
    fn ability_parses_name_and_abbreviation() {
        assert_eq!("Dexterity".parse::<Ability>().unwrap(), Ability::Dexterity);
        assert_eq!("wis".parse::<Ability>().unwrap(), Ability::Wisdom);
        assert!("luck".parse::<Ability>().is_err());
    }

    #[test]
    fn serde_uses_record_keys() {
        assert_eq!(
            serde_json::to_string(&Skill::SleightOfHand).unwrap(),
            "\"sleightOfHand\""
        );
        assert_eq!(
            serde_json::to_string(&Ability::Charisma).unwrap(),
            "\"charisma\""
        );
    }
}
