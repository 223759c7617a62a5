//! Reference catalog entries: races, classes, subclasses and backgrounds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::{Ability, Skill};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceEntry {
    pub id: String,
    pub name: String,
    #[serde(default = "default_speed")]
    pub speed: i32,
    #[serde(default)]
    pub ability_bonuses: BTreeMap<Ability, i32>,
    #[serde(default)]
    pub languages: Vec<String>,
}

fn default_speed() -> i32 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassEntry {
    pub id: String,
    pub name: String,
    pub hit_die: u8,
    #[serde(default)]
    pub saving_throws: Vec<Ability>,
    #[serde(default)]
    pub spellcasting_ability: Option<Ability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubclassEntry {
    pub id: String,
    pub name: String,
    pub class_id: String,
    /// Level at which the subclass is chosen.
    pub min_level: u8,
}

impl SubclassEntry {
    pub fn is_available(&self, class_id: &str, level: u8) -> bool {
        self.class_id.eq_ignore_ascii_case(class_id) && self.min_level <= level
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub skill_proficiencies: Vec<Skill>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subclass_availability_respects_class_and_level() {
        let oath = SubclassEntry {
            id: "devotion".to_string(),
            name: "Oath of Devotion".to_string(),
            class_id: "paladin".to_string(),
            min_level: 3,
        };
        assert!(!oath.is_available("paladin", 2));
        assert!(oath.is_available("Paladin", 3));
        assert!(!oath.is_available("cleric", 20));
    }

    #[test]
    fn race_entry_defaults_speed() {
        let race: RaceEntry = serde_json::from_value(serde_json::json!({
            "id": "elf",
            "name": "Elf",
            "abilityBonuses": { "dexterity": 2 }
        }))
        .unwrap();
        assert_eq!(race.speed, 30);
        assert_eq!(race.ability_bonuses.get(&Ability::Dexterity), Some(&2));
    }
}
