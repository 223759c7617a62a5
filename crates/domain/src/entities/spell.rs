//! Spell reference data and catalog filtering.
//!
//! Spells are read-only to this system; they arrive already parsed from the
//! bundled catalog or the remote store.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A spell from the reference catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub id: String,
    pub name: String,
    /// 0 for cantrips, otherwise 1-9
    pub level: u8,
    pub school: String,
    /// Class ids that can learn this spell
    #[serde(default)]
    pub classes: BTreeSet<String>,
    pub casting_time: String,
    pub range: String,
    /// e.g. "V, S, M"
    pub components: String,
    #[serde(default)]
    pub material: Option<String>,
    pub duration: String,
    pub description: String,
    #[serde(default)]
    pub at_higher_levels: Option<String>,
    #[serde(default)]
    pub concentration: bool,
    #[serde(default)]
    pub ritual: bool,
}

impl Spell {
    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }

    pub fn is_available_to(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c.eq_ignore_ascii_case(class))
    }

    /// Short label such as "3rd-level evocation" or "Evocation cantrip".
    pub fn level_label(&self) -> String {
        if self.is_cantrip() {
            return format!("{} cantrip", self.school);
        }
        let suffix = match self.level {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        };
        format!(
            "{}{}-level {}",
            self.level,
            suffix,
            self.school.to_lowercase()
        )
    }
}

/// Filter criteria for spell catalog queries. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellFilter {
    pub level: Option<u8>,
    pub class: Option<String>,
    pub school: Option<String>,
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
}

impl SpellFilter {
    pub fn matches(&self, spell: &Spell) -> bool {
        if let Some(level) = self.level {
            if spell.level != level {
                return false;
            }
        }

        if let Some(ref class) = self.class {
            if !spell.is_available_to(class) {
                return false;
            }
        }

        if let Some(ref school) = self.school {
            if !spell.school.eq_ignore_ascii_case(school) {
                return false;
            }
        }

        if let Some(ref search) = self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty()
                && !spell.name.to_lowercase().contains(&needle)
                && !spell.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        true
    }

    /// Apply the filter and order the matches by level, then name.
    pub fn apply<'a>(&self, spells: impl IntoIterator<Item = &'a Spell>) -> Vec<Spell> {
        let mut matched: Vec<Spell> = spells
            .into_iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.name.cmp(&b.name)));
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spell(id: &str, level: u8, school: &str, classes: &[&str], description: &str) -> Spell {
        Spell {
            id: id.to_string(),
            name: id.replace('-', " "),
            level,
            school: school.to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            casting_time: "1 action".to_string(),
            range: "60 feet".to_string(),
            components: "V, S".to_string(),
            material: None,
            duration: "Instantaneous".to_string(),
            description: description.to_string(),
            at_higher_levels: None,
            concentration: false,
            ritual: false,
        }
    }

    fn sample() -> Vec<Spell> {
        vec![
            spell("fireball", 3, "Evocation", &["wizard", "sorcerer"], "A bright streak"),
            spell("cure-wounds", 1, "Evocation", &["cleric", "bard"], "Heals a creature"),
            spell("fire-bolt", 0, "Evocation", &["wizard"], "A mote of fire"),
            spell("detect-magic", 1, "Divination", &["wizard", "cleric"], "Sense magic"),
        ]
    }

    #[test]
    fn empty_filter_matches_everything_sorted() {
        let spells = sample();
        let result = SpellFilter::default().apply(&spells);
        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["fire-bolt", "cure-wounds", "detect-magic", "fireball"]);
    }

    #[test]
    fn filters_combine() {
        let spells = sample();
        let filter = SpellFilter {
            level: Some(1),
            class: Some("Cleric".to_string()),
            school: Some("divination".to_string()),
            search: None,
        };
        let result = filter.apply(&spells);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "detect-magic");
    }

    #[test]
    fn search_checks_name_and_description() {
        let spells = sample();
        let filter = SpellFilter {
            search: Some("FIRE".to_string()),
            ..Default::default()
        };
        let ids: Vec<String> = filter.apply(&spells).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["fire-bolt", "fireball"]);

        let by_description = SpellFilter {
            search: Some("heals".to_string()),
            ..Default::default()
        };
        assert_eq!(by_description.apply(&spells)[0].id, "cure-wounds");
    }

    #[test]
    fn level_label_formats() {
        let spells = sample();
        assert_eq!(spells[0].level_label(), "3rd-level evocation");
        assert_eq!(spells[2].level_label(), "Evocation cantrip");
    }
}
