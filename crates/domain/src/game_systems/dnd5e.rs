//! D&D 5th Edition rules.
//!
//! All per-class data lives in the constant tables below; the trait impls
//! only look things up and do arithmetic.

use super::traits::{
    CalculationEngine, CasterType, KnownSpells, SpellcastingClass, SpellcastingSystem,
};
use crate::value_objects::Ability;

/// XP thresholds for each level. Index is level - 1.
const XP_THRESHOLDS: [u32; 20] = [
    0,      // Level 1
    300,    // Level 2
    900,    // Level 3
    2700,   // Level 4
    6500,   // Level 5
    14000,  // Level 6
    23000,  // Level 7
    34000,  // Level 8
    48000,  // Level 9
    64000,  // Level 10
    85000,  // Level 11
    100000, // Level 12
    120000, // Level 13
    140000, // Level 14
    165000, // Level 15
    195000, // Level 16
    225000, // Level 17
    265000, // Level 18
    305000, // Level 19
    355000, // Level 20
];

const SPELLCASTING_CLASSES: &[SpellcastingClass] = &[
    SpellcastingClass {
        class: "bard",
        ability: Ability::Charisma,
        caster_type: CasterType::Full,
        min_level: 1,
    },
    SpellcastingClass {
        class: "cleric",
        ability: Ability::Wisdom,
        caster_type: CasterType::Full,
        min_level: 1,
    },
    SpellcastingClass {
        class: "druid",
        ability: Ability::Wisdom,
        caster_type: CasterType::Full,
        min_level: 1,
    },
    SpellcastingClass {
        class: "sorcerer",
        ability: Ability::Charisma,
        caster_type: CasterType::Full,
        min_level: 1,
    },
    SpellcastingClass {
        class: "wizard",
        ability: Ability::Intelligence,
        caster_type: CasterType::Full,
        min_level: 1,
    },
    SpellcastingClass {
        class: "warlock",
        ability: Ability::Charisma,
        caster_type: CasterType::Pact,
        min_level: 1,
    },
    SpellcastingClass {
        class: "paladin",
        ability: Ability::Charisma,
        caster_type: CasterType::Half,
        min_level: 2,
    },
    SpellcastingClass {
        class: "ranger",
        ability: Ability::Wisdom,
        caster_type: CasterType::Half,
        min_level: 2,
    },
];

/// Full-caster slots by character level (row = level - 1, column = spell level - 1).
const FULL_CASTER_SLOTS: [[u8; 9]; 20] = [
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 2, 1, 1],
];

/// Half-caster slots (paladin, ranger). Nothing at level 1.
const HALF_CASTER_SLOTS: [[u8; 9]; 20] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
];

/// Warlock pact slots as (slot level, count) per character level.
const PACT_SLOTS: [(u8, u8); 20] = [
    (1, 1),
    (1, 2),
    (2, 2),
    (2, 2),
    (3, 2),
    (3, 2),
    (4, 2),
    (4, 2),
    (5, 2),
    (5, 2),
    (5, 3),
    (5, 3),
    (5, 3),
    (5, 3),
    (5, 3),
    (5, 3),
    (5, 4),
    (5, 4),
    (5, 4),
    (5, 4),
];

// Spells known tables (index = level - 1)
const SORCERER_SPELLS_KNOWN: [u8; 20] = [
    2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 12, 13, 13, 14, 14, 15, 15, 15, 15,
];

const WARLOCK_SPELLS_KNOWN: [u8; 20] = [
    2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 11, 11, 12, 12, 13, 13, 14, 14, 15, 15,
];

const RANGER_SPELLS_KNOWN: [u8; 20] = [
    0, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11,
];

/// How a class's repertoire size is derived from its level.
#[derive(Clone, Copy)]
enum KnownSpellsRule {
    Formula(fn(u8) -> u8),
    Table(&'static [u8; 20]),
    All,
}

fn bard_spells_known(level: u8) -> u8 {
    (level + 3).min(24)
}

/// Spellbook: six at first level, two more per level.
fn wizard_spellbook_size(level: u8) -> u8 {
    4 + 2 * level
}

const KNOWN_SPELLS: &[(&str, KnownSpellsRule)] = &[
    ("bard", KnownSpellsRule::Formula(bard_spells_known)),
    ("wizard", KnownSpellsRule::Formula(wizard_spellbook_size)),
    ("sorcerer", KnownSpellsRule::Table(&SORCERER_SPELLS_KNOWN)),
    ("warlock", KnownSpellsRule::Table(&WARLOCK_SPELLS_KNOWN)),
    ("ranger", KnownSpellsRule::Table(&RANGER_SPELLS_KNOWN)),
    ("cleric", KnownSpellsRule::All),
    ("druid", KnownSpellsRule::All),
    ("paladin", KnownSpellsRule::All),
];

/// Row index into a 20-level table.
fn level_index(level: u8) -> usize {
    (level.clamp(1, 20) - 1) as usize
}

fn class_key(class: &str) -> String {
    class.trim().to_ascii_lowercase()
}

/// D&D 5th Edition game system.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dnd5eSystem;

impl Dnd5eSystem {
    pub fn new() -> Self {
        Self
    }
}

impl CalculationEngine for Dnd5eSystem {
    fn ability_modifier(&self, score: i32) -> i32 {
        // Rust's `/` truncates toward zero; the rules round toward -inf.
        (score - 10).div_euclid(2)
    }

    fn proficiency_bonus(&self, level: u8) -> i32 {
        (level as i32 - 1).div_euclid(4) + 2
    }

    fn hit_die(&self, class: &str) -> u8 {
        match class_key(class).as_str() {
            "barbarian" => 12,
            "fighter" | "paladin" | "ranger" => 10,
            "sorcerer" | "wizard" => 6,
            _ => 8,
        }
    }

    fn max_hp(&self, level: u8, class: &str, constitution_modifier: i32) -> i32 {
        let hit_die = self.hit_die(class) as i32;
        // First level takes the full die, later levels the rounded-up average
        let first = hit_die + constitution_modifier;
        let per_level = (hit_die / 2) + 1 + constitution_modifier;
        let later = (level.clamp(1, 20) as i32 - 1) * per_level;
        (first + later).max(1)
    }

    fn xp_for_next_level(&self, level: u8) -> u32 {
        if level >= 20 {
            return XP_THRESHOLDS[19];
        }
        XP_THRESHOLDS[level.max(1) as usize]
    }

    fn level_from_xp(&self, xp: u32) -> u8 {
        XP_THRESHOLDS
            .iter()
            .rposition(|&threshold| xp >= threshold)
            .map(|i| i as u8 + 1)
            .unwrap_or(1)
    }
}

impl SpellcastingSystem for Dnd5eSystem {
    fn spellcasting_class(&self, class: &str) -> Option<SpellcastingClass> {
        let key = class_key(class);
        SPELLCASTING_CLASSES.iter().find(|c| c.class == key).copied()
    }

    fn slot_totals(&self, class: &str, level: u8) -> [u8; 9] {
        let row = level_index(level);
        match self.spellcasting_class(class).map(|c| c.caster_type) {
            Some(CasterType::Full) => FULL_CASTER_SLOTS[row],
            Some(CasterType::Half) => HALF_CASTER_SLOTS[row],
            Some(CasterType::Pact) => {
                let (slot_level, count) = PACT_SLOTS[row];
                let mut totals = [0; 9];
                totals[slot_level as usize - 1] = count;
                totals
            }
            None => [0; 9],
        }
    }

    fn cantrips_known(&self, class: &str, level: u8) -> u8 {
        let tier = match level {
            0..=3 => 0,
            4..=9 => 1,
            _ => 2,
        };
        let base = match class_key(class).as_str() {
            "sorcerer" => 4,
            "cleric" | "wizard" => 3,
            "bard" | "druid" | "warlock" => 2,
            _ => return 0,
        };
        base + tier
    }

    fn known_spells(&self, class: &str, level: u8) -> Option<KnownSpells> {
        let key = class_key(class);
        let level = level.clamp(1, 20);
        let (_, rule) = KNOWN_SPELLS.iter().find(|(c, _)| *c == key)?;
        Some(match rule {
            KnownSpellsRule::Formula(f) => KnownSpells::Count(f(level)),
            KnownSpellsRule::Table(table) => KnownSpells::Count(table[level_index(level)]),
            KnownSpellsRule::All => KnownSpells::All,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ability_modifier_calculation() {
        let system = Dnd5eSystem::new();
        assert_eq!(system.ability_modifier(1), -5);
        assert_eq!(system.ability_modifier(8), -1);
        assert_eq!(system.ability_modifier(9), -1);
        assert_eq!(system.ability_modifier(10), 0);
        assert_eq!(system.ability_modifier(11), 0);
        assert_eq!(system.ability_modifier(16), 3);
        assert_eq!(system.ability_modifier(20), 5);
        assert_eq!(system.ability_modifier(30), 10);
    }

    #[test]
    fn ability_modifier_is_floor_for_any_score() {
        let system = Dnd5eSystem::new();
        for score in -40..=60 {
            let expected = ((score - 10) as f64 / 2.0).floor() as i32;
            assert_eq!(system.ability_modifier(score), expected, "score {}", score);
        }
        assert_eq!(system.ability_modifier(35), 12);
        assert_eq!(system.ability_modifier(0), -5);
        assert_eq!(system.ability_modifier(-1), -6);
    }

    #[test]
    fn proficiency_bonus_progression() {
        let system = Dnd5eSystem::new();
        assert_eq!(system.proficiency_bonus(1), 2);
        assert_eq!(system.proficiency_bonus(4), 2);
        assert_eq!(system.proficiency_bonus(5), 3);
        assert_eq!(system.proficiency_bonus(9), 4);
        assert_eq!(system.proficiency_bonus(13), 5);
        assert_eq!(system.proficiency_bonus(17), 6);
        assert_eq!(system.proficiency_bonus(20), 6);

        let mut previous = 0;
        for level in 1..=20 {
            let bonus = system.proficiency_bonus(level);
            assert!(bonus >= previous);
            previous = bonus;
        }
    }

    #[test]
    fn hit_die_by_class() {
        let system = Dnd5eSystem::new();
        assert_eq!(system.hit_die("barbarian"), 12);
        assert_eq!(system.hit_die("Fighter"), 10);
        assert_eq!(system.hit_die("cleric"), 8);
        assert_eq!(system.hit_die("wizard"), 6);
        assert_eq!(system.hit_die("unknown"), 8);
    }

    #[test]
    fn max_hp_calculation() {
        let system = Dnd5eSystem::new();
        // Level 1 fighter, +2 CON: 10 + 2
        assert_eq!(system.max_hp(1, "fighter", 2), 12);
        // Level 5 fighter, +2 CON: 12 + 4 * (6 + 2)
        assert_eq!(system.max_hp(5, "fighter", 2), 44);
        // Never below 1
        assert_eq!(system.max_hp(1, "wizard", -6), 1);
    }

    #[test]
    fn xp_progression() {
        let system = Dnd5eSystem::new();
        assert_eq!(system.xp_for_next_level(1), 300);
        assert_eq!(system.xp_for_next_level(5), 14000);
        assert_eq!(system.xp_for_next_level(20), 355000);

        assert_eq!(system.level_from_xp(0), 1);
        assert_eq!(system.level_from_xp(299), 1);
        assert_eq!(system.level_from_xp(300), 2);
        assert_eq!(system.level_from_xp(6500), 5);
        assert_eq!(system.level_from_xp(500000), 20);
    }

    #[test]
    fn spellcasting_table_lookup() {
        let system = Dnd5eSystem::new();
        let wizard = system.spellcasting_class("Wizard").unwrap();
        assert_eq!(wizard.ability, Ability::Intelligence);
        assert_eq!(wizard.min_level, 1);

        let paladin = system.spellcasting_class("paladin").unwrap();
        assert_eq!(paladin.caster_type, CasterType::Half);
        assert_eq!(paladin.min_level, 2);

        assert!(system.spellcasting_class("fighter").is_none());
        assert!(system.spellcasting_class("").is_none());
    }

    #[test]
    fn full_caster_slots() {
        let system = Dnd5eSystem::new();
        assert_eq!(system.slot_totals("wizard", 1), [2, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(system.slot_totals("cleric", 5), [4, 3, 2, 0, 0, 0, 0, 0, 0]);
        assert_eq!(system.slot_totals("bard", 20), [4, 3, 3, 3, 3, 2, 2, 1, 1]);
    }

    #[test]
    fn half_caster_slots() {
        let system = Dnd5eSystem::new();
        assert_eq!(system.slot_totals("paladin", 1), [0; 9]);
        assert_eq!(system.slot_totals("paladin", 2), [2, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(system.slot_totals("ranger", 5), [4, 2, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(system.slot_totals("ranger", 20), [4, 3, 3, 3, 2, 0, 0, 0, 0]);
    }

    #[test]
    fn slot_tables_never_shrink_with_level() {
        for table in [&FULL_CASTER_SLOTS, &HALF_CASTER_SLOTS] {
            for pair in table.windows(2) {
                for spell_level in 0..9 {
                    assert!(pair[1][spell_level] >= pair[0][spell_level]);
                }
            }
        }
    }

    #[test]
    fn warlock_pact_slots() {
        let system = Dnd5eSystem::new();
        assert_eq!(system.slot_totals("warlock", 1)[0], 1);
        assert_eq!(system.slot_totals("warlock", 5), [0, 0, 2, 0, 0, 0, 0, 0, 0]);
        assert_eq!(system.slot_totals("warlock", 11)[4], 3);
    }

    #[test]
    fn non_caster_has_no_slots() {
        let system = Dnd5eSystem::new();
        for level in 1..=20 {
            assert_eq!(system.slot_totals("fighter", level), [0; 9]);
            assert_eq!(system.slot_totals("barbarian", level), [0; 9]);
        }
    }

    #[test]
    fn cantrips_known() {
        let system = Dnd5eSystem::new();
        assert_eq!(system.cantrips_known("wizard", 1), 3);
        assert_eq!(system.cantrips_known("wizard", 4), 4);
        assert_eq!(system.cantrips_known("wizard", 10), 5);
        assert_eq!(system.cantrips_known("sorcerer", 1), 4);
        assert_eq!(system.cantrips_known("druid", 1), 2);
        assert_eq!(system.cantrips_known("druid", 4), 3);
        assert_eq!(system.cantrips_known("druid", 10), 4);
        assert_eq!(system.cantrips_known("paladin", 10), 0);
    }

    #[test]
    fn known_spells_by_class() {
        let system = Dnd5eSystem::new();
        assert_eq!(system.known_spells("bard", 1), Some(KnownSpells::Count(4)));
        assert_eq!(system.known_spells("bard", 20), Some(KnownSpells::Count(23)));
        assert_eq!(system.known_spells("sorcerer", 5), Some(KnownSpells::Count(6)));
        assert_eq!(system.known_spells("ranger", 2), Some(KnownSpells::Count(2)));
        assert_eq!(system.known_spells("wizard", 1), Some(KnownSpells::Count(6)));
        assert_eq!(system.known_spells("cleric", 7), Some(KnownSpells::All));
        assert_eq!(system.known_spells("fighter", 7), None);
    }
}
