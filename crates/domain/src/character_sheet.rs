//! Derived statistics for a character sheet.
//!
//! [`CharacterSheetEngine`] turns a character's raw fields into every number
//! the sheet displays. It is stateless: every call borrows a record and, where
//! it changes anything, returns a new copy.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entities::{Character, SpellSlot, SpellSlots, SPELL_SLOT_LEVELS};
use crate::error::ValidationError;
use crate::game_systems::{CalculationEngine, Dnd5eSystem, KnownSpells, SpellcastingSystem};
use crate::value_objects::{Ability, Skill};

/// Lowest and highest character level the rules define.
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 20;

/// Everything the renderer shows that is not a raw field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetView {
    pub proficiency_bonus: i32,
    pub ability_modifiers: BTreeMap<Ability, i32>,
    pub saving_throws: BTreeMap<Ability, i32>,
    pub skills: BTreeMap<Skill, i32>,
    pub passive_skills: BTreeMap<Skill, i32>,
    pub initiative: i32,
    pub is_spellcaster: bool,
    pub spellcasting_ability: Option<Ability>,
    pub spell_attack_bonus: i32,
    #[serde(rename = "spellSaveDC")]
    pub spell_save_dc: i32,
    pub spell_slots: SpellSlots,
    pub cantrips_known: u8,
    pub known_spells: Option<KnownSpells>,
    pub hit_die: u8,
    pub suggested_max_hp: i32,
    pub xp_for_next_level: u32,
    pub level_from_xp: u8,
    pub carried_weight: f64,
}

/// Pure derived-stat computation over a rule system.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterSheetEngine<R = Dnd5eSystem> {
    rules: R,
}

impl CharacterSheetEngine<Dnd5eSystem> {
    pub fn new() -> Self {
        Self {
            rules: Dnd5eSystem::new(),
        }
    }
}

impl<R> CharacterSheetEngine<R>
where
    R: CalculationEngine + SpellcastingSystem,
{
    pub fn with_rules(rules: R) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// floor((score - 10) / 2), for any integer score.
    pub fn ability_modifier(&self, score: i32) -> i32 {
        self.rules.ability_modifier(score)
    }

    pub fn proficiency_bonus(&self, level: u8) -> i32 {
        self.rules.proficiency_bonus(level)
    }

    /// Proficiency bonus for the character's level, clamped to 1-20.
    fn character_proficiency(&self, character: &Character) -> i32 {
        self.proficiency_bonus(character.level.clamp(MIN_LEVEL, MAX_LEVEL))
    }

    fn modifier_of(&self, character: &Character, ability: Ability) -> i32 {
        self.ability_modifier(character.abilities.get(ability))
    }

    /// Ability modifier plus proficiency once if proficient and again with expertise.
    pub fn skill_modifier(&self, character: &Character, skill: Skill) -> i32 {
        let training = character.skill(skill);
        let proficiency = self.character_proficiency(character);
        let mut modifier = self.modifier_of(character, skill.ability());
        if training.proficient {
            modifier += proficiency;
        }
        if training.expertise {
            modifier += proficiency;
        }
        modifier
    }

    pub fn passive_skill(&self, character: &Character, skill: Skill) -> i32 {
        10 + self.skill_modifier(character, skill)
    }

    pub fn saving_throw_modifier(&self, character: &Character, ability: Ability) -> i32 {
        let modifier = self.modifier_of(character, ability);
        if character.is_save_proficient(ability) {
            modifier + self.character_proficiency(character)
        } else {
            modifier
        }
    }

    pub fn initiative(&self, character: &Character) -> i32 {
        self.modifier_of(character, Ability::Dexterity)
    }

    /// True when the class is in the spellcasting table and the character
    /// has reached the class's first casting level.
    pub fn is_spellcaster(&self, character: &Character) -> bool {
        self.rules
            .spellcasting_class(&character.class)
            .map(|row| character.level >= row.min_level)
            .unwrap_or(false)
    }

    /// Governing ability, or `None` for non-casters.
    pub fn spellcasting_ability(&self, character: &Character) -> Option<Ability> {
        if !self.is_spellcaster(character) {
            return None;
        }
        self.rules
            .spellcasting_class(&character.class)
            .map(|row| row.ability)
    }

    pub fn spell_attack_bonus(&self, character: &Character) -> i32 {
        match self.spellcasting_ability(character) {
            Some(ability) => {
                self.character_proficiency(character) + self.modifier_of(character, ability)
            }
            None => 0,
        }
    }

    pub fn spell_save_dc(&self, character: &Character) -> i32 {
        match self.spellcasting_ability(character) {
            Some(_) => 8 + self.spell_attack_bonus(character),
            None => 0,
        }
    }

    /// Slot totals for the class and level; `used` is carried over from the
    /// record unchanged, even when it now exceeds the new total.
    pub fn spell_slots(&self, character: &Character) -> SpellSlots {
        let totals = self.rules.slot_totals(&character.class, character.level);
        SPELL_SLOT_LEVELS
            .map(|level| {
                let used = character
                    .spellcasting
                    .slots
                    .get(&level)
                    .map(|slot| slot.used)
                    .unwrap_or(0);
                let total = totals[(level - 1) as usize];
                (level, SpellSlot { total, used })
            })
            .collect()
    }

    pub fn known_spells_count(&self, character: &Character) -> Option<KnownSpells> {
        if !self.is_spellcaster(character) {
            return None;
        }
        self.rules.known_spells(&character.class, character.level)
    }

    pub fn cantrips_known(&self, character: &Character) -> u8 {
        self.rules.cantrips_known(&character.class, character.level)
    }

    /// Copy of the character with passive skills and, for spellcasters, the
    /// spellcasting block recomputed. Idempotent.
    pub fn recompute_derived(&self, character: &Character) -> Character {
        let mut next = character.clone();
        next.passive_skills = Skill::ALL
            .into_iter()
            .map(|skill| (skill, self.passive_skill(character, skill)))
            .collect();

        if self.is_spellcaster(character) {
            next.spellcasting.ability = self.spellcasting_ability(character);
            next.spellcasting.spell_attack = self.spell_attack_bonus(character);
            next.spellcasting.spell_save_dc = self.spell_save_dc(character);
            next.spellcasting.slots = self.spell_slots(character);
        }
        next
    }

    /// Full derived view model for rendering.
    pub fn derive_sheet(&self, character: &Character) -> SheetView {
        let level = character.level.clamp(MIN_LEVEL, MAX_LEVEL);
        let constitution = self.modifier_of(character, Ability::Constitution);

        SheetView {
            proficiency_bonus: self.proficiency_bonus(level),
            ability_modifiers: Ability::ALL
                .into_iter()
                .map(|a| (a, self.modifier_of(character, a)))
                .collect(),
            saving_throws: Ability::ALL
                .into_iter()
                .map(|a| (a, self.saving_throw_modifier(character, a)))
                .collect(),
            skills: Skill::ALL
                .into_iter()
                .map(|s| (s, self.skill_modifier(character, s)))
                .collect(),
            passive_skills: Skill::ALL
                .into_iter()
                .map(|s| (s, self.passive_skill(character, s)))
                .collect(),
            initiative: self.initiative(character),
            is_spellcaster: self.is_spellcaster(character),
            spellcasting_ability: self.spellcasting_ability(character),
            spell_attack_bonus: self.spell_attack_bonus(character),
            spell_save_dc: self.spell_save_dc(character),
            spell_slots: self.spell_slots(character),
            cantrips_known: self.cantrips_known(character),
            known_spells: self.known_spells_count(character),
            hit_die: self.rules.hit_die(&character.class),
            suggested_max_hp: self.rules.max_hp(level, &character.class, constitution),
            xp_for_next_level: self.rules.xp_for_next_level(level),
            level_from_xp: self.rules.level_from_xp(character.experience),
            carried_weight: character.carried_weight(),
        }
    }

    /// Spend one slot of `spell_level`. Rejected when none are left.
    pub fn expend_slot(
        &self,
        character: &Character,
        spell_level: u8,
    ) -> Result<Character, ValidationError> {
        let field = slot_field(spell_level)?;
        let current = self.spell_slots(character);
        let slot = current.get(&spell_level).copied().unwrap_or_default();
        if slot.available() == 0 {
            return Err(ValidationError::new(
                field,
                format!("no level {} slots remaining", spell_level),
            ));
        }

        let mut next = character.clone();
        next.spellcasting.slots = current;
        if let Some(entry) = next.spellcasting.slots.get_mut(&spell_level) {
            entry.used += 1;
        }
        Ok(next)
    }

    /// Give back one slot of `spell_level`; a no-op when none are used.
    pub fn restore_slot(
        &self,
        character: &Character,
        spell_level: u8,
    ) -> Result<Character, ValidationError> {
        slot_field(spell_level)?;
        let mut next = character.clone();
        if let Some(entry) = next.spellcasting.slots.get_mut(&spell_level) {
            entry.used = entry.used.saturating_sub(1);
        }
        Ok(next)
    }

    pub fn restore_all_slots(&self, character: &Character) -> Character {
        let mut next = character.clone();
        for slot in next.spellcasting.slots.values_mut() {
            slot.used = 0;
        }
        next
    }
}

fn slot_field(spell_level: u8) -> Result<String, ValidationError> {
    let field = format!("spellcasting.slots.{}", spell_level);
    if SPELL_SLOT_LEVELS.contains(&spell_level) {
        Ok(field)
    } else {
        Err(ValidationError::out_of_range(field, 1, Some(9)))
    }
}

/// [`CharacterSheetEngine::recompute_derived`] with the default rules.
pub fn recompute_derived(character: &Character) -> Character {
    CharacterSheetEngine::new().recompute_derived(character)
}

/// [`CharacterSheetEngine::derive_sheet`] with the default rules.
pub fn derive_sheet(character: &Character) -> SheetView {
    CharacterSheetEngine::new().derive_sheet(character)
}
