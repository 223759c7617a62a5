//! Edit validation and normalisation.
//!
//! The form layer sends `(field path, JSON value)` pairs. They are parsed into
//! a typed [`CharacterEdit`], range-checked, applied to a copy of the record,
//! normalised, and the derived fields are recomputed. Nothing is mutated in
//! place; a rejected edit leaves the caller's record untouched.

use serde_json::Value;

use crate::character_sheet::{recompute_derived, MAX_LEVEL, MIN_LEVEL};
use crate::entities::{Character, EquipmentItem, ProficiencyKind};
use crate::error::ValidationError;
use crate::value_objects::{Ability, DiceFormula, Skill};

/// Highest value a death-save counter can hold.
pub const MAX_DEATH_SAVES: u8 = 3;

/// Free-text identity traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Name,
    Race,
    Class,
    Subclass,
    Background,
    Alignment,
    Gender,
}

impl IdentityField {
    fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Race => "race",
            Self::Class => "class",
            Self::Subclass => "subclass",
            Self::Background => "background",
            Self::Alignment => "alignment",
            Self::Gender => "gender",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        [
            Self::Name,
            Self::Race,
            Self::Class,
            Self::Subclass,
            Self::Background,
            Self::Alignment,
            Self::Gender,
        ]
        .into_iter()
        .find(|f| f.key() == key)
    }
}

/// One edit to a raw character field. Numeric payloads are carried as `i64`
/// so range checks see exactly what the form sent.
#[derive(Debug, Clone, PartialEq)]
pub enum CharacterEdit {
    Identity(IdentityField, String),
    Level(i64),
    Experience(i64),
    AbilityScore(Ability, i64),
    SkillProficient(Skill, bool),
    SkillExpertise(Skill, bool),
    SaveProficient(Ability, bool),
    MaxHp(i64),
    CurrentHp(i64),
    TemporaryHp(i64),
    ArmorClass(i64),
    Speed(i64),
    HitDice(String),
    DeathSaveSuccesses(i64),
    DeathSaveFailures(i64),
    AddEquipment(EquipmentItem),
    RemoveEquipment(usize),
    EquipmentQuantity { index: usize, quantity: i64 },
    AddProficiency(ProficiencyKind, String),
    RemoveProficiency(ProficiencyKind, String),
}

impl CharacterEdit {
    /// Dotted field path used in rejections.
    pub fn field(&self) -> String {
        match self {
            Self::Identity(f, _) => f.key().to_string(),
            Self::Level(_) => "level".to_string(),
            Self::Experience(_) => "experience".to_string(),
            Self::AbilityScore(a, _) => format!("abilities.{}", a.key()),
            Self::SkillProficient(s, _) => format!("skills.{}.proficient", s.key()),
            Self::SkillExpertise(s, _) => format!("skills.{}.expertise", s.key()),
            Self::SaveProficient(a, _) => format!("savingThrows.{}.proficient", a.key()),
            Self::MaxHp(_) => "combat.maxHP".to_string(),
            Self::CurrentHp(_) => "combat.currentHP".to_string(),
            Self::TemporaryHp(_) => "combat.temporaryHP".to_string(),
            Self::ArmorClass(_) => "combat.armorClass".to_string(),
            Self::Speed(_) => "combat.speed".to_string(),
            Self::HitDice(_) => "combat.hitDice".to_string(),
            Self::DeathSaveSuccesses(_) => "combat.deathSaves.successes".to_string(),
            Self::DeathSaveFailures(_) => "combat.deathSaves.failures".to_string(),
            Self::AddEquipment(_) => "equipment.add".to_string(),
            Self::RemoveEquipment(_) => "equipment.remove".to_string(),
            Self::EquipmentQuantity { index, .. } => format!("equipment.{}.quantity", index),
            Self::AddProficiency(k, _) => format!("proficiencies.{}.add", kind_key(*k)),
            Self::RemoveProficiency(k, _) => format!("proficiencies.{}.remove", kind_key(*k)),
        }
    }

    /// Parse a form-layer edit. Unknown paths and wrongly typed values are
    /// shape violations.
    pub fn from_field(field: &str, value: &Value) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = field.split('.').collect();
        let edit = match parts.as_slice() {
            [key] if IdentityField::from_key(key).is_some() => {
                let id = IdentityField::from_key(key).ok_or_else(|| unknown(field))?;
                Self::Identity(id, as_string(field, value)?)
            }
            ["level"] => Self::Level(as_int(field, value)?),
            ["experience"] => Self::Experience(as_int(field, value)?),
            ["abilities", ability] => {
                Self::AbilityScore(parse_ability(field, ability)?, as_int(field, value)?)
            }
            ["skills", skill, "proficient"] => {
                Self::SkillProficient(parse_skill(field, skill)?, as_bool(field, value)?)
            }
            ["skills", skill, "expertise"] => {
                Self::SkillExpertise(parse_skill(field, skill)?, as_bool(field, value)?)
            }
            ["savingThrows", ability, "proficient"] => {
                Self::SaveProficient(parse_ability(field, ability)?, as_bool(field, value)?)
            }
            ["combat", "maxHP"] => Self::MaxHp(as_int(field, value)?),
            ["combat", "currentHP"] => Self::CurrentHp(as_int(field, value)?),
            ["combat", "temporaryHP"] => Self::TemporaryHp(as_int(field, value)?),
            ["combat", "armorClass"] => Self::ArmorClass(as_int(field, value)?),
            ["combat", "speed"] => Self::Speed(as_int(field, value)?),
            ["combat", "hitDice"] => Self::HitDice(as_string(field, value)?),
            ["combat", "deathSaves", "successes"] => {
                Self::DeathSaveSuccesses(as_int(field, value)?)
            }
            ["combat", "deathSaves", "failures"] => Self::DeathSaveFailures(as_int(field, value)?),
            ["equipment", "add"] => {
                let item: EquipmentItem = serde_json::from_value(value.clone()).map_err(|e| {
                    ValidationError::new(field, format!("must be an equipment item: {}", e))
                })?;
                Self::AddEquipment(item)
            }
            ["equipment", "remove"] => Self::RemoveEquipment(as_index(field, value)?),
            ["equipment", index, "quantity"] => Self::EquipmentQuantity {
                index: index
                    .parse()
                    .map_err(|_| ValidationError::new(field, "equipment index must be a number"))?,
                quantity: as_int(field, value)?,
            },
            ["proficiencies", kind, "add"] => {
                Self::AddProficiency(parse_kind(field, kind)?, as_string(field, value)?)
            }
            ["proficiencies", kind, "remove"] => {
                Self::RemoveProficiency(parse_kind(field, kind)?, as_string(field, value)?)
            }
            _ => return Err(unknown(field)),
        };
        Ok(edit)
    }
}

fn kind_key(kind: ProficiencyKind) -> &'static str {
    match kind {
        ProficiencyKind::Languages => "languages",
        ProficiencyKind::Tools => "tools",
        ProficiencyKind::Armor => "armor",
        ProficiencyKind::Weapons => "weapons",
    }
}

fn unknown(field: &str) -> ValidationError {
    ValidationError::new(field, "unknown field")
}

fn as_int(field: &str, value: &Value) -> Result<i64, ValidationError> {
    value
        .as_i64()
        .ok_or_else(|| ValidationError::wrong_type(field, "an integer"))
}

fn as_bool(field: &str, value: &Value) -> Result<bool, ValidationError> {
    value
        .as_bool()
        .ok_or_else(|| ValidationError::wrong_type(field, "a boolean"))
}

fn as_string(field: &str, value: &Value) -> Result<String, ValidationError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ValidationError::wrong_type(field, "a string"))
}

fn as_index(field: &str, value: &Value) -> Result<usize, ValidationError> {
    value
        .as_u64()
        .map(|v| v as usize)
        .ok_or_else(|| ValidationError::wrong_type(field, "a non-negative integer"))
}

fn parse_ability(field: &str, raw: &str) -> Result<Ability, ValidationError> {
    raw.parse()
        .map_err(|_| ValidationError::new(field, format!("unknown ability '{}'", raw)))
}

fn parse_skill(field: &str, raw: &str) -> Result<Skill, ValidationError> {
    raw.parse()
        .map_err(|_| ValidationError::new(field, format!("unknown skill '{}'", raw)))
}

fn parse_kind(field: &str, raw: &str) -> Result<ProficiencyKind, ValidationError> {
    match raw {
        "languages" => Ok(ProficiencyKind::Languages),
        "tools" => Ok(ProficiencyKind::Tools),
        "armor" => Ok(ProficiencyKind::Armor),
        "weapons" => Ok(ProficiencyKind::Weapons),
        _ => Err(ValidationError::new(
            field,
            format!("unknown proficiency set '{}'", raw),
        )),
    }
}

/// Check `value` lies in `min..=max` and narrow it.
fn in_range<T: TryFrom<i64>>(
    field: &str,
    value: i64,
    min: i64,
    max: Option<i64>,
) -> Result<T, ValidationError> {
    let above_max = max.map(|m| value > m).unwrap_or(false);
    if value < min || above_max {
        return Err(ValidationError::out_of_range(field, min, max));
    }
    T::try_from(value).map_err(|_| ValidationError::new(field, "value is too large"))
}

fn non_negative(field: &str, value: i64) -> Result<i32, ValidationError> {
    in_range(field, value, 0, Some(i32::MAX as i64))
        .map_err(|_| ValidationError::out_of_range(field, 0, None))
}

/// Validate one edit and return the updated, normalised, recomputed copy.
pub fn apply_edit(character: &Character, edit: CharacterEdit) -> Result<Character, ValidationError> {
    let mut next = character.clone();
    write_edit(&mut next, edit)?;
    normalize(&mut next);
    Ok(recompute_derived(&next))
}

/// Apply several edits atomically: either all are accepted or none.
pub fn apply_edits(
    character: &Character,
    edits: impl IntoIterator<Item = CharacterEdit>,
) -> Result<Character, ValidationError> {
    let mut next = character.clone();
    for edit in edits {
        write_edit(&mut next, edit)?;
    }
    normalize(&mut next);
    Ok(recompute_derived(&next))
}

fn write_edit(c: &mut Character, edit: CharacterEdit) -> Result<(), ValidationError> {
    let field = edit.field();
    match edit {
        CharacterEdit::Identity(id, text) => {
            let text = text.trim().to_string();
            let target = match id {
                IdentityField::Name => {
                    if text.is_empty() {
                        return Err(ValidationError::new(field, "name is required"));
                    }
                    &mut c.name
                }
                IdentityField::Race => &mut c.race,
                IdentityField::Class => &mut c.class,
                IdentityField::Subclass => &mut c.subclass,
                IdentityField::Background => &mut c.background,
                IdentityField::Alignment => &mut c.alignment,
                IdentityField::Gender => &mut c.gender,
            };
            *target = text;
        }
        CharacterEdit::Level(level) => {
            c.level = in_range(&field, level, MIN_LEVEL as i64, Some(MAX_LEVEL as i64))?;
        }
        CharacterEdit::Experience(xp) => {
            c.experience = in_range(&field, xp, 0, Some(u32::MAX as i64))
                .map_err(|_| ValidationError::out_of_range(&field, 0, None))?;
        }
        CharacterEdit::AbilityScore(ability, score) => {
            // Unconventional scores are accepted; only i32 overflow is a shape error.
            let score = i32::try_from(score)
                .map_err(|_| ValidationError::new(&field, "value is too large"))?;
            c.abilities.set(ability, score);
        }
        CharacterEdit::SkillProficient(skill, proficient) => {
            c.skills.entry(skill).or_default().proficient = proficient;
        }
        CharacterEdit::SkillExpertise(skill, expertise) => {
            c.skills.entry(skill).or_default().expertise = expertise;
        }
        CharacterEdit::SaveProficient(ability, proficient) => {
            c.saving_throws.entry(ability).or_default().proficient = proficient;
        }
        CharacterEdit::MaxHp(hp) => c.combat.max_hp = non_negative(&field, hp)?,
        CharacterEdit::CurrentHp(hp) => c.combat.current_hp = non_negative(&field, hp)?,
        CharacterEdit::TemporaryHp(hp) => c.combat.temporary_hp = non_negative(&field, hp)?,
        CharacterEdit::ArmorClass(ac) => c.combat.armor_class = non_negative(&field, ac)?,
        CharacterEdit::Speed(speed) => c.combat.speed = non_negative(&field, speed)?,
        CharacterEdit::HitDice(dice) => {
            let formula = DiceFormula::parse(&dice)
                .map_err(|e| ValidationError::new(&field, e.to_string()))?;
            c.combat.hit_dice = formula.to_string();
        }
        CharacterEdit::DeathSaveSuccesses(n) => {
            c.combat.death_saves.successes =
                in_range(&field, n, 0, Some(MAX_DEATH_SAVES as i64))?;
        }
        CharacterEdit::DeathSaveFailures(n) => {
            c.combat.death_saves.failures = in_range(&field, n, 0, Some(MAX_DEATH_SAVES as i64))?;
        }
        CharacterEdit::AddEquipment(item) => {
            if item.name.trim().is_empty() {
                return Err(ValidationError::new(field, "item name is required"));
            }
            if !item.weight.is_finite() || item.weight < 0.0 {
                return Err(ValidationError::new(field, "weight must be a non-negative number"));
            }
            c.equipment.push(item);
        }
        CharacterEdit::RemoveEquipment(index) => {
            if index >= c.equipment.len() {
                return Err(ValidationError::new(field, format!("no item at index {}", index)));
            }
            c.equipment.remove(index);
        }
        CharacterEdit::EquipmentQuantity { index, quantity } => {
            let quantity: u32 = in_range(&field, quantity, 0, Some(u32::MAX as i64))?;
            let item = c
                .equipment
                .get_mut(index)
                .ok_or_else(|| ValidationError::new(&field, format!("no item at index {}", index)))?;
            item.quantity = quantity;
        }
        CharacterEdit::AddProficiency(kind, id) => {
            let id = id.trim();
            if id.is_empty() {
                return Err(ValidationError::new(field, "id is required"));
            }
            c.proficiencies.set_mut(kind).insert(id.to_string());
        }
        CharacterEdit::RemoveProficiency(kind, id) => {
            c.proficiencies.set_mut(kind).remove(id.trim());
        }
    }
    Ok(())
}

/// Bring a record back inside its invariants without rejecting it:
/// expertise without proficiency is dropped, counters and level are clamped.
pub fn normalize(character: &mut Character) {
    for training in character.skills.values_mut() {
        if !training.proficient {
            training.expertise = false;
        }
    }
    let saves = &mut character.combat.death_saves;
    saves.successes = saves.successes.min(MAX_DEATH_SAVES);
    saves.failures = saves.failures.min(MAX_DEATH_SAVES);
    character.level = character.level.clamp(MIN_LEVEL, MAX_LEVEL);
}

/// Full-record check for records accepted from outside the edit path
/// (imports, account sync). Rejects rather than normalises.
///
/// `currentHP` is allowed to be negative here; only the edit path forbids it.
pub fn validate_character(character: &Character) -> Result<(), ValidationError> {
    if character.name.trim().is_empty() {
        return Err(ValidationError::new("name", "name is required"));
    }
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&character.level) {
        return Err(ValidationError::out_of_range(
            "level",
            MIN_LEVEL as i64,
            Some(MAX_LEVEL as i64),
        ));
    }
    if character.combat.max_hp < 0 {
        return Err(ValidationError::out_of_range("combat.maxHP", 0, None));
    }
    if character.combat.temporary_hp < 0 {
        return Err(ValidationError::out_of_range("combat.temporaryHP", 0, None));
    }
    let saves = character.combat.death_saves;
    if saves.successes > MAX_DEATH_SAVES {
        return Err(ValidationError::out_of_range(
            "combat.deathSaves.successes",
            0,
            Some(MAX_DEATH_SAVES as i64),
        ));
    }
    if saves.failures > MAX_DEATH_SAVES {
        return Err(ValidationError::out_of_range(
            "combat.deathSaves.failures",
            0,
            Some(MAX_DEATH_SAVES as i64),
        ));
    }
    if let Some((skill, _)) = character
        .skills
        .iter()
        .find(|(_, t)| t.expertise && !t.proficient)
    {
        return Err(ValidationError::new(
            format!("skills.{}.expertise", skill.key()),
            "expertise requires proficiency",
        ));
    }
    Ok(())
}
