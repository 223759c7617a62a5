//! `charsheet` command-line front end.
//!
//! Commands return their output as a string so the binary only prints.

use std::fmt::Write as _;

use anyhow::Context;
use charsheet_domain::{Ability, Character, CharacterId, DiceRollResult, Skill, Spell, SpellFilter};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::app::App;
use crate::use_cases::{CharacterSheet, NewCharacter};

#[derive(Debug, Parser)]
#[command(name = "charsheet")]
#[command(about = "Tabletop character sheet manager", version)]
pub struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List characters, most recently updated first
    List,
    /// Show a character with derived statistics
    Show { id: String },
    /// Create a character
    Create {
        name: String,
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        race: Option<String>,
        #[arg(long)]
        background: Option<String>,
        #[arg(long)]
        level: Option<u8>,
    },
    /// Edit one field, e.g. `set <id> abilities.dexterity 16`
    Set {
        id: String,
        /// Dotted field path
        field: String,
        /// JSON value; bare words are taken as strings
        value: String,
    },
    /// Delete a character
    Delete { id: String },
    /// Search the spell catalog
    Spells {
        #[arg(long)]
        level: Option<u8>,
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        school: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one spell
    Spell { id: String },
    /// Roll a dice formula such as 2d6+3
    Roll { formula: String },
    /// Spend or recover spell slots
    Slot {
        id: String,
        #[arg(value_enum)]
        action: SlotAction,
        /// Slot level 1-9; not used by restore-all
        level: Option<u8>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SlotAction {
    Expend,
    Restore,
    RestoreAll,
}

fn to_json(value: &impl Serialize) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Parse a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// Execute one command against `app`.
pub async fn run(app: &App, cli: Cli) -> anyhow::Result<String> {
    let json = cli.json;
    let characters = &app.use_cases.character_sheet;

    match cli.command {
        Command::List => {
            let list = characters.list().await?;
            if json {
                return to_json(&list);
            }
            Ok(render_list(&list))
        }
        Command::Show { id } => {
            let sheet = characters.get(&CharacterId::from(id)).await?;
            if json {
                return to_json(&sheet);
            }
            Ok(render_sheet(&sheet))
        }
        Command::Create {
            name,
            class,
            race,
            background,
            level,
        } => {
            let sheet = characters
                .create(NewCharacter {
                    name,
                    class,
                    race,
                    background,
                    level,
                })
                .await?;
            if json {
                return to_json(&sheet);
            }
            Ok(format!("Created {}\n{}", sheet.character.id, render_sheet(&sheet)))
        }
        Command::Set { id, field, value } => {
            let sheet = characters
                .edit_field(&CharacterId::from(id), &field, &parse_value(&value))
                .await?;
            if json {
                return to_json(&sheet);
            }
            Ok(render_sheet(&sheet))
        }
        Command::Delete { id } => {
            let id = CharacterId::from(id);
            characters.delete(&id).await?;
            Ok(format!("Deleted {id}"))
        }
        Command::Spells {
            level,
            class,
            school,
            search,
        } => {
            let filter = SpellFilter {
                level,
                class,
                school,
                search,
            };
            let spells = app.use_cases.spells.search(&filter).await?;
            if json {
                return to_json(&spells);
            }
            Ok(render_spell_list(&spells))
        }
        Command::Spell { id } => {
            let spell = app.use_cases.spells.get(&id).await?;
            if json {
                return to_json(&spell);
            }
            Ok(render_spell(&spell))
        }
        Command::Roll { formula } => {
            let result = app.use_cases.dice.roll(&formula)?;
            if json {
                return to_json(&result);
            }
            Ok(render_roll(&result))
        }
        Command::Slot { id, action, level } => {
            let id = CharacterId::from(id);
            let sheet = match action {
                SlotAction::Expend => {
                    let level = level.context("slot level required")?;
                    characters.expend_slot(&id, level).await?
                }
                SlotAction::Restore => {
                    let level = level.context("slot level required")?;
                    characters.restore_slot(&id, level).await?
                }
                SlotAction::RestoreAll => characters.restore_all_slots(&id).await?,
            };
            if json {
                return to_json(&sheet.character.spellcasting.slots);
            }
            Ok(render_slots(&sheet))
        }
    }
}

// =============================================================================
// Text rendering
// =============================================================================

fn describe(character: &Character) -> String {
    let mut parts = vec![format!("Level {}", character.level)];
    if !character.race.is_empty() {
        parts.push(character.race.clone());
    }
    if !character.class.is_empty() {
        parts.push(character.class.clone());
    }
    parts.join(" ")
}

fn render_list(characters: &[Character]) -> String {
    if characters.is_empty() {
        return "No characters.".to_string();
    }
    characters
        .iter()
        .map(|c| format!("{}  {}  ({})", c.id, c.name, describe(c)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn ordinal(level: u8) -> String {
    let suffix = match level {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{level}{suffix}")
}

fn render_slots(sheet: &CharacterSheet) -> String {
    let slots: Vec<String> = sheet
        .character
        .spellcasting
        .slots
        .iter()
        .filter(|(_, slot)| slot.total > 0)
        .map(|(level, slot)| format!("{} {}/{}", ordinal(*level), slot.available(), slot.total))
        .collect();
    if slots.is_empty() {
        return "Slots: none".to_string();
    }
    format!("Slots: {}", slots.join(", "))
}

fn render_sheet(sheet: &CharacterSheet) -> String {
    let c = &sheet.character;
    let view = &sheet.sheet;
    let mut out = String::new();

    let _ = writeln!(out, "{} - {}", c.name, describe(c));
    let _ = writeln!(
        out,
        "HP {}/{} (+{} temp)  AC {}  Speed {}  Initiative {:+}",
        c.combat.current_hp,
        c.combat.max_hp,
        c.combat.temporary_hp,
        c.combat.armor_class,
        c.combat.speed,
        view.initiative
    );
    let _ = writeln!(out, "Proficiency {:+}", view.proficiency_bonus);

    let abilities: Vec<String> = Ability::ALL
        .iter()
        .map(|a| {
            let modifier = view.ability_modifiers.get(a).copied().unwrap_or_default();
            format!("{} {} ({:+})", a.abbreviation(), c.abilities.get(*a), modifier)
        })
        .collect();
    let _ = writeln!(out, "{}", abilities.join("  "));

    let saves: Vec<String> = Ability::ALL
        .iter()
        .map(|a| {
            let modifier = view.saving_throws.get(a).copied().unwrap_or_default();
            format!("{} {:+}", a.abbreviation(), modifier)
        })
        .collect();
    let _ = writeln!(out, "Saves: {}", saves.join(", "));

    let skills: Vec<String> = Skill::ALL
        .iter()
        .map(|s| {
            let modifier = view.skills.get(s).copied().unwrap_or_default();
            format!("{} {:+}", s.display_name(), modifier)
        })
        .collect();
    let _ = writeln!(out, "Skills: {}", skills.join(", "));
    let _ = writeln!(
        out,
        "Passive Perception {}",
        view.passive_skills
            .get(&Skill::Perception)
            .copied()
            .unwrap_or_default()
    );

    if view.is_spellcaster {
        let ability = view
            .spellcasting_ability
            .map(|a| a.key())
            .unwrap_or("none");
        let _ = writeln!(
            out,
            "Spellcasting: {}, attack {:+}, DC {}",
            ability, view.spell_attack_bonus, view.spell_save_dc
        );
        let known = view
            .known_spells
            .map(|k| k.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "Cantrips {}  Spells known {}",
            view.cantrips_known, known
        );
        let _ = writeln!(out, "{}", render_slots(sheet));
    }

    let _ = write!(
        out,
        "XP {} (next level at {})  Carrying {} lb",
        c.experience, view.xp_for_next_level, view.carried_weight
    );
    out
}

fn render_spell_list(spells: &[Spell]) -> String {
    if spells.is_empty() {
        return "No spells match.".to_string();
    }
    spells
        .iter()
        .map(|s| format!("{:<24} {:<28} {}", s.name, s.level_label(), s.id))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_spell(spell: &Spell) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", spell.name);
    let _ = writeln!(out, "{}", spell.level_label());
    let _ = writeln!(out, "Casting Time: {}", spell.casting_time);
    let _ = writeln!(out, "Range: {}", spell.range);
    match &spell.material {
        Some(material) => {
            let _ = writeln!(out, "Components: {} ({})", spell.components, material);
        }
        None => {
            let _ = writeln!(out, "Components: {}", spell.components);
        }
    }
    let _ = writeln!(out, "Duration: {}", spell.duration);
    let mut tags = Vec::new();
    if spell.concentration {
        tags.push("concentration");
    }
    if spell.ritual {
        tags.push("ritual");
    }
    if !tags.is_empty() {
        let _ = writeln!(out, "Tags: {}", tags.join(", "));
    }
    let _ = write!(out, "\n{}", spell.description);
    if let Some(higher) = &spell.at_higher_levels {
        let _ = write!(out, "\n\nAt Higher Levels. {}", higher);
    }
    out
}

fn render_roll(result: &DiceRollResult) -> String {
    let mut line = result.breakdown();
    if result.is_natural_20() {
        line.push_str("  (natural 20)");
    } else if result.is_natural_1() {
        line.push_str("  (natural 1)");
    }
    line
}
