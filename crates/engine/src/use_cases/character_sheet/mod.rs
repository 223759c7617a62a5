//! Character sheet use cases.
//!
//! Handles character creation, edits, full-record replacement, deletion and
//! spell slot bookkeeping. Every write goes through normalisation and
//! derived-value recomputation before it reaches the store.

mod error;

pub use error::CharacterSheetError;

use std::sync::Arc;

use charsheet_domain::{
    apply_edits, normalize, validate_character, Character, CharacterEdit, CharacterId,
    CharacterSheetEngine, IdentityField, SheetView,
};
use serde::Serialize;

use crate::infrastructure::persistence::StoreSelector;
use crate::infrastructure::ports::{CharacterStore, ClockPort, ReferenceCatalog, RepoError};

// =============================================================================
// Request / Result Types
// =============================================================================

/// Input for creating a character.
#[derive(Debug, Clone, Default)]
pub struct NewCharacter {
    pub name: String,
    pub class: Option<String>,
    pub race: Option<String>,
    pub background: Option<String>,
    pub level: Option<u8>,
}

impl NewCharacter {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A stored record together with its derived view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSheet {
    pub character: Character,
    pub sheet: SheetView,
}

// =============================================================================
// Use Cases
// =============================================================================

/// Container for character sheet use cases.
pub struct CharacterSheetUseCases {
    stores: StoreSelector,
    catalog: Arc<dyn ReferenceCatalog>,
    clock: Arc<dyn ClockPort>,
    engine: CharacterSheetEngine,
}

impl CharacterSheetUseCases {
    pub fn new(
        stores: StoreSelector,
        catalog: Arc<dyn ReferenceCatalog>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            stores,
            catalog,
            clock,
            engine: CharacterSheetEngine::new(),
        }
    }

    fn store(&self) -> Arc<dyn CharacterStore> {
        self.stores.active()
    }

    fn view(&self, character: Character) -> CharacterSheet {
        let sheet = self.engine.derive_sheet(&character);
        CharacterSheet { character, sheet }
    }

    async fn load(&self, id: &CharacterId) -> Result<Character, CharacterSheetError> {
        self.store()
            .get(id)
            .await?
            .ok_or_else(|| CharacterSheetError::CharacterNotFound(id.clone()))
    }

    async fn store_record(
        &self,
        mut character: Character,
    ) -> Result<CharacterSheet, CharacterSheetError> {
        character.updated_at = self.clock.now();
        self.store().save(&character).await?;
        Ok(self.view(character))
    }

    /// Create a character in the active store.
    ///
    /// Known catalog entries seed the record: class hit dice and saving
    /// throws, race speed, languages and ability bonuses, background skills.
    /// Unknown names are kept as free text.
    pub async fn create(
        &self,
        request: NewCharacter,
    ) -> Result<CharacterSheet, CharacterSheetError> {
        let store = self.store();
        let draft = Character::new(request.name.trim(), store.source(), self.clock.now());

        let mut edits = vec![CharacterEdit::Identity(
            IdentityField::Name,
            request.name.clone(),
        )];
        if let Some(class) = &request.class {
            edits.push(CharacterEdit::Identity(IdentityField::Class, class.clone()));
        }
        if let Some(race) = &request.race {
            edits.push(CharacterEdit::Identity(IdentityField::Race, race.clone()));
        }
        if let Some(background) = &request.background {
            edits.push(CharacterEdit::Identity(
                IdentityField::Background,
                background.clone(),
            ));
        }
        if let Some(level) = request.level {
            edits.push(CharacterEdit::Level(i64::from(level)));
        }

        let mut character = apply_edits(&draft, edits).inspect_err(|e| {
            tracing::warn!(field = %e.field, reason = %e.reason, "Rejected new character");
        })?;

        self.seed_from_catalog(&mut character, &request).await?;
        normalize(&mut character);
        let character = self.engine.recompute_derived(&character);

        store.save(&character).await?;
        tracing::info!(
            character_id = %character.id,
            name = %character.name,
            class = %character.class,
            level = character.level,
            "Created character"
        );
        Ok(self.view(character))
    }

    async fn seed_from_catalog(
        &self,
        character: &mut Character,
        request: &NewCharacter,
    ) -> Result<(), RepoError> {
        if let Some(class_id) = &request.class {
            match self.catalog.get_class_by_id(class_id).await? {
                Some(class) => {
                    character.combat.hit_dice = format!("{}d{}", character.level, class.hit_die);
                    for ability in class.saving_throws {
                        character.saving_throws.entry(ability).or_default().proficient = true;
                    }
                }
                None => tracing::debug!(class = %class_id, "Class not in catalog"),
            }
        }

        if let Some(race_id) = &request.race {
            match self.catalog.get_race_by_id(race_id).await? {
                Some(race) => {
                    character.combat.speed = race.speed;
                    character.proficiencies.languages.extend(race.languages);
                    for (ability, bonus) in race.ability_bonuses {
                        let score = character.abilities.get(ability);
                        character.abilities.set(ability, score + bonus);
                    }
                }
                None => tracing::debug!(race = %race_id, "Race not in catalog"),
            }
        }

        if let Some(background_id) = &request.background {
            match self.catalog.get_background_by_id(background_id).await? {
                Some(background) => {
                    for skill in background.skill_proficiencies {
                        character.skills.entry(skill).or_default().proficient = true;
                    }
                }
                None => tracing::debug!(background = %background_id, "Background not in catalog"),
            }
        }

        let max_hp = self.engine.derive_sheet(character).suggested_max_hp;
        character.combat.max_hp = max_hp;
        character.combat.current_hp = max_hp;
        Ok(())
    }

    /// Load a record and its derived view.
    pub async fn get(&self, id: &CharacterId) -> Result<CharacterSheet, CharacterSheetError> {
        let character = self.load(id).await?;
        tracing::debug!(character_id = %id, "Derived character sheet");
        Ok(self.view(character))
    }

    /// All characters in the active store, most recently updated first.
    pub async fn list(&self) -> Result<Vec<Character>, CharacterSheetError> {
        Ok(self.store().list_all().await?)
    }

    /// Apply edits atomically and save. Nothing is written if any edit is
    /// rejected.
    pub async fn edit(
        &self,
        id: &CharacterId,
        edits: Vec<CharacterEdit>,
    ) -> Result<CharacterSheet, CharacterSheetError> {
        let character = self.load(id).await?;
        let edited = apply_edits(&character, edits).inspect_err(|e| {
            tracing::warn!(character_id = %id, field = %e.field, reason = %e.reason, "Rejected edit");
        })?;

        let sheet = self.store_record(edited).await?;
        tracing::info!(character_id = %id, "Saved character edit");
        Ok(sheet)
    }

    /// Parse a form-layer `(field, value)` pair and apply it.
    pub async fn edit_field(
        &self,
        id: &CharacterId,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<CharacterSheet, CharacterSheetError> {
        let edit = CharacterEdit::from_field(field, value).inspect_err(|e| {
            tracing::warn!(character_id = %id, field = %e.field, reason = %e.reason, "Rejected edit");
        })?;
        self.edit(id, vec![edit]).await
    }

    /// Accept a full record from outside (import or sync). The record must
    /// pass validation as-is; it is then normalised, recomputed and saved.
    pub async fn replace(
        &self,
        character: Character,
    ) -> Result<CharacterSheet, CharacterSheetError> {
        validate_character(&character).inspect_err(|e| {
            tracing::warn!(
                character_id = %character.id,
                field = %e.field,
                reason = %e.reason,
                "Rejected record"
            );
        })?;

        let mut character = character;
        character.source = self.store().source();
        normalize(&mut character);
        let character = self.engine.recompute_derived(&character);

        let id = character.id.clone();
        let sheet = self.store_record(character).await?;
        tracing::info!(character_id = %id, "Replaced character");
        Ok(sheet)
    }

    pub async fn delete(&self, id: &CharacterId) -> Result<(), CharacterSheetError> {
        self.store().delete(id).await.map_err(|e| match e {
            RepoError::NotFound { .. } => CharacterSheetError::CharacterNotFound(id.clone()),
            other => CharacterSheetError::Repo(other),
        })?;
        tracing::info!(character_id = %id, "Deleted character");
        Ok(())
    }

    /// Spend one spell slot of `level`.
    pub async fn expend_slot(
        &self,
        id: &CharacterId,
        level: u8,
    ) -> Result<CharacterSheet, CharacterSheetError> {
        let character = self.load(id).await?;
        let next = self.engine.expend_slot(&character, level).inspect_err(|e| {
            tracing::warn!(character_id = %id, level, reason = %e.reason, "Rejected slot use");
        })?;
        self.store_record(next).await
    }

    /// Give back one spell slot of `level`.
    pub async fn restore_slot(
        &self,
        id: &CharacterId,
        level: u8,
    ) -> Result<CharacterSheet, CharacterSheetError> {
        let character = self.load(id).await?;
        let next = self.engine.restore_slot(&character, level)?;
        self.store_record(next).await
    }

    pub async fn restore_all_slots(
        &self,
        id: &CharacterId,
    ) -> Result<CharacterSheet, CharacterSheetError> {
        let character = self.load(id).await?;
        let next = self.engine.restore_all_slots(&character);
        self.store_record(next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::catalog::BundledCatalog;
    use crate::infrastructure::clock::fixed::FixedClock;
    use crate::infrastructure::persistence::MemoryCharacterStore;
    use crate::infrastructure::ports::{MockCharacterStore, MockReferenceCatalog};
    use charsheet_domain::{Ability, CharacterSource, Skill};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn use_cases_with(store: Arc<dyn CharacterStore>) -> CharacterSheetUseCases {
        CharacterSheetUseCases::new(
            StoreSelector::local_only(store),
            Arc::new(BundledCatalog::bundled().unwrap()),
            Arc::new(FixedClock(now())),
        )
    }

    fn empty_catalog() -> MockReferenceCatalog {
        let mut catalog = MockReferenceCatalog::new();
        catalog.expect_get_class_by_id().returning(|_| Ok(None));
        catalog.expect_get_race_by_id().returning(|_| Ok(None));
        catalog.expect_get_background_by_id().returning(|_| Ok(None));
        catalog
    }

    #[tokio::test]
    async fn create_seeds_from_catalog_and_recomputes() {
        let store = Arc::new(MemoryCharacterStore::new());
        let use_cases = use_cases_with(store.clone());

        let created = use_cases
            .create(NewCharacter {
                name: "Elowen".to_string(),
                class: Some("wizard".to_string()),
                race: Some("elf".to_string()),
                background: Some("sage".to_string()),
                level: Some(3),
            })
            .await
            .unwrap();

        let c = &created.character;
        assert_eq!(c.source, CharacterSource::Local);
        assert_eq!(c.combat.hit_dice, "3d6");
        assert_eq!(c.abilities.dexterity, 12);
        assert!(c.is_save_proficient(Ability::Intelligence));
        assert!(c.skill(Skill::Arcana).proficient);
        assert!(c.proficiencies.languages.contains("Elvish"));
        assert!(c.combat.max_hp >= 1);
        assert_eq!(c.combat.current_hp, c.combat.max_hp);
        // Recomputed before save: a level-3 wizard has 4/2 slots.
        assert_eq!(c.spellcasting.slots[&1].total, 4);
        assert_eq!(c.spellcasting.slots[&2].total, 2);
        assert_eq!(c.passive_skills[&Skill::Arcana], 12);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_blank_name_without_saving() {
        let mut store = MockCharacterStore::new();
        store
            .expect_source()
            .returning(|| CharacterSource::Local);
        store.expect_save().never();

        let use_cases = CharacterSheetUseCases::new(
            StoreSelector::local_only(Arc::new(store)),
            Arc::new(empty_catalog()),
            Arc::new(FixedClock(now())),
        );

        let err = use_cases.create(NewCharacter::named("   ")).await.unwrap_err();
        assert_eq!(err.field(), Some("name"));
    }

    #[tokio::test]
    async fn create_uses_cloud_store_when_signed_in() {
        let local = Arc::new(MemoryCharacterStore::new());
        let cloud = Arc::new(MemoryCharacterStore::with_source(CharacterSource::Cloud));
        let use_cases = CharacterSheetUseCases::new(
            StoreSelector::new(local.clone(), Some(cloud.clone())),
            Arc::new(empty_catalog()),
            Arc::new(FixedClock(now())),
        );

        let created = use_cases.create(NewCharacter::named("Bram")).await.unwrap();

        assert_eq!(created.character.source, CharacterSource::Cloud);
        assert_eq!(cloud.len(), 1);
        assert!(local.is_empty());
    }

    #[tokio::test]
    async fn get_missing_character_is_not_found() {
        let mut store = MockCharacterStore::new();
        store.expect_get().returning(|_| Ok(None));
        let use_cases = use_cases_with(Arc::new(store));

        let err = use_cases.get(&CharacterId::from("ghost")).await.unwrap_err();
        assert!(matches!(err, CharacterSheetError::CharacterNotFound(id) if id.as_str() == "ghost"));
    }

    #[tokio::test]
    async fn edit_field_stamps_updated_at_and_recomputes() {
        let original = Character::new(
            "Kestrel",
            CharacterSource::Local,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .with_class("rogue")
        .with_level(5)
        .with_skill(Skill::Stealth, true, false);
        let id = original.id.clone();

        let mut store = MockCharacterStore::new();
        let stored = original.clone();
        let expected_id = id.clone();
        store
            .expect_get()
            .withf(move |candidate| *candidate == expected_id)
            .returning(move |_| Ok(Some(stored.clone())));
        store
            .expect_save()
            .withf(|c| {
                c.abilities.dexterity == 16
                    && c.passive_skills[&Skill::Stealth] == 16
                    && c.updated_at == now()
            })
            .times(1)
            .returning(|_| Ok(()));

        let use_cases = use_cases_with(Arc::new(store));
        let sheet = use_cases
            .edit_field(&id, "abilities.dexterity", &json!(16))
            .await
            .unwrap();

        // +3 dexterity, +3 proficiency at level 5
        assert_eq!(sheet.sheet.skills[&Skill::Stealth], 6);
    }

    #[tokio::test]
    async fn rejected_edit_leaves_record_untouched() {
        let original = Character::new("Oric", CharacterSource::Local, now());
        let id = original.id.clone();

        let mut store = MockCharacterStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(Some(original.clone())));
        store.expect_save().never();

        let use_cases = use_cases_with(Arc::new(store));
        let err = use_cases
            .edit(&id, vec![CharacterEdit::MaxHp(20), CharacterEdit::Level(25)])
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("level"));
    }

    #[tokio::test]
    async fn replace_validates_then_normalizes() {
        let store = Arc::new(MemoryCharacterStore::new());
        let use_cases = use_cases_with(store.clone());

        let mut invalid = Character::new("Vex", CharacterSource::Cloud, now());
        invalid.level = 0;
        let err = use_cases.replace(invalid).await.unwrap_err();
        assert_eq!(err.field(), Some("level"));
        assert!(store.is_empty());

        let imported = Character::new("Vex", CharacterSource::Cloud, now())
            .with_class("cleric")
            .with_level(4)
            .with_ability(Ability::Wisdom, 16);
        let sheet = use_cases.replace(imported).await.unwrap();
        assert_eq!(sheet.character.source, CharacterSource::Local);
        assert_eq!(sheet.character.spellcasting.spell_save_dc, 13);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn delete_maps_missing_record_to_not_found() {
        let mut store = MockCharacterStore::new();
        store
            .expect_delete()
            .returning(|id| Err(RepoError::not_found("Character", id)));
        let use_cases = use_cases_with(Arc::new(store));

        let err = use_cases.delete(&CharacterId::from("gone")).await.unwrap_err();
        assert!(matches!(err, CharacterSheetError::CharacterNotFound(_)));
    }

    #[tokio::test]
    async fn slots_can_be_spent_until_exhausted_then_restored() {
        let store = Arc::new(MemoryCharacterStore::new());
        let use_cases = use_cases_with(store);
        let created = use_cases
            .create(NewCharacter {
                name: "Ilse".to_string(),
                class: Some("paladin".to_string()),
                level: Some(2),
                ..NewCharacter::default()
            })
            .await
            .unwrap();
        let id = created.character.id;
        assert_eq!(created.sheet.spell_slots[&1].total, 2);

        use_cases.expend_slot(&id, 1).await.unwrap();
        let spent = use_cases.expend_slot(&id, 1).await.unwrap();
        assert_eq!(spent.character.spellcasting.slots[&1].available(), 0);

        let err = use_cases.expend_slot(&id, 1).await.unwrap_err();
        assert_eq!(err.field(), Some("spellcasting.slots.1"));

        let restored = use_cases.restore_slot(&id, 1).await.unwrap();
        assert_eq!(restored.character.spellcasting.slots[&1].used, 1);

        let rested = use_cases.restore_all_slots(&id).await.unwrap();
        assert_eq!(rested.character.spellcasting.slots[&1].used, 0);
    }
}
