//! Port traits for the character store and reference catalogs.

use async_trait::async_trait;
use charsheet_domain::{
    BackgroundEntry, Character, CharacterId, CharacterSource, ClassEntry, RaceEntry, Spell,
    SpellFilter, SubclassEntry,
};

use super::error::RepoError;

// =============================================================================
// Character Storage
// =============================================================================

/// Persistence for character records. Local and cloud variants share this
/// contract; saves are full-record replaces.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Which source records from this store are tagged with.
    fn source(&self) -> CharacterSource;

    async fn get(&self, id: &CharacterId) -> Result<Option<Character>, RepoError>;
    async fn save(&self, character: &Character) -> Result<(), RepoError>;
    /// Fails with `NotFound` when there is nothing to delete.
    async fn delete(&self, id: &CharacterId) -> Result<(), RepoError>;
    async fn list_all(&self) -> Result<Vec<Character>, RepoError>;
}

// =============================================================================
// Reference Data
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceCatalog: Send + Sync {
    async fn get_class_by_id(&self, id: &str) -> Result<Option<ClassEntry>, RepoError>;
    async fn get_race_by_id(&self, id: &str) -> Result<Option<RaceEntry>, RepoError>;
    async fn get_background_by_id(&self, id: &str) -> Result<Option<BackgroundEntry>, RepoError>;
    /// Subclasses of `class_id` available at `level`.
    async fn get_subclasses_for_class(
        &self,
        class_id: &str,
        level: u8,
    ) -> Result<Vec<SubclassEntry>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpellCatalog: Send + Sync {
    async fn get_spells(&self, filter: &SpellFilter) -> Result<Vec<Spell>, RepoError>;
    async fn get_spell_by_id(&self, id: &str) -> Result<Option<Spell>, RepoError>;
}
