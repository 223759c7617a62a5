//! In-memory character store.

use async_trait::async_trait;
use charsheet_domain::{Character, CharacterId, CharacterSource};
use dashmap::DashMap;

use crate::infrastructure::ports::{CharacterStore, RepoError};

/// Keeps characters for the lifetime of the process. Used for offline
/// sessions and tests.
pub struct MemoryCharacterStore {
    characters: DashMap<String, Character>,
    source: CharacterSource,
}

impl MemoryCharacterStore {
    pub fn new() -> Self {
        Self::with_source(CharacterSource::Local)
    }

    pub fn with_source(source: CharacterSource) -> Self {
        Self {
            characters: DashMap::new(),
            source,
        }
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

impl Default for MemoryCharacterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CharacterStore for MemoryCharacterStore {
    fn source(&self) -> CharacterSource {
        self.source
    }

    async fn get(&self, id: &CharacterId) -> Result<Option<Character>, RepoError> {
        Ok(self.characters.get(id.as_str()).map(|c| c.value().clone()))
    }

    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        self.characters
            .insert(character.id.as_str().to_string(), character.clone());
        Ok(())
    }

    async fn delete(&self, id: &CharacterId) -> Result<(), RepoError> {
        self.characters
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found("Character", id))
    }

    async fn list_all(&self) -> Result<Vec<Character>, RepoError> {
        let mut characters: Vec<Character> =
            self.characters.iter().map(|e| e.value().clone()).collect();
        characters.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(characters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn save_get_delete() {
        let store = MemoryCharacterStore::new();
        let character = Character::new("Mira", CharacterSource::Local, Utc::now());

        store.save(&character).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&character.id).await.unwrap(), Some(character.clone()));

        store.delete(&character.id).await.unwrap();
        assert!(store.is_empty());
        assert!(store.get(&character.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = MemoryCharacterStore::new();
        let err = store.delete(&CharacterId::from("nope")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryCharacterStore::new();
        let older = Character::new(
            "Old",
            CharacterSource::Local,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        let newer = Character::new(
            "New",
            CharacterSource::Local,
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        );
        store.save(&older).await.unwrap();
        store.save(&newer).await.unwrap();

        let names: Vec<_> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["New", "Old"]);
    }
}
