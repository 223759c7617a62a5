//! On-device character store: one JSON file per character.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use charsheet_domain::{Character, CharacterId, CharacterSource};
use tokio::fs;

use super::is_safe_id;
use crate::infrastructure::ports::{CharacterStore, RepoError};

const EXTENSION: &str = "json";

/// Stores each character as `<id>.json` under a data directory. The
/// directory is created on first save.
pub struct LocalCharacterStore {
    dir: PathBuf,
}

impl LocalCharacterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &CharacterId) -> Option<PathBuf> {
        is_safe_id(id.as_str()).then(|| self.dir.join(format!("{}.{EXTENSION}", id.as_str())))
    }

    async fn read_file(path: &Path) -> Result<Character, RepoError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| RepoError::io("read", e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl CharacterStore for LocalCharacterStore {
    fn source(&self) -> CharacterSource {
        CharacterSource::Local
    }

    async fn get(&self, id: &CharacterId) -> Result<Option<Character>, RepoError> {
        let Some(path) = self.path_for(id) else {
            return Ok(None);
        };
        match fs::try_exists(&path).await {
            Ok(true) => Self::read_file(&path).await.map(Some),
            Ok(false) => Ok(None),
            Err(e) => Err(RepoError::io("get", e)),
        }
    }

    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        let path = self
            .path_for(&character.id)
            .ok_or_else(|| RepoError::io("save", format!("invalid id: {}", character.id)))?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RepoError::io("save", e))?;

        let json = serde_json::to_string_pretty(character)?;
        // Write beside the target then rename so a crash never leaves half a record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| RepoError::io("save", e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| RepoError::io("save", e))?;

        tracing::debug!(character_id = %character.id, path = %path.display(), "Wrote character file");
        Ok(())
    }

    async fn delete(&self, id: &CharacterId) -> Result<(), RepoError> {
        let path = self
            .path_for(id)
            .ok_or_else(|| RepoError::not_found("Character", id))?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RepoError::not_found("Character", id)),
            Err(e) => Err(RepoError::io("delete", e)),
        }
    }

    async fn list_all(&self) -> Result<Vec<Character>, RepoError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RepoError::io("list", e)),
        };

        let mut characters = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::io("list", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match Self::read_file(&path).await {
                Ok(character) => characters.push(character),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable character file");
                }
            }
        }

        characters.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(characters)
    }
}
