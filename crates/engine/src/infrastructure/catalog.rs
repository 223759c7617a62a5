//! Reference and spell catalog loaded from JSON data files.
//!
//! The default data set is compiled into the binary. A data directory with
//! the same file names replaces it wholesale.

use std::path::Path;

use async_trait::async_trait;
use charsheet_domain::{
    BackgroundEntry, ClassEntry, RaceEntry, Spell, SpellFilter, SubclassEntry,
};
use serde::de::DeserializeOwned;
use tokio::fs;

use crate::infrastructure::ports::{ReferenceCatalog, RepoError, SpellCatalog};

const RACES: &str = include_str!("../../data/races.json");
const CLASSES: &str = include_str!("../../data/classes.json");
const SUBCLASSES: &str = include_str!("../../data/subclasses.json");
const BACKGROUNDS: &str = include_str!("../../data/backgrounds.json");
const SPELLS: &str = include_str!("../../data/spells.json");

/// In-memory catalog. Immutable after load.
#[derive(Debug, Clone, Default)]
pub struct BundledCatalog {
    races: Vec<RaceEntry>,
    classes: Vec<ClassEntry>,
    subclasses: Vec<SubclassEntry>,
    backgrounds: Vec<BackgroundEntry>,
    spells: Vec<Spell>,
}

fn parse<T: DeserializeOwned>(name: &str, content: &str) -> Result<Vec<T>, RepoError> {
    serde_json::from_str(content).map_err(|e| RepoError::serialization(format!("{name}: {e}")))
}

impl BundledCatalog {
    /// The data set shipped with the application.
    pub fn bundled() -> Result<Self, RepoError> {
        let catalog = Self {
            races: parse("races.json", RACES)?,
            classes: parse("classes.json", CLASSES)?,
            subclasses: parse("subclasses.json", SUBCLASSES)?,
            backgrounds: parse("backgrounds.json", BACKGROUNDS)?,
            spells: parse("spells.json", SPELLS)?,
        };
        tracing::debug!(spells = catalog.spells.len(), "Loaded bundled catalog");
        Ok(catalog)
    }

    /// Load every catalog file from `dir`. `subclasses.json` is optional.
    pub async fn from_dir(dir: &Path) -> Result<Self, RepoError> {
        async fn load<T: DeserializeOwned>(
            dir: &Path,
            name: &str,
            required: bool,
        ) -> Result<Vec<T>, RepoError> {
            let path = dir.join(name);
            match fs::read_to_string(&path).await {
                Ok(content) => parse(name, &content),
                Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
                Err(e) => Err(RepoError::io("catalog", format!("{}: {e}", path.display()))),
            }
        }

        let catalog = Self {
            races: load(dir, "races.json", true).await?,
            classes: load(dir, "classes.json", true).await?,
            subclasses: load(dir, "subclasses.json", false).await?,
            backgrounds: load(dir, "backgrounds.json", true).await?,
            spells: load(dir, "spells.json", true).await?,
        };
        tracing::debug!(
            dir = %dir.display(),
            spells = catalog.spells.len(),
            "Loaded catalog from data directory"
        );
        Ok(catalog)
    }

    pub fn races(&self) -> &[RaceEntry] {
        &self.races
    }

    pub fn classes(&self) -> &[ClassEntry] {
        &self.classes
    }

    pub fn backgrounds(&self) -> &[BackgroundEntry] {
        &self.backgrounds
    }
}

fn find_by_id<'a, T>(items: &'a [T], id: &str, key: impl Fn(&T) -> &str) -> Option<&'a T> {
    items.iter().find(|item| key(item).eq_ignore_ascii_case(id))
}

#[async_trait]
impl ReferenceCatalog for BundledCatalog {
    async fn get_class_by_id(&self, id: &str) -> Result<Option<ClassEntry>, RepoError> {
        Ok(find_by_id(&self.classes, id, |c| c.id.as_str()).cloned())
    }

    async fn get_race_by_id(&self, id: &str) -> Result<Option<RaceEntry>, RepoError> {
        Ok(find_by_id(&self.races, id, |r| r.id.as_str()).cloned())
    }

    async fn get_background_by_id(&self, id: &str) -> Result<Option<BackgroundEntry>, RepoError> {
        Ok(find_by_id(&self.backgrounds, id, |b| b.id.as_str()).cloned())
    }

    async fn get_subclasses_for_class(
        &self,
        class_id: &str,
        level: u8,
    ) -> Result<Vec<SubclassEntry>, RepoError> {
        Ok(self
            .subclasses
            .iter()
            .filter(|s| s.is_available(class_id, level))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SpellCatalog for BundledCatalog {
    async fn get_spells(&self, filter: &SpellFilter) -> Result<Vec<Spell>, RepoError> {
        Ok(filter.apply(&self.spells))
    }

    async fn get_spell_by_id(&self, id: &str) -> Result<Option<Spell>, RepoError> {
        Ok(find_by_id(&self.spells, id, |s| s.id.as_str()).cloned())
    }
}
