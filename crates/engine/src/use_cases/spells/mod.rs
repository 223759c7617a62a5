//! Spell catalog browsing.

use std::sync::Arc;

use charsheet_domain::{Spell, SpellFilter};

use crate::infrastructure::ports::{RepoError, SpellCatalog};

#[derive(Debug, thiserror::Error)]
pub enum SpellError {
    #[error("Spell not found: {0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Container for spell use cases.
pub struct SpellUseCases {
    catalog: Arc<dyn SpellCatalog>,
}

impl SpellUseCases {
    pub fn new(catalog: Arc<dyn SpellCatalog>) -> Self {
        Self { catalog }
    }

    /// Spells matching `filter`, ordered by level then name.
    pub async fn search(&self, filter: &SpellFilter) -> Result<Vec<Spell>, SpellError> {
        let spells = self.catalog.get_spells(filter).await?;
        tracing::debug!(count = spells.len(), ?filter, "Spell search");
        Ok(spells)
    }

    pub async fn get(&self, id: &str) -> Result<Spell, SpellError> {
        self.catalog
            .get_spell_by_id(id)
            .await?
            .ok_or_else(|| SpellError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockSpellCatalog;
    use std::collections::BTreeSet;

    fn spell(id: &str, level: u8) -> Spell {
        Spell {
            id: id.to_string(),
            name: id.to_string(),
            level,
            school: "Evocation".to_string(),
            classes: BTreeSet::from(["wizard".to_string()]),
            casting_time: "1 action".to_string(),
            range: "60 feet".to_string(),
            components: "V, S".to_string(),
            material: None,
            duration: "Instantaneous".to_string(),
            description: String::new(),
            at_higher_levels: None,
            concentration: false,
            ritual: false,
        }
    }

    #[tokio::test]
    async fn search_passes_filter_through() {
        let mut catalog = MockSpellCatalog::new();
        catalog
            .expect_get_spells()
            .withf(|f| f.level == Some(3))
            .returning(|_| Ok(vec![spell("fireball", 3)]));

        let use_cases = SpellUseCases::new(Arc::new(catalog));
        let filter = SpellFilter {
            level: Some(3),
            ..SpellFilter::default()
        };
        let spells = use_cases.search(&filter).await.unwrap();

        assert_eq!(spells.len(), 1);
        assert_eq!(spells[0].id, "fireball");
    }

    #[tokio::test]
    async fn get_unknown_spell_is_not_found() {
        let mut catalog = MockSpellCatalog::new();
        catalog.expect_get_spell_by_id().returning(|_| Ok(None));

        let use_cases = SpellUseCases::new(Arc::new(catalog));
        let err = use_cases.get("wish-lite").await.unwrap_err();

        assert!(matches!(err, SpellError::NotFound(id) if id == "wish-lite"));
    }

    #[tokio::test]
    async fn catalog_failures_surface_as_repo_errors() {
        let mut catalog = MockSpellCatalog::new();
        catalog
            .expect_get_spell_by_id()
            .returning(|_| Err(RepoError::io("catalog", "unreadable")));

        let use_cases = SpellUseCases::new(Arc::new(catalog));
        let err = use_cases.get("light").await.unwrap_err();

        assert!(matches!(err, SpellError::Repo(_)));
    }
}
