//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    catalog::BundledCatalog,
    clock::{SystemClock, SystemRandom},
    persistence::{LocalCharacterStore, RemoteCharacterStore, StoreSelector},
    ports::{CharacterStore, ClockPort, RandomPort, ReferenceCatalog, RepoError, SpellCatalog},
    settings::AppConfig,
};
use crate::use_cases;

/// Main application state.
///
/// Holds the selected stores and all use cases. Built once per process.
pub struct App {
    pub stores: StoreSelector,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub character_sheet: use_cases::CharacterSheetUseCases,
    pub spells: use_cases::SpellUseCases,
    pub dice: use_cases::DiceUseCases,
}

impl App {
    /// Wire use cases over already-built ports.
    pub fn new(
        stores: StoreSelector,
        catalog: Arc<BundledCatalog>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let reference: Arc<dyn ReferenceCatalog> = catalog.clone();
        let spells: Arc<dyn SpellCatalog> = catalog;

        let use_cases = UseCases {
            character_sheet: use_cases::CharacterSheetUseCases::new(
                stores.clone(),
                reference,
                clock,
            ),
            spells: use_cases::SpellUseCases::new(spells),
            dice: use_cases::DiceUseCases::new(random),
        };

        Self { stores, use_cases }
    }

    /// Build the application from configuration: local store always, the
    /// account store when credentials are present, catalog from the data
    /// directory or the bundled set.
    pub async fn from_config(config: &AppConfig) -> Result<Self, RepoError> {
        let local: Arc<dyn CharacterStore> =
            Arc::new(LocalCharacterStore::new(config.data_dir.clone()));
        let cloud: Option<Arc<dyn CharacterStore>> = config.remote.clone().map(|account| {
            tracing::info!(user_id = %account.user_id, "Signed in, using account store");
            Arc::new(RemoteCharacterStore::new(account)) as Arc<dyn CharacterStore>
        });

        let catalog = match &config.catalog_dir {
            Some(dir) => BundledCatalog::from_dir(dir).await?,
            None => BundledCatalog::bundled()?,
        };

        Ok(Self::new(
            StoreSelector::new(local, cloud),
            Arc::new(catalog),
            Arc::new(SystemClock),
            Arc::new(SystemRandom),
        ))
    }
}
