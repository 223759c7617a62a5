//! Character store adapters and the sign-in based store selection.

mod local;
mod memory;
mod remote;

use std::sync::Arc;

pub use local::LocalCharacterStore;
pub use memory::MemoryCharacterStore;
pub use remote::RemoteCharacterStore;

use crate::infrastructure::ports::CharacterStore;

/// Picks the character store for the current session: the cloud store
/// while signed in, the on-device store otherwise.
#[derive(Clone)]
pub struct StoreSelector {
    local: Arc<dyn CharacterStore>,
    cloud: Option<Arc<dyn CharacterStore>>,
}

impl StoreSelector {
    pub fn new(local: Arc<dyn CharacterStore>, cloud: Option<Arc<dyn CharacterStore>>) -> Self {
        Self { local, cloud }
    }

    pub fn local_only(local: Arc<dyn CharacterStore>) -> Self {
        Self::new(local, None)
    }

    pub fn is_signed_in(&self) -> bool {
        self.cloud.is_some()
    }

    pub fn active(&self) -> Arc<dyn CharacterStore> {
        self.cloud.clone().unwrap_or_else(|| self.local.clone())
    }
}

/// Store file and URL segments must not escape their parent.
pub(crate) fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use charsheet_domain::CharacterSource;

    #[test]
    fn selector_prefers_cloud_when_signed_in() {
        let local: Arc<dyn CharacterStore> = Arc::new(MemoryCharacterStore::new());
        let cloud: Arc<dyn CharacterStore> =
            Arc::new(MemoryCharacterStore::with_source(CharacterSource::Cloud));

        let signed_out = StoreSelector::local_only(local.clone());
        assert!(!signed_out.is_signed_in());
        assert_eq!(signed_out.active().source(), CharacterSource::Local);

        let signed_in = StoreSelector::new(local, Some(cloud));
        assert!(signed_in.is_signed_in());
        assert_eq!(signed_in.active().source(), CharacterSource::Cloud);
    }

    #[test]
    fn safe_ids_reject_path_segments() {
        assert!(is_safe_id("3f2a-b_9"));
        assert!(!is_safe_id(""));
        assert!(!is_safe_id("../etc"));
        assert!(!is_safe_id("a/b"));
    }
}
