//! Environment-driven application configuration.

use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = "./characters";

/// Credentials for the account sync service. Present only when signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAccount {
    pub base_url: String,
    pub user_id: String,
    pub auth_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding one JSON file per local character.
    pub data_dir: PathBuf,
    /// Overrides the bundled reference data when set.
    pub catalog_dir: Option<PathBuf>,
    pub remote: Option<RemoteAccount>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let data_dir = get("CHARSHEET_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let catalog_dir = get("CHARSHEET_CATALOG_DIR").map(PathBuf::from);

        let remote = match (
            get("CHARSHEET_REMOTE_URL"),
            get("CHARSHEET_USER_ID"),
            get("CHARSHEET_AUTH_TOKEN"),
        ) {
            (Some(base_url), Some(user_id), Some(auth_token)) => Some(RemoteAccount {
                base_url: base_url.trim_end_matches('/').to_string(),
                user_id,
                auth_token,
            }),
            _ => None,
        };

        Self {
            data_dir,
            catalog_dir,
            remote,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.remote.is_some()
    }
}
