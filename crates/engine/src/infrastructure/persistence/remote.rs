//! Account sync service client.
//!
//! REST JSON over HTTP, one collection per user:
//! `{base}/users/{user}/characters` and `{base}/users/{user}/characters/{id}`.

use std::time::Duration;

use async_trait::async_trait;
use charsheet_domain::{validate_character, Character, CharacterId, CharacterSource};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use super::is_safe_id;
use crate::infrastructure::ports::{CharacterStore, RepoError};
use crate::infrastructure::settings::RemoteAccount;

/// Character store backed by the signed-in user's cloud collection.
#[derive(Clone)]
pub struct RemoteCharacterStore {
    client: Client,
    account: RemoteAccount,
}

impl RemoteCharacterStore {
    pub fn new(account: RemoteAccount) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            account: RemoteAccount {
                base_url: account.base_url.trim_end_matches('/').to_string(),
                ..account
            },
        }
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/users/{}/characters",
            self.account.base_url, self.account.user_id
        )
    }

    fn character_url(&self, id: &CharacterId) -> Option<String> {
        is_safe_id(id.as_str()).then(|| format!("{}/{}", self.collection_url(), id.as_str()))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.account.auth_token)
    }

    async fn send(request: RequestBuilder) -> Result<Response, RepoError> {
        request
            .send()
            .await
            .map_err(|e| RepoError::remote(None, e))
    }

    async fn error_from(response: Response) -> RepoError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|e| format!("unreadable error body: {e}"));
        RepoError::remote(Some(status), message)
    }

    /// Accept a record from the service only when it passes full validation.
    fn accept(mut character: Character) -> Result<Character, RepoError> {
        validate_character(&character).map_err(|e| {
            RepoError::serialization(format!("invalid character {}: {e}", character.id))
        })?;
        character.source = CharacterSource::Cloud;
        Ok(character)
    }
}

#[async_trait]
impl CharacterStore for RemoteCharacterStore {
    fn source(&self) -> CharacterSource {
        CharacterSource::Cloud
    }

    async fn get(&self, id: &CharacterId) -> Result<Option<Character>, RepoError> {
        let Some(url) = self.character_url(id) else {
            return Ok(None);
        };
        let response = Self::send(self.authorized(self.client.get(url))).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let character: Character = response
                    .json()
                    .await
                    .map_err(RepoError::serialization)?;
                Self::accept(character).map(Some)
            }
            _ => Err(Self::error_from(response).await),
        }
    }

    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        let url = self.character_url(&character.id).ok_or_else(|| {
            RepoError::remote(None, format!("invalid id: {}", character.id))
        })?;
        let mut outgoing = character.clone();
        outgoing.source = CharacterSource::Cloud;

        let response = Self::send(self.authorized(self.client.put(url).json(&outgoing))).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        tracing::debug!(character_id = %character.id, "Synced character to account service");
        Ok(())
    }

    async fn delete(&self, id: &CharacterId) -> Result<(), RepoError> {
        let url = self
            .character_url(id)
            .ok_or_else(|| RepoError::not_found("Character", id))?;
        let response = Self::send(self.authorized(self.client.delete(url))).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RepoError::not_found("Character", id)),
            status if status.is_success() => Ok(()),
            _ => Err(Self::error_from(response).await),
        }
    }

    async fn list_all(&self) -> Result<Vec<Character>, RepoError> {
        let response = Self::send(self.authorized(self.client.get(self.collection_url()))).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let records: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(RepoError::serialization)?;

        let mut characters = Vec::with_capacity(records.len());
        for record in records {
            let parsed = serde_json::from_value::<Character>(record)
                .map_err(RepoError::from)
                .and_then(Self::accept);
            match parsed {
                Ok(character) => characters.push(character),
                Err(e) => tracing::warn!(error = %e, "Skipping invalid cloud character"),
            }
        }

        characters.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(characters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RemoteCharacterStore {
        RemoteCharacterStore::new(RemoteAccount {
            base_url: "https://sync.example/api/".to_string(),
            user_id: "user-1".to_string(),
            auth_token: "secret".to_string(),
        })
    }

    #[test]
    fn urls_follow_the_user_collection_layout() {
        let store = store();
        assert_eq!(
            store.collection_url(),
            "https://sync.example/api/users/user-1/characters"
        );
        assert_eq!(
            store.character_url(&CharacterId::from("abc-1")).as_deref(),
            Some("https://sync.example/api/users/user-1/characters/abc-1")
        );
        assert_eq!(store.character_url(&CharacterId::from("../admin")), None);
    }

    #[test]
    fn accepted_records_are_tagged_cloud() {
        let local = Character::new("Ana", CharacterSource::Local, chrono::Utc::now());
        let accepted = RemoteCharacterStore::accept(local).unwrap();
        assert_eq!(accepted.source, CharacterSource::Cloud);
    }

    #[test]
    fn invalid_records_are_rejected() {
        let mut bad = Character::new("Ana", CharacterSource::Cloud, chrono::Utc::now());
        bad.level = 25;
        let err = RemoteCharacterStore::accept(bad).unwrap_err();
        assert!(matches!(err, RepoError::Serialization(_)));
    }

    /// Serves canned `(method, path) -> (status, body)` responses on a
    /// loopback port until the test ends.
    async fn serve(routes: Vec<(&'static str, String, u16, String)>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&request);
                let mut parts = head.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let path = parts.next().unwrap_or_default().to_string();

                let (status, body) = routes
                    .iter()
                    .find(|(m, p, _, _)| *m == method && *p == path)
                    .map(|(_, _, status, body)| (*status, body.clone()))
                    .unwrap_or((404, String::new()));
                let reason = match status {
                    200 => "OK",
                    404 => "Not Found",
                    _ => "Internal Server Error",
                };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{addr}")
    }

    fn store_at(base_url: String) -> RemoteCharacterStore {
        RemoteCharacterStore::new(RemoteAccount {
            base_url,
            user_id: "user-1".to_string(),
            auth_token: "secret".to_string(),
        })
    }

    const COLLECTION: &str = "/users/user-1/characters";

    #[tokio::test]
    async fn missing_character_reads_as_none() {
        let base = serve(vec![]).await;
        let store = store_at(base);

        let found = store.get(&CharacterId::from("gone-1")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn deleting_missing_character_is_not_found() {
        let base = serve(vec![]).await;
        let store = store_at(base);

        let err = store.delete(&CharacterId::from("gone-1")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn get_returns_cloud_tagged_character() {
        let stored = Character::new("Ana", CharacterSource::Local, chrono::Utc::now());
        let path = format!("{COLLECTION}/{}", stored.id);
        let body = serde_json::to_string(&stored).unwrap();
        let base = serve(vec![("GET", path, 200, body)]).await;
        let store = store_at(base);

        let found = store.get(&stored.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Ana");
        assert_eq!(found.source, CharacterSource::Cloud);
    }

    #[tokio::test]
    async fn list_skips_invalid_records_and_sorts_newest_first() {
        let now = chrono::Utc::now();
        let older = Character::new("Older", CharacterSource::Cloud, now - chrono::Duration::hours(2));
        let newer = Character::new("Newer", CharacterSource::Cloud, now);
        let mut broken = Character::new("Broken", CharacterSource::Cloud, now);
        broken.level = 25;
        let body = serde_json::to_string(&vec![
            serde_json::to_value(&older).unwrap(),
            serde_json::to_value(&broken).unwrap(),
            serde_json::to_value(&newer).unwrap(),
        ])
        .unwrap();
        let base = serve(vec![("GET", COLLECTION.to_string(), 200, body)]).await;
        let store = store_at(base);

        let listed = store.list_all().await.unwrap();
        let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn server_errors_keep_status_and_body() {
        let base = serve(vec![(
            "GET",
            COLLECTION.to_string(),
            500,
            "database offline".to_string(),
        )])
        .await;
        let store = store_at(base);

        let err = store.list_all().await.unwrap_err();
        match err {
            RepoError::Remote { status, message } => {
                assert_eq!(status, Some(500));
                assert!(message.contains("database offline"));
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsafe_ids_never_hit_the_network() {
        let store = store();
        let id = CharacterId::from("a/b");
        assert!(store.get(&id).await.unwrap().is_none());
        assert!(store.delete(&id).await.unwrap_err().is_not_found());
    }
}
