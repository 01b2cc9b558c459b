//! Typed accessor for credential records.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::records::CredentialRecord;
use crate::store::Store;

/// Reads and writes each user's [`CredentialRecord`] under
/// `calendarTokens/{uid}`. Serialization only, no token logic.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn Store>,
}

impl TokenStore {
    /// Creates a token accessor over the given store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn key(uid: &str) -> String {
        format!("calendarTokens/{uid}")
    }

    /// Loads the credential record for `uid`, if one exists.
    pub async fn load(&self, uid: &str) -> StoreResult<Option<CredentialRecord>> {
        let path = Self::key(uid);
        match self.store.get(&path).await? {
            Some(value) => {
                let record = serde_json::from_value(value)
                    .map_err(|e| StoreError::serialization(&path, e))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Replaces the credential record for `uid` in full.
    pub async fn save(&self, uid: &str, record: &CredentialRecord) -> StoreResult<()> {
        let path = Self::key(uid);
        let value =
            serde_json::to_value(record).map_err(|e| StoreError::serialization(&path, e))?;
        debug!(uid, "persisting credential record");
        self.store.set(&path, value).await
    }

    /// Updates only the access token, its expiry, and the updatedAt stamp.
    ///
    /// The refresh token and scope are left untouched.
    pub async fn update_access(
        &self,
        uid: &str,
        access_token: &str,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        debug!(uid, "updating access token");
        self.store
            .update(
                &Self::key(uid),
                json!({
                    "accessToken": access_token,
                    "expiresAt": expires_at,
                    "updatedAt": now,
                }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn utc(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 5, h, 0, 0).unwrap()
    }

    fn record() -> CredentialRecord {
        CredentialRecord {
            access_token: "at-1".into(),
            refresh_token: Some("rt-1".into()),
            expires_at: Some(utc(9)),
            scope: "calendar".into(),
            updated_at: utc(8),
        }
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        tokens.save("u1", &record()).await.unwrap();

        let loaded = tokens.load("u1").await.unwrap().unwrap();
        assert_eq!(loaded, record());
        assert!(tokens.load("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_access_preserves_refresh_token() {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        tokens.save("u1", &record()).await.unwrap();
        tokens
            .update_access("u1", "at-2", Some(utc(12)), utc(10))
            .await
            .unwrap();

        let loaded = tokens.load("u1").await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "at-2");
        assert_eq!(loaded.expires_at, Some(utc(12)));
        assert_eq!(loaded.updated_at, utc(10));
        assert_eq!(loaded.refresh_token, Some("rt-1".into()));
        assert_eq!(loaded.scope, "calendar");
    }

    #[tokio::test]
    async fn save_overwrites_prior_record() {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        tokens.save("u1", &record()).await.unwrap();

        let replacement = CredentialRecord {
            access_token: "at-new".into(),
            refresh_token: None,
            expires_at: None,
            scope: "calendar".into(),
            updated_at: utc(11),
        };
        tokens.save("u1", &replacement).await.unwrap();

        let loaded = tokens.load("u1").await.unwrap().unwrap();
        assert_eq!(loaded, replacement);
    }
}
