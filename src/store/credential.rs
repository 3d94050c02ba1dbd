use super::{traits::KeyValueStore, KEY_API_KEY};
use crate::{
    error::{MagicError, Result},
    gemini::GenerationClient,
};
use std::sync::Arc;

/// API key persistence with an optional environment-provided fallback.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    fallback: Option<String>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, key: Option<String>) -> Self {
        self.fallback = key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Stored key first, then the fallback.
    pub fn get(&self) -> Result<Option<String>> {
        let stored = self
            .store
            .get(KEY_API_KEY)?
            .filter(|k| !k.trim().is_empty());
        Ok(stored.or_else(|| self.fallback.clone()))
    }

    /// Same as `get`, but a missing key is an error.
    pub fn require(&self) -> Result<String> {
        self.get()?.ok_or(MagicError::MissingCredential)
    }

    pub fn is_set(&self) -> bool {
        matches!(self.get(), Ok(Some(_)))
    }

    pub fn set(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(MagicError::Validation("API key is blank".into()));
        }
        self.store.set(KEY_API_KEY, key)?;
        log::info!("🔑 API key saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(KEY_API_KEY)?;
        log::info!("🔑 API key removed");
        Ok(())
    }

    /// Probes the API with `key`. Nothing is persisted.
    pub async fn validate(&self, client: &dyn GenerationClient, key: &str) -> bool {
        let key = key.trim();
        if key.is_empty() {
            return false;
        }
        match client.probe(key).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("API key validation failed: {}", e);
                false
            }
        }
    }

    /// Persists `key` only when the probe succeeds.
    pub async fn save_validated(&self, client: &dyn GenerationClient, key: &str) -> Result<bool> {
        if self.validate(client, key).await {
            self.set(key)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Shows only the first characters of a key.
pub fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(6).collect();
    format!("{}…", visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::FakeClient;

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn stored_key_wins_over_fallback() {
        let creds = store().with_fallback(Some("env-key".into()));
        assert_eq!(creds.get().unwrap().as_deref(), Some("env-key"));
        creds.set("  user-key ").unwrap();
        assert_eq!(creds.get().unwrap().as_deref(), Some("user-key"));
        creds.clear().unwrap();
        assert_eq!(creds.get().unwrap().as_deref(), Some("env-key"));
    }

    #[test]
    fn missing_key_is_reported() {
        let creds = store().with_fallback(Some("   ".into()));
        assert!(!creds.is_set());
        assert!(matches!(creds.require(), Err(MagicError::MissingCredential)));
        assert!(creds.set(" ").is_err());
    }

    #[tokio::test]
    async fn validation_does_not_persist() {
        let creds = store();
        let client = FakeClient::new();
        assert!(creds.validate(&client, "good").await);
        assert!(creds.get().unwrap().is_none());

        client.reject_probe();
        assert!(!creds.save_validated(&client, "bad").await.unwrap());
        assert!(creds.get().unwrap().is_none());
    }

    #[tokio::test]
    async fn save_validated_persists_on_success() {
        let creds = store();
        let client = FakeClient::new();
        assert!(creds.save_validated(&client, "AIza-ok").await.unwrap());
        assert_eq!(creds.get().unwrap().as_deref(), Some("AIza-ok"));
        assert!(!creds.validate(&client, "").await);
    }

    #[test]
    fn masks_keys() {
        assert_eq!(mask_key("AIzaSyABCDEF"), "AIzaSy…");
        assert_eq!(mask_key("abc"), "abc…");
    }
}
