pub mod credential;
pub mod file;
pub mod memory;
pub mod session;
pub mod traits;
pub mod usage;

use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};

pub use credential::CredentialStore;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::AuthService;
pub use traits::KeyValueStore;
pub use usage::{Clock, SystemClock, UsageLimiter};

pub const KEY_API_KEY: &str = "pmk_api_key";
pub const KEY_DAILY_USAGE: &str = "pmk_daily_usage";
pub const KEY_USERS: &str = "pmk_users";
pub const KEY_SESSION: &str = "pmk_session";

/// Reads a JSON value. Corrupt data is logged, removed and reported as absent.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            log::error!("Stored value at '{}' is corrupted, resetting: {}", key, e);
            store.remove(key)?;
            Ok(None)
        }
    }
}

pub fn write_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_json_is_absent_and_cleared() {
        let store = MemoryStore::new();
        store.set(KEY_USERS, "[{broken").unwrap();
        let users: Option<Vec<String>> = read_json(&store, KEY_USERS).unwrap();
        assert!(users.is_none());
        assert_eq!(store.get(KEY_USERS).unwrap(), None);
    }

    #[test]
    fn json_values_survive_the_store() {
        let store = MemoryStore::new();
        write_json(&store, KEY_SESSION, &vec!["a".to_string()]).unwrap();
        let back: Option<Vec<String>> = read_json(&store, KEY_SESSION).unwrap();
        assert_eq!(back, Some(vec!["a".to_string()]));
    }
}
