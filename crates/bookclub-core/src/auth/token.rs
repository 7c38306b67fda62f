use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use tracing::{debug, warn};

/// Persistent key/value storage for the session token.
///
/// Keys mirror browser storage: one string value per key. The session
/// token lives under a single configured key.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store. Tokens vanish when the process exits.
#[derive(Default)]
pub struct MemoryTokenStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| anyhow!("token store poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("token store poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("token store poisoned"))?;
        values.remove(key);
        Ok(())
    }
}

/// The session token: a store plus the key it lives under.
#[derive(Clone)]
pub struct TokenSlot {
    store: Arc<dyn TokenStore>,
    key: String,
}

impl TokenSlot {
    pub fn new(store: Arc<dyn TokenStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the token. Storage failures are logged and treated as "no token".
    pub fn load(&self) -> Option<String> {
        match self.store.get(&self.key) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read session token");
                None
            }
        }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        debug!(key = %self.key, "Storing session token");
        self.store.set(&self.key, token)
    }

    pub fn clear(&self) -> Result<()> {
        debug!(key = %self.key, "Clearing session token");
        self.store.remove(&self.key)
    }

    pub fn is_present(&self) -> bool {
        self.load().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get("auth_token").unwrap(), None);
        store.set("auth_token", "abc").unwrap();
        assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("abc"));
        store.remove("auth_token").unwrap();
        assert_eq!(store.get("auth_token").unwrap(), None);
    }

    #[test]
    fn test_slots_with_different_keys_are_isolated() {
        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let main = TokenSlot::new(store.clone(), "auth_token");
        let legacy = TokenSlot::new(store, "nb_access_token");

        main.save("new-token").unwrap();
        assert!(main.is_present());
        assert!(!legacy.is_present());

        legacy.save("old-token").unwrap();
        main.clear().unwrap();
        assert_eq!(main.load(), None);
        assert_eq!(legacy.load().as_deref(), Some("old-token"));
    }

    #[test]
    fn test_empty_token_counts_as_absent() {
        let slot = TokenSlot::new(Arc::new(MemoryTokenStore::new()), "auth_token");
        slot.save("").unwrap();
        assert!(!slot.is_present());
    }
}
