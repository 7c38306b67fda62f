use anyhow::{bail, Context, Result};
use keyring::Entry;

use super::token::TokenStore;

const SERVICE_NAME: &str = "bookclub";

/// Token storage in the OS keychain; each key becomes a keychain entry.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    /// Stores the token and reads it back, so a keychain that drops
    /// writes fails here rather than on the next authenticated call.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to store token in keychain")?;
        match self.get(key)? {
            Some(stored) if stored == value => Ok(()),
            _ => bail!("Keychain did not keep the token for '{}'", key),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_that_drops_writes_is_an_error() {
        // The mock store keeps credentials per entry, and every call builds a new one
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let store = KeyringTokenStore::with_service("bookclub-test-mock");
        let err = store.set("auth_token", "tok-1").unwrap_err();
        assert!(err.to_string().contains("did not keep"));
    }

    #[test]
    #[ignore = "needs an OS keychain"]
    fn test_keychain_round_trip() {
        let store = KeyringTokenStore::with_service("bookclub-test");
        store.set("auth_token", "tok-1").unwrap();
        assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("tok-1"));
        store.remove("auth_token").unwrap();
        assert_eq!(store.get("auth_token").unwrap(), None);
    }
}
