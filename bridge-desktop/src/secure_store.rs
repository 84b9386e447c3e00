//! Credential storage using the OS keychain

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::KeyValueStore,
};
use keyring::Entry;
use tracing::debug;

/// Keyring-based key-value storage
///
/// Uses platform-specific secure storage:
/// - macOS: Keychain
/// - Windows: Credential Manager (DPAPI)
/// - Linux: Secret Service (libsecret)
pub struct KeyringKeyValueStore {
    service_name: String,
}

impl KeyringKeyValueStore {
    /// Create a store with the default service name
    pub fn new() -> Self {
        Self {
            service_name: "wrongbook-client".to_string(),
        }
    }

    /// Create a store with a custom service name
    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, key: &str) -> std::result::Result<Entry, keyring::Error> {
        Entry::new(&self.service_name, key)
    }

    fn map_keyring_error(e: keyring::Error) -> BridgeError {
        BridgeError::Storage(format!("Keyring error: {}", e))
    }
}

impl Default for KeyringKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for KeyringKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = self.entry(key).map_err(Self::map_keyring_error)?;

        match entry.get_password() {
            Ok(value) => {
                debug!(key, "Read entry from keyring");
                Ok(Some(value))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry = self.entry(key).map_err(Self::map_keyring_error)?;
        entry.set_password(value).map_err(Self::map_keyring_error)?;

        debug!(key, "Stored entry in keyring");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let entry = self.entry(key).map_err(Self::map_keyring_error)?;

        match entry.delete_credential() {
            Ok(_) | Err(keyring::Error::NoEntry) => {
                debug!(key, "Removed entry from keyring");
                Ok(())
            }
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_name() {
        let store = KeyringKeyValueStore::new();
        assert_eq!(store.service_name, "wrongbook-client");
    }

    #[test]
    fn test_custom_service_name() {
        let store = KeyringKeyValueStore::with_service_name("wrongbook-test");
        assert_eq!(store.service_name, "wrongbook-test");
    }

    #[tokio::test]
    async fn test_round_trip_when_keyring_available() {
        let store = KeyringKeyValueStore::with_service_name("wrongbook-client-test");
        let key = "test-access-token-7f3a";

        let _ = store.remove(key).await;

        match store.set(key, "t1").await {
            Ok(_) => {
                // Some headless secret services accept writes but never persist them.
                if let Ok(Some(value)) = store.get(key).await {
                    assert_eq!(value, "t1");
                }
                let _ = store.remove(key).await;
            }
            Err(e) => {
                println!("Keyring not available ({}), skipping test", e);
            }
        }
    }
}
