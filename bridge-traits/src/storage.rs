//! Key-Value Storage Abstraction
//!
//! Persistent string storage used for session credentials. On mini-program
//! and H5 hosts this maps onto the synchronous storage API; on desktop it is
//! backed by the OS keychain.

use async_trait::async_trait;

use crate::error::Result;

/// Persistent key-value storage trait
///
/// Abstracts platform storage mechanisms:
/// - Mini-program / H5: `getStorageSync` / `setStorageSync` / `removeStorageSync`
/// - Desktop: Keychain, Credential Manager, Secret Service
/// - Tests: in-memory maps
///
/// # Security Requirements
///
/// Values stored here include bearer credentials. Implementations MUST NOT
/// log values and SHOULD use platform-provided secure storage when available.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::KeyValueStore;
///
/// async fn remember_token(store: &dyn KeyValueStore, token: &str) -> Result<()> {
///     store.set("access_token", token).await
/// }
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value
    ///
    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Check if a key exists without returning its value
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        Store {}

        #[async_trait]
        impl KeyValueStore for Store {
            async fn get(&self, key: &str) -> Result<Option<String>>;
            async fn set(&self, key: &str, value: &str) -> Result<()>;
            async fn remove(&self, key: &str) -> Result<()>;
        }
    }

    #[tokio::test]
    async fn test_contains_uses_get() {
        let mut store = MockStore::new();
        store
            .expect_get()
            .withf(|key| key == "access_token")
            .returning(|_| Ok(Some("t1".to_string())));
        store
            .expect_get()
            .withf(|key| key == "refresh_token")
            .returning(|_| Ok(None));

        assert!(store.contains("access_token").await.unwrap());
        assert!(!store.contains("refresh_token").await.unwrap());
    }
}
