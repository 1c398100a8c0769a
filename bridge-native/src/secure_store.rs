//! Secure store implementations.
//!
//! [`MemorySecureStore`] backs tests and development builds; the
//! keyring-backed store (feature `secure-store`) uses the OS credential
//! service for real deployments.

use async_trait::async_trait;
use bridge_traits::{error::Result, storage::SecureStore};
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory secure store.
///
/// Contents live for the process lifetime only. Not encrypted; never use it
/// to persist real credentials.
#[derive(Default)]
pub struct MemorySecureStore {
    secrets: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecureStore for MemorySecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        self.secrets.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.secrets.read().get(key).cloned())
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        self.secrets.write().remove(key);
        Ok(())
    }
}

#[cfg(feature = "secure-store")]
pub use keyring_store::KeyringSecureStore;

#[cfg(feature = "secure-store")]
mod keyring_store {
    use async_trait::async_trait;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use bridge_traits::{
        error::{BridgeError, Result},
        storage::SecureStore,
    };
    use keyring::Entry;
    use tracing::debug;

    /// OS keyring-backed secure store.
    ///
    /// Uses Keychain on macOS, Credential Manager on Windows, and the Secret
    /// Service on Linux. Values are base64-encoded because the keyring API
    /// only stores strings.
    pub struct KeyringSecureStore {
        service_name: String,
    }

    impl KeyringSecureStore {
        pub fn new() -> Self {
            Self::with_service_name("streaming-music-client")
        }

        pub fn with_service_name(service_name: impl Into<String>) -> Self {
            Self {
                service_name: service_name.into(),
            }
        }

        fn entry(&self, key: &str) -> Result<Entry> {
            Entry::new(&self.service_name, key).map_err(map_keyring_error)
        }
    }

    impl Default for KeyringSecureStore {
        fn default() -> Self {
            Self::new()
        }
    }

    fn map_keyring_error(e: keyring::Error) -> BridgeError {
        BridgeError::OperationFailed(format!("keyring error: {}", e))
    }

    #[async_trait]
    impl SecureStore for KeyringSecureStore {
        async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
            let encoded = BASE64.encode(value);
            self.entry(key)?
                .set_password(&encoded)
                .map_err(map_keyring_error)?;
            debug!(key, "stored secret in keyring");
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
            match self.entry(key)?.get_password() {
                Ok(encoded) => {
                    let decoded = BASE64.decode(&encoded).map_err(|e| {
                        BridgeError::OperationFailed(format!("failed to decode secret: {}", e))
                    })?;
                    Ok(Some(decoded))
                }
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(map_keyring_error(e)),
            }
        }

        async fn delete_secret(&self, key: &str) -> Result<()> {
            match self.entry(key)?.delete_credential() {
                Ok(_) => Ok(()),
                Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(map_keyring_error(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemorySecureStore::new();

        store.set_secret("auth_token", b"jwt-value").await.unwrap();
        assert_eq!(
            store.get_secret("auth_token").await.unwrap(),
            Some(b"jwt-value".to_vec())
        );
        assert!(store.has_secret("auth_token").await.unwrap());

        store.delete_secret("auth_token").await.unwrap();
        assert_eq!(store.get_secret("auth_token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_store_delete_is_idempotent() {
        let store = MemorySecureStore::new();
        store.delete_secret("missing").await.unwrap();
    }
}
