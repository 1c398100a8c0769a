//! Secure Credential Storage Abstraction
//!
//! Abstracts the platform secure store used for the auth token and cached
//! user profile:
//! - macOS/iOS: Keychain
//! - Android: Keystore-backed storage
//! - Windows: DPAPI
//! - Linux: Secret Service / libsecret
//!
//! Implementations MUST encrypt data at rest, use the platform-provided
//! secure store when one exists, and never log secret values.

use async_trait::async_trait;

use crate::error::Result;

/// Secure credential storage trait
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret value, overwriting any previous value for `key`.
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Retrieve a secret value. Returns `Ok(None)` when the key is absent.
    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a secret. Deleting an absent key succeeds.
    async fn delete_secret(&self, key: &str) -> Result<()>;

    /// Check if a secret exists without retrieving it.
    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key).await?.is_some())
    }
}
