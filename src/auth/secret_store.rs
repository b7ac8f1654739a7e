//! Per-user secret lookup
//!
//! The verifier only needs one read operation, `lookup(username)`. Secrets
//! come back wrapped in [`Zeroizing`] so their buffers are wiped on drop.

use crate::config::{AuthConfig, SecretSource};
use crate::error::{InterviewError, Result};
use std::collections::HashMap;
use zeroize::Zeroizing;

/// Source of per-username login secrets
pub trait SecretStore: Send + Sync {
    /// Returns the stored secret for `username`, or `None` for unknown users
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be read.
    fn lookup(&self, username: &str) -> Result<Option<Zeroizing<String>>>;
}

/// In-memory secret table
///
/// # Examples
///
/// ```
/// use interview_keeper::auth::{SecretStore, StaticSecretStore};
///
/// let store = StaticSecretStore::from_pairs([("alice", "wonderland")]);
/// assert!(store.lookup("alice").unwrap().is_some());
/// assert!(store.lookup("mallory").unwrap().is_none());
/// ```
#[derive(Default)]
pub struct StaticSecretStore {
    secrets: HashMap<String, Zeroizing<String>>,
}

impl StaticSecretStore {
    /// Builds a store from `(username, secret)` pairs
    pub fn from_pairs<I, U, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, S)>,
        U: Into<String>,
        S: Into<String>,
    {
        Self {
            secrets: pairs
                .into_iter()
                .map(|(u, s)| (u.into(), Zeroizing::new(s.into())))
                .collect(),
        }
    }

    /// Number of known users
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl SecretStore for StaticSecretStore {
    fn lookup(&self, username: &str) -> Result<Option<Zeroizing<String>>> {
        Ok(self.secrets.get(username).cloned())
    }
}

/// Secrets held in the operating system keyring
///
/// Each user's secret is stored under the configured service name with the
/// username as the account.
pub struct KeyringSecretStore {
    service: String,
}

impl KeyringSecretStore {
    /// Creates a store reading entries under `service`
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Stores or replaces a user's secret
    ///
    /// # Errors
    ///
    /// Returns [`InterviewError::Keyring`] if the credential store rejects
    /// the write.
    pub fn set_secret(&self, username: &str, secret: &str) -> Result<()> {
        let entry = keyring::Entry::new(&self.service, username).map_err(InterviewError::Keyring)?;
        entry.set_password(secret).map_err(InterviewError::Keyring)?;
        Ok(())
    }

    /// Removes a user's secret; a missing entry is not an error
    ///
    /// # Errors
    ///
    /// Returns [`InterviewError::Keyring`] if the credential store rejects
    /// the delete.
    pub fn delete_secret(&self, username: &str) -> Result<()> {
        let entry = keyring::Entry::new(&self.service, username).map_err(InterviewError::Keyring)?;
        match entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(InterviewError::Keyring(e).into()),
        }
    }
}

impl SecretStore for KeyringSecretStore {
    fn lookup(&self, username: &str) -> Result<Option<Zeroizing<String>>> {
        let entry = keyring::Entry::new(&self.service, username).map_err(InterviewError::Keyring)?;
        match entry.get_password() {
            Ok(secret) => Ok(Some(Zeroizing::new(secret))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(InterviewError::SecretStore(format!(
                "keyring lookup failed for service {}: {}",
                self.service, e
            ))
            .into()),
        }
    }
}

/// Builds the secret store selected by configuration
pub fn secret_store_from_config(config: &AuthConfig) -> Box<dyn SecretStore> {
    match config.secret_source {
        SecretSource::Config => {
            let store = StaticSecretStore::from_pairs(
                config
                    .passwords
                    .iter()
                    .map(|(u, s)| (u.clone(), s.clone())),
            );
            if store.is_empty() {
                tracing::warn!("No passwords configured; every login will be rejected");
            }
            Box::new(store)
        }
        SecretSource::Keyring => {
            tracing::debug!(service = %config.keyring_service, "Using keyring secret store");
            Box::new(KeyringSecretStore::new(config.keyring_service.clone()))
        }
    }
}
