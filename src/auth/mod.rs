//! Login gate
//!
//! - `secret_store`: per-username secret lookup (config table or OS keyring)
//! - `verifier`: constant-time password verification and session creation

pub mod secret_store;
pub mod verifier;

pub use secret_store::{secret_store_from_config, KeyringSecretStore, SecretStore, StaticSecretStore};
pub use verifier::CredentialVerifier;
