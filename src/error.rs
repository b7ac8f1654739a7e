//! Error types for Interview Keeper
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Interview Keeper operations
///
/// The first four variants are the user-facing failure outcomes of a
/// session (login, local save, remote upload). The remaining variants wrap
/// configuration and library failures.
#[derive(Error, Debug)]
pub enum InterviewError {
    /// Remote-storage credential material is absent from its configured location
    #[error("Missing archive credentials: {0}")]
    CredentialsMissing(String),

    /// Submitted username/password pair did not match
    #[error("User or password incorrect")]
    AuthenticationRejected,

    /// Local transcript write failed
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        /// Target path of the failed write
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// Remote upload failed
    #[error("Failed to upload {name}: {message}")]
    UploadFailed {
        /// Display name of the artifact
        name: String,
        /// Underlying cause
        message: String,
    },

    /// The user already has a saved transcript
    #[error("{0} has already completed the interview")]
    AlreadyCompleted(String),

    /// Username cannot be used as a transcript file name
    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    /// Session duration was requested before the session started
    #[error("Session has not been started")]
    SessionNotStarted,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Secret store lookup failures
    #[error("Secret store error: {0}")]
    SecretStore(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Service-account token signing errors
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl InterviewError {
    /// Builds an [`InterviewError::UploadFailed`] from any displayable cause.
    pub fn upload_failed(name: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::UploadFailed {
            name: name.into(),
            message: cause.to_string(),
        }
    }
}

/// Result type alias for Interview Keeper operations
///
/// Uses `anyhow::Error` so call sites can attach context; the typed
/// [`InterviewError`] is recovered with `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;
