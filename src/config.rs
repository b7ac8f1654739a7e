//! Configuration management for Interview Keeper
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{InterviewError, Result};
use crate::transcript::TranscriptFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Main configuration structure for Interview Keeper
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Login and secret store configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Local transcript storage configuration
    #[serde(default)]
    pub transcripts: TranscriptsConfig,
    /// Remote archive (Google Drive) configuration
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Where per-user login secrets are read from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecretSource {
    /// The `auth.passwords` table in this configuration file
    #[default]
    Config,
    /// The operating system keyring
    Keyring,
}

/// Login configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Backing store for user secrets
    #[serde(default)]
    pub secret_source: SecretSource,

    /// Username to password table used when `secret_source` is `config`
    #[serde(default)]
    pub passwords: BTreeMap<String, String>,

    /// Keyring service name used when `secret_source` is `keyring`
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,
}

fn default_keyring_service() -> String {
    "interview-keeper".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_source: SecretSource::default(),
            passwords: BTreeMap::new(),
            keyring_service: default_keyring_service(),
        }
    }
}

// Passwords never reach logs through `{:?}`.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let users: Vec<&String> = self.passwords.keys().collect();
        f.debug_struct("AuthConfig")
            .field("secret_source", &self.secret_source)
            .field("passwords", &format_args!("<{} redacted: {:?}>", users.len(), users))
            .field("keyring_service", &self.keyring_service)
            .finish()
    }
}

/// Local transcript storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptsConfig {
    /// Directory transcripts are written to (created on demand)
    #[serde(default = "default_transcripts_directory")]
    pub directory: PathBuf,

    /// Serialization format for transcript files
    #[serde(default)]
    pub format: TranscriptFormat,

    /// Also write a `{stem}_time.txt` timing sidecar next to each transcript
    #[serde(default)]
    pub write_timing_file: bool,

    /// Account that never counts as having completed an interview
    #[serde(default = "default_reserved_username")]
    pub reserved_username: String,
}

fn default_transcripts_directory() -> PathBuf {
    PathBuf::from("transcripts")
}

fn default_reserved_username() -> String {
    "testaccount".to_string()
}

impl Default for TranscriptsConfig {
    fn default() -> Self {
        Self {
            directory: default_transcripts_directory(),
            format: TranscriptFormat::default(),
            write_timing_file: false,
            reserved_username: default_reserved_username(),
        }
    }
}

/// Google Drive archive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Upload transcripts after they are saved locally
    #[serde(default = "default_archive_enabled")]
    pub enabled: bool,

    /// Path to the service-account key JSON
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Destination Drive folder id
    #[serde(default)]
    pub folder_id: String,

    /// OAuth scopes requested for the service account
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Base URL of the Drive API (overridable for tests and mocks)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Per-request timeout for token exchange and uploads (seconds)
    #[serde(default = "default_archive_timeout")]
    pub timeout_seconds: u64,

    /// MIME type sent with uploaded transcripts
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_archive_enabled() -> bool {
    true
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("/etc/secrets/service-account.json")
}

fn default_scopes() -> Vec<String> {
    vec!["https://www.googleapis.com/auth/drive.file".to_string()]
}

fn default_api_base() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_archive_timeout() -> u64 {
    60
}

fn default_content_type() -> String {
    "text/plain".to_string()
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: default_archive_enabled(),
            credentials_path: default_credentials_path(),
            folder_id: String::new(),
            scopes: default_scopes(),
            api_base: default_api_base(),
            timeout_seconds: default_archive_timeout(),
            content_type: default_content_type(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| InterviewError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| InterviewError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(dir) = std::env::var("INTERVIEW_KEEPER_TRANSCRIPTS_DIR") {
            tracing::debug!(dir = %dir, "Env override: INTERVIEW_KEEPER_TRANSCRIPTS_DIR");
            self.transcripts.directory = PathBuf::from(dir);
        }

        if let Ok(format) = std::env::var("INTERVIEW_KEEPER_TRANSCRIPT_FORMAT") {
            match format.parse::<TranscriptFormat>() {
                Ok(f) => self.transcripts.format = f,
                Err(_) => {
                    tracing::warn!("Invalid INTERVIEW_KEEPER_TRANSCRIPT_FORMAT: {}", format)
                }
            }
        }

        if let Ok(source) = std::env::var("INTERVIEW_KEEPER_SECRET_SOURCE") {
            self.auth.secret_source = match source.to_lowercase().as_str() {
                "config" => SecretSource::Config,
                "keyring" => SecretSource::Keyring,
                _ => {
                    tracing::warn!("Invalid secret source: {}, keeping {:?}", source, self.auth.secret_source);
                    self.auth.secret_source
                }
            };
        }

        if let Ok(enabled) = std::env::var("INTERVIEW_KEEPER_ARCHIVE_ENABLED") {
            match enabled.parse::<bool>() {
                Ok(v) => self.archive.enabled = v,
                Err(_) => tracing::warn!("Invalid INTERVIEW_KEEPER_ARCHIVE_ENABLED: {}", enabled),
            }
        }

        if let Ok(folder_id) = std::env::var("INTERVIEW_KEEPER_ARCHIVE_FOLDER_ID") {
            self.archive.folder_id = folder_id;
        }

        if let Ok(path) = std::env::var("INTERVIEW_KEEPER_ARCHIVE_CREDENTIALS") {
            tracing::debug!(path = %path, "Env override: INTERVIEW_KEEPER_ARCHIVE_CREDENTIALS");
            self.archive.credentials_path = PathBuf::from(path);
        }

        if let Ok(timeout) = std::env::var("INTERVIEW_KEEPER_ARCHIVE_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.archive.timeout_seconds = v,
                Err(_) => tracing::warn!(
                    "Invalid INTERVIEW_KEEPER_ARCHIVE_TIMEOUT_SECONDS: {}",
                    timeout
                ),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(dir) = &cli.transcripts_dir {
            self.transcripts.directory = dir.clone();
        }
        if cli.no_archive {
            tracing::debug!("Archive disabled from command line");
            self.archive.enabled = false;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.transcripts.directory.as_os_str().is_empty() {
            return Err(InterviewError::Config(
                "transcripts.directory cannot be empty".to_string(),
            )
            .into());
        }

        if self.transcripts.reserved_username.trim().is_empty() {
            return Err(InterviewError::Config(
                "transcripts.reserved_username cannot be empty".to_string(),
            )
            .into());
        }

        if self.auth.secret_source == SecretSource::Keyring
            && self.auth.keyring_service.trim().is_empty()
        {
            return Err(InterviewError::Config(
                "auth.keyring_service cannot be empty when secret_source is keyring".to_string(),
            )
            .into());
        }

        if self.archive.enabled && self.archive.folder_id.trim().is_empty() {
            return Err(InterviewError::Config(
                "archive.folder_id must be set when the archive is enabled".to_string(),
            )
            .into());
        }

        if self.archive.timeout_seconds == 0 {
            return Err(InterviewError::Config(
                "archive.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
