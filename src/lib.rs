//! Interview Keeper - password-gated interview transcripts
//!
//! This library authenticates interview participants against a secret
//! store, records the conversation with timing metadata, saves the
//! transcript to local disk and archives it to Google Drive.
//!
//! # Architecture
//!
//! - `auth`: secret stores and constant-time credential verification
//! - `session`: the per-login session state and append-only message log
//! - `transcript`: transcript rendering, parsing and atomic file writes
//! - `archive`: the archiver seam and the Google Drive backend
//! - `completion`: whether a user already has a saved transcript
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli` / `commands`: command-line interface and handlers
//!
//! # Example
//!
//! ```no_run
//! use interview_keeper::{Config, CredentialVerifier, TranscriptWriter};
//! use interview_keeper::auth::secret_store_from_config;
//! use zeroize::Zeroizing;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let verifier = CredentialVerifier::new(secret_store_from_config(&config.auth));
//!     let mut session = verifier.login("alice", Zeroizing::new("wonderland".to_string()))?;
//!     session.append("assistant", "Tell me about your last project.");
//!     session.append("user", "I built a compiler.");
//!     TranscriptWriter::new(&config.transcripts).save(&session)?;
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod completion;
pub mod config;
pub mod error;
pub mod session;
pub mod transcript;

// Re-export commonly used types
pub use archive::{ArchiveReport, Archiver};
pub use auth::CredentialVerifier;
pub use completion::CompletionOracle;
pub use config::Config;
pub use error::{InterviewError, Result};
pub use session::{Message, Session};
pub use transcript::{TranscriptFormat, TranscriptWriter};

#[cfg(test)]
pub mod test_utils;
