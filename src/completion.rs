//! Interview completion checks
//!
//! A user has completed the interview when their transcript exists in the
//! transcripts directory. The filesystem is read on every call.

use crate::config::TranscriptsConfig;
use crate::session::validate_username;
use crate::transcript::TranscriptFormat;
use std::path::{Path, PathBuf};

/// Answers whether a user already has a saved transcript
///
/// # Examples
///
/// ```
/// use interview_keeper::completion::CompletionOracle;
/// use interview_keeper::config::TranscriptsConfig;
///
/// let oracle = CompletionOracle::new(&TranscriptsConfig::default());
/// // The reserved test account never counts as completed.
/// assert!(!oracle.completed("testaccount"));
/// ```
#[derive(Debug, Clone)]
pub struct CompletionOracle {
    directory: PathBuf,
    format: TranscriptFormat,
    reserved_username: String,
}

impl CompletionOracle {
    /// Creates an oracle over the configured transcripts directory
    pub fn new(config: &TranscriptsConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            format: config.format,
            reserved_username: config.reserved_username.clone(),
        }
    }

    /// Checks the configured directory
    pub fn completed(&self, username: &str) -> bool {
        self.is_completed(&self.directory, username)
    }

    /// Checks `directory` for a transcript belonging to `username`
    ///
    /// The reserved username always reports `false`, as does a username
    /// that could not name a transcript file. An unreadable directory
    /// counts as no transcript.
    pub fn is_completed(&self, directory: &Path, username: &str) -> bool {
        if validate_username(username).is_err() {
            tracing::warn!(username = ?username, "Completion check for invalid username");
            return false;
        }
        if username == self.reserved_username {
            tracing::debug!(username = %username, "Reserved account, skipping completion check");
            return false;
        }

        match self.format {
            TranscriptFormat::Plain => directory.join(format!("{}.txt", username)).is_file(),
            TranscriptFormat::Timestamped => {
                let prefix = format!("{}_interview_", username);
                let entries = match std::fs::read_dir(directory) {
                    Ok(entries) => entries,
                    Err(_) => return false,
                };
                entries.filter_map(|e| e.ok()).any(|entry| {
                    let name = entry.file_name();
                    let name = name.to_string_lossy();
                    name.starts_with(&prefix) && name.ends_with(".txt")
                })
            }
        }
    }
}
