/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `interview`: interactive login, message capture, save and archive
- `status`: completion check for one user
- `save`: serialize an explicit message list
- `upload`: archive existing files
- `passwd`: store a keyring password for one user

Successful outcomes are printed here. Failures are returned instead and
printed once by the binary, which then exits non-zero.
*/

use crate::archive::{self, ArchiveReport};
use crate::config::Config;
use crate::error::{InterviewError, Result};
use crate::transcript::SavedTranscript;
use colored::Colorize;
use std::path::PathBuf;

pub mod interview;
pub mod passwd;
pub mod save;
pub mod status;
pub mod upload;

/// Prints the files of a batch upload that reached the archive
pub fn print_uploaded(report: &ArchiveReport) {
    if let Some(uploaded) = report.uploaded_summary() {
        println!("{}", uploaded.green());
    }
}

/// Uploads the files of a saved transcript when the archive is enabled
///
/// The local files are never touched by this step, whatever the outcome.
///
/// # Errors
///
/// Returns the authentication error, or an error naming the files that
/// failed to upload.
pub async fn archive_saved(
    config: &Config,
    saved: &SavedTranscript,
) -> Result<Option<ArchiveReport>> {
    if !config.archive.enabled {
        tracing::info!("Archive disabled, keeping transcript local only");
        return Ok(None);
    }
    upload_paths(config, &saved.paths()).await.map(Some)
}

/// Authenticates, uploads `paths` and prints the files that were uploaded
///
/// # Errors
///
/// Returns the authentication error, or an
/// [`InterviewError::UploadFailed`] naming every file that failed.
pub async fn upload_paths(config: &Config, paths: &[PathBuf]) -> Result<ArchiveReport> {
    let report = archive::archive_files(&config.archive, paths).await?;

    print_uploaded(&report);
    if report.is_complete() {
        Ok(report)
    } else {
        let names: Vec<&str> = report.failed.iter().map(|f| f.name.as_str()).collect();
        let causes: Vec<&str> = report.failed.iter().map(|f| f.error.as_str()).collect();
        Err(InterviewError::UploadFailed {
            name: names.join(", "),
            message: causes.join("; "),
        }
        .into())
    }
}
