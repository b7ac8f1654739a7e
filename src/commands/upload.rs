//! Archive upload handler.

use crate::commands::upload_paths;
use crate::config::Config;
use crate::error::{InterviewError, Result};
use std::path::PathBuf;

/// Uploads existing files to the configured archive folder
///
/// # Errors
///
/// Returns error if a path is missing, authentication fails, or any upload
/// fails.
pub async fn run_upload(config: Config, paths: Vec<PathBuf>) -> Result<()> {
    if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
        return Err(InterviewError::Config(format!(
            "Not a file: {}",
            missing.display()
        ))
        .into());
    }

    tracing::info!(count = paths.len(), "Uploading files to archive");
    upload_paths(&config, &paths).await?;
    Ok(())
}
