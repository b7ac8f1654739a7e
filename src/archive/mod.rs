//! Remote archiving of saved transcripts
//!
//! An [`Archiver`] uploads one local file and returns the remote id. The
//! batch helpers upload several files with one authenticated client and
//! report each file's outcome separately; nothing is retried or rolled back.

pub mod drive;

use crate::config::ArchiveConfig;
use crate::error::{InterviewError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use drive::{authenticate, DriveClient, ServiceAccountKey};

/// Uploads local files to a fixed remote destination
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Uploads the whole file at `local_path` under `display_name`
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::InterviewError::UploadFailed`] on any read,
    /// transport or API failure.
    async fn upload(
        &self,
        local_path: &Path,
        display_name: &str,
        content_type: &str,
    ) -> Result<String>;
}

/// A file that reached the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedArtifact {
    /// Display name used for the upload
    pub name: String,
    /// Local source path
    pub path: PathBuf,
    /// Id returned by the remote store
    pub remote_id: String,
}

/// A file that failed to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedArtifact {
    /// Display name used for the upload
    pub name: String,
    /// Local source path
    pub path: PathBuf,
    /// Failure cause
    pub error: String,
}

/// Per-file outcome of a batch upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Files uploaded successfully, in request order
    pub uploaded: Vec<UploadedArtifact>,
    /// Files that failed, in request order
    pub failed: Vec<FailedArtifact>,
}

impl ArchiveReport {
    /// Whether every requested file was uploaded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// `Files uploaded: ...` line, `None` when nothing was uploaded
    pub fn uploaded_summary(&self) -> Option<String> {
        if self.uploaded.is_empty() {
            return None;
        }
        let ok: Vec<String> = self
            .uploaded
            .iter()
            .map(|u| format!("{} (id {})", u.name, u.remote_id))
            .collect();
        Some(format!("Files uploaded: {}", ok.join(", ")))
    }

    /// One-line human readable summary
    pub fn summary(&self) -> String {
        let ok: Vec<String> = self
            .uploaded
            .iter()
            .map(|u| format!("{} (id {})", u.name, u.remote_id))
            .collect();
        let failed: Vec<String> = self
            .failed
            .iter()
            .map(|f| format!("{} ({})", f.name, f.error))
            .collect();

        match (ok.is_empty(), failed.is_empty()) {
            (_, true) => format!("Files uploaded: {}", ok.join(", ")),
            (true, false) => format!("Failed to upload files: {}", failed.join(", ")),
            (false, false) => format!(
                "Files uploaded: {}; failed: {}",
                ok.join(", "),
                failed.join(", ")
            ),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Uploads each path with `archiver`, continuing past failures
pub async fn save_artifacts(
    archiver: &dyn Archiver,
    paths: &[PathBuf],
    content_type: &str,
) -> ArchiveReport {
    let mut report = ArchiveReport::default();

    for path in paths {
        let name = display_name(path);
        match archiver.upload(path, &name, content_type).await {
            Ok(remote_id) => {
                tracing::info!(name = %name, remote_id = %remote_id, "Uploaded to archive");
                report.uploaded.push(UploadedArtifact {
                    name,
                    path: path.clone(),
                    remote_id,
                });
            }
            Err(e) => {
                tracing::error!(name = %name, error = %e, "Archive upload failed");
                let error = match e.downcast_ref::<InterviewError>() {
                    Some(InterviewError::UploadFailed { message, .. }) => message.clone(),
                    _ => e.to_string(),
                };
                report.failed.push(FailedArtifact {
                    name,
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    report
}

/// Authenticates once against the configured archive and uploads `paths`
///
/// # Errors
///
/// Returns the authentication error (for example
/// [`crate::error::InterviewError::CredentialsMissing`]); per-file upload
/// failures are reported in the returned [`ArchiveReport`].
pub async fn archive_files(config: &ArchiveConfig, paths: &[PathBuf]) -> Result<ArchiveReport> {
    let client = authenticate(config).await?;
    Ok(save_artifacts(&client, paths, &config.content_type).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_save_artifacts_all_succeed() {
        let mut mock = MockArchiver::new();
        mock.expect_upload()
            .withf(|_, name, content_type| name == "alice.txt" && content_type == "text/plain")
            .times(1)
            .returning(|_, _, _| Ok("id-1".to_string()));
        mock.expect_upload()
            .withf(|_, name, _| name == "alice_time.txt")
            .times(1)
            .returning(|_, _, _| Ok("id-2".to_string()));

        let paths = vec![
            PathBuf::from("/data/alice.txt"),
            PathBuf::from("/data/alice_time.txt"),
        ];
        let report = save_artifacts(&mock, &paths, "text/plain").await;

        assert!(report.is_complete());
        assert_eq!(report.uploaded.len(), 2);
        assert_eq!(report.uploaded[0].remote_id, "id-1");
        assert_eq!(report.uploaded[1].remote_id, "id-2");
        assert_eq!(
            report.summary(),
            "Files uploaded: alice.txt (id id-1), alice_time.txt (id id-2)"
        );
        assert_eq!(report.uploaded_summary(), Some(report.summary()));
    }

    #[tokio::test]
    async fn test_save_artifacts_partial_failure_is_reported() {
        let mut mock = MockArchiver::new();
        mock.expect_upload()
            .withf(|_, name, _| name == "alice.txt")
            .returning(|_, _, _| Ok("id-1".to_string()));
        mock.expect_upload()
            .withf(|_, name, _| name == "alice_time.txt")
            .returning(|_, name, _| Err(InterviewError::upload_failed(name, "quota exceeded").into()));

        let paths = vec![
            PathBuf::from("/data/alice.txt"),
            PathBuf::from("/data/alice_time.txt"),
        ];
        let report = save_artifacts(&mock, &paths, "text/plain").await;

        assert!(!report.is_complete());
        assert_eq!(report.uploaded.len(), 1);
        assert_eq!(report.uploaded[0].name, "alice.txt");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "alice_time.txt");
        assert_eq!(report.failed[0].error, "quota exceeded");
        assert_eq!(
            report.uploaded_summary().as_deref(),
            Some("Files uploaded: alice.txt (id id-1)")
        );
        assert!(report.summary().contains("failed: alice_time.txt"));
    }

    #[tokio::test]
    async fn test_save_artifacts_does_not_retry() {
        let mut mock = MockArchiver::new();
        mock.expect_upload()
            .with(
                eq(PathBuf::from("/data/bob.txt")),
                eq("bob.txt"),
                eq("text/plain"),
            )
            .times(1)
            .returning(|_, name, _| Err(InterviewError::upload_failed(name, "timeout").into()));

        let report = save_artifacts(&mock, &[PathBuf::from("/data/bob.txt")], "text/plain").await;
        assert!(report.uploaded.is_empty());
        assert_eq!(
            report.summary(),
            "Failed to upload files: bob.txt (timeout)"
        );
        assert!(report.uploaded_summary().is_none());
    }

    #[tokio::test]
    async fn test_save_artifacts_empty_batch() {
        let mock = MockArchiver::new();
        let report = save_artifacts(&mock, &[], "text/plain").await;
        assert!(report.is_complete());
        assert!(report.uploaded.is_empty());
    }

    #[tokio::test]
    async fn test_archive_files_without_credentials() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = ArchiveConfig {
            credentials_path: temp_dir.path().join("missing.json"),
            folder_id: "folder".to_string(),
            ..Default::default()
        };
        let err = archive_files(&config, &[PathBuf::from("x.txt")])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InterviewError>(),
            Some(InterviewError::CredentialsMissing(_))
        ));
    }

    #[test]
    fn test_display_name_uses_file_name() {
        assert_eq!(display_name(Path::new("/a/b/c.txt")), "c.txt");
    }
}
