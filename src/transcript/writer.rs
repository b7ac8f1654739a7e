//! Transcript persistence to the local filesystem
//!
//! Files are written to temporary files in the target directory and then
//! renamed into place, so a reader never sees a half-written transcript
//! under its final name. The transcript is created at most once per user;
//! only the reserved account may replace its file.

use crate::config::TranscriptsConfig;
use crate::error::{InterviewError, Result};
use crate::session::{validate_username, Message, Session};
use crate::transcript::format::{self, TranscriptFormat};
use chrono::{DateTime, Duration, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Paths and timing of a transcript that was written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedTranscript {
    /// Location of the transcript file
    pub transcript_path: PathBuf,
    /// Location of the timing sidecar, when one was written
    pub timing_path: Option<PathBuf>,
    /// Recorded interview duration
    pub duration: Duration,
}

impl SavedTranscript {
    /// All files produced by the save, transcript first
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.transcript_path.clone()];
        if let Some(timing) = &self.timing_path {
            paths.push(timing.clone());
        }
        paths
    }
}

/// Writes transcripts under a configured directory
///
/// # Examples
///
/// ```no_run
/// use interview_keeper::config::TranscriptsConfig;
/// use interview_keeper::session::Session;
/// use interview_keeper::transcript::TranscriptWriter;
///
/// let writer = TranscriptWriter::new(&TranscriptsConfig::default());
/// let mut session = Session::start("alice");
/// session.append("user", "Hi");
/// let saved = writer.save(&session).unwrap();
/// println!("{}", saved.transcript_path.display());
/// ```
#[derive(Debug, Clone)]
pub struct TranscriptWriter {
    directory: PathBuf,
    format: TranscriptFormat,
    write_timing_file: bool,
    reserved_username: String,
}

impl TranscriptWriter {
    /// Creates a writer from transcript configuration
    pub fn new(config: &TranscriptsConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            format: config.format,
            write_timing_file: config.write_timing_file,
            reserved_username: config.reserved_username.clone(),
        }
    }

    /// Target directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Serialization format in use
    pub fn format(&self) -> TranscriptFormat {
        self.format
    }

    /// File name for a user's transcript
    ///
    /// `plain` uses `{username}.txt`; `timestamped` appends the start time,
    /// `{username}_interview_{YYYYMMDD_HHMMSS}.txt`.
    pub fn file_name(&self, username: &str, started_at: DateTime<Utc>) -> String {
        match self.format {
            TranscriptFormat::Plain => format!("{}.txt", username),
            TranscriptFormat::Timestamped => format!(
                "{}_interview_{}.txt",
                username,
                started_at.format("%Y%m%d_%H%M%S")
            ),
        }
    }

    /// Saves a live session, measuring its duration up to now
    ///
    /// # Errors
    ///
    /// Returns [`InterviewError::SessionNotStarted`] for a session without a
    /// start time, [`InterviewError::AlreadyCompleted`] if the transcript
    /// file already exists and [`InterviewError::WriteFailed`] if the
    /// directory or file cannot be written.
    pub fn save(&self, session: &Session) -> Result<SavedTranscript> {
        let started_at = session
            .started_at()
            .ok_or(InterviewError::SessionNotStarted)?;
        let elapsed = session.elapsed()?;
        self.write(
            session.username(),
            session.messages(),
            started_at,
            started_at + elapsed,
        )
    }

    /// Saves an explicit message list for callers outside a live session
    ///
    /// # Errors
    ///
    /// Same as [`TranscriptWriter::save`].
    pub fn save_messages(
        &self,
        username: &str,
        messages: &[Message],
        started_at: DateTime<Utc>,
    ) -> Result<SavedTranscript> {
        self.write(username, messages, started_at, Utc::now())
    }

    fn write(
        &self,
        username: &str,
        messages: &[Message],
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Result<SavedTranscript> {
        validate_username(username)?;
        std::fs::create_dir_all(&self.directory).map_err(|source| InterviewError::WriteFailed {
            path: self.directory.clone(),
            source,
        })?;

        let file_name = self.file_name(username, started_at);
        let transcript_path = self.directory.join(&file_name);
        let text = format::render(self.format, messages, started_at, ended_at);

        // Everything is staged before the first rename.
        let transcript = stage(&transcript_path, text.as_bytes())?;
        let timing = if self.write_timing_file {
            let stem = file_name.trim_end_matches(".txt");
            let path = self.directory.join(format!("{}_time.txt", stem));
            let staged = stage(&path, format::render_timing(started_at, ended_at).as_bytes())?;
            Some((staged, path))
        } else {
            None
        };

        let replace = username == self.reserved_username;
        persist(transcript, &transcript_path, replace).map_err(|source| {
            if source.kind() == std::io::ErrorKind::AlreadyExists {
                InterviewError::AlreadyCompleted(username.to_string())
            } else {
                InterviewError::WriteFailed {
                    path: transcript_path.clone(),
                    source,
                }
            }
        })?;

        let timing_path = match timing {
            Some((staged, path)) => {
                if let Err(source) = persist(staged, &path, true) {
                    // A transcript without its sidecar would count as completed.
                    if let Err(e) = std::fs::remove_file(&transcript_path) {
                        tracing::error!(
                            path = %transcript_path.display(),
                            error = %e,
                            "Failed to remove transcript after timing file error"
                        );
                    }
                    return Err(InterviewError::WriteFailed { path, source }.into());
                }
                tracing::debug!(path = %path.display(), "Timing file saved");
                Some(path)
            }
            None => None,
        };

        tracing::info!(
            path = %transcript_path.display(),
            messages = messages.len(),
            "Transcript saved"
        );
        Ok(SavedTranscript {
            transcript_path,
            timing_path,
            duration: (ended_at - started_at).max(Duration::zero()),
        })
    }
}

/// Writes `bytes` to a synced temp file next to `path`
fn stage(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let to_write_failed = |source: std::io::Error| InterviewError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(to_write_failed)?;
    tmp.write_all(bytes).map_err(to_write_failed)?;
    tmp.as_file().sync_all().map_err(to_write_failed)?;
    Ok(tmp)
}

/// Renames a staged file to `path`; without `replace` an existing file wins
fn persist(tmp: NamedTempFile, path: &Path, replace: bool) -> std::io::Result<()> {
    let persisted = if replace {
        tmp.persist(path)
    } else {
        tmp.persist_noclobber(path)
    };
    persisted.map(drop).map_err(|e| e.error)
}
