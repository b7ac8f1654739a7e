//! Explicit transcript save handler.
//!
//! Serializes a message list read from JSON for callers that drive the
//! conversation outside an interactive session.

use crate::commands::archive_saved;
use crate::completion::CompletionOracle;
use crate::config::Config;
use crate::error::{InterviewError, Result};
use crate::session::Message;
use crate::transcript::{SavedTranscript, TranscriptWriter};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::Path;

/// Reads `[{"role": ..., "content": ...}]` from a JSON file
///
/// # Errors
///
/// Returns error if the file cannot be read or is not a message list.
pub fn load_messages(path: &Path) -> Result<Vec<Message>> {
    let contents = std::fs::read_to_string(path)?;
    let messages: Vec<Message> = serde_json::from_str(&contents)?;
    Ok(messages)
}

/// Parses an RFC 3339 start time
///
/// # Errors
///
/// Returns [`InterviewError::Config`] for malformed timestamps.
pub fn parse_started_at(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| InterviewError::Config(format!("Invalid start time '{}': {}", value, e)).into())
}

/// Writes the transcript for an explicit message list
///
/// # Errors
///
/// Returns [`InterviewError::AlreadyCompleted`] if the user already has a
/// transcript, or an error if the input cannot be read or the transcript
/// cannot be written.
pub fn save_transcript(
    config: &Config,
    username: &str,
    input: &Path,
    started_at: &str,
) -> Result<SavedTranscript> {
    if CompletionOracle::new(&config.transcripts).completed(username) {
        return Err(InterviewError::AlreadyCompleted(username.to_string()).into());
    }

    let messages = load_messages(input)?;
    let started_at = parse_started_at(started_at)?;
    let saved = TranscriptWriter::new(&config.transcripts).save_messages(
        username,
        &messages,
        started_at,
    )?;
    println!(
        "{}",
        format!("Transcript saved: {}", saved.transcript_path.display()).green()
    );
    Ok(saved)
}

/// Saves an explicit message list and archives the result
///
/// # Errors
///
/// Returns error if saving or archiving fails; the local file is kept when
/// only the upload fails.
pub async fn run_save(
    config: Config,
    username: String,
    input: &Path,
    started_at: &str,
) -> Result<()> {
    let saved = save_transcript(&config, &username, input, started_at)?;
    archive_saved(&config, &saved).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_error_contains, create_test_file, temp_dir, test_config};

    #[test]
    fn test_parse_started_at() {
        let t = parse_started_at("2024-01-01T10:00:00+02:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2024-01-01T08:00:00+00:00");
        assert!(parse_started_at("yesterday").is_err());
    }

    #[test]
    fn test_save_transcript_from_json() {
        let temp_dir = temp_dir();
        let input = create_test_file(
            &temp_dir,
            "messages.json",
            r#"[{"role":"user","content":"Hi"},{"role":"assistant","content":"Hello"}]"#,
        );

        let mut config = test_config(&temp_dir);
        config.transcripts.directory = temp_dir.path().join("out");
        let started_at = (Utc::now() - chrono::Duration::seconds(10)).to_rfc3339();

        let saved = save_transcript(&config, "alice", &input, &started_at).unwrap();
        let text = std::fs::read_to_string(saved.transcript_path).unwrap();
        assert!(text.starts_with("User: Hi\nAssistant: Hello\n\nInterview Duration: 00:00:1"));
    }

    #[test]
    fn test_save_transcript_refuses_completed_user() {
        let temp_dir = temp_dir();
        let input = create_test_file(
            &temp_dir,
            "messages.json",
            r#"[{"role":"user","content":"replaced"}]"#,
        );
        let original = create_test_file(&temp_dir, "bob.txt", "User: original\n");
        let config = test_config(&temp_dir);

        assert_error_contains(
            save_transcript(&config, "bob", &input, "2024-01-01T10:00:00Z"),
            "bob has already completed the interview",
        );
        assert_eq!(
            std::fs::read_to_string(original).unwrap(),
            "User: original\n"
        );
    }

    #[test]
    fn test_save_transcript_timestamped_refuses_completed_user() {
        let temp_dir = temp_dir();
        let input = create_test_file(&temp_dir, "messages.json", "[]");
        create_test_file(&temp_dir, "bob_interview_20240101_100000.txt", "x");
        let mut config = test_config(&temp_dir);
        config.transcripts.format = crate::transcript::TranscriptFormat::Timestamped;

        let err = save_transcript(&config, "bob", &input, "2024-06-01T10:00:00Z").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InterviewError>(),
            Some(InterviewError::AlreadyCompleted(_))
        ));
    }

    #[test]
    fn test_load_messages_rejects_bad_json() {
        let temp_dir = temp_dir();
        let input = create_test_file(&temp_dir, "messages.json", r#"{"role":"user"}"#);
        assert!(load_messages(&input).is_err());
    }

    #[tokio::test]
    async fn test_run_save_with_archive_disabled_keeps_file_local() {
        let temp_dir = temp_dir();
        let input = create_test_file(
            &temp_dir,
            "messages.json",
            r#"[{"role":"user","content":"Hi"}]"#,
        );
        let config = test_config(&temp_dir);

        run_save(config, "bob".to_string(), &input, "2024-01-01T10:00:00Z")
            .await
            .unwrap();
        assert!(temp_dir.path().join("bob.txt").is_file());
    }
}
