//! Test utilities for Interview Keeper
//!
//! Temporary transcript directories, canned configurations and assertion
//! helpers shared by the unit tests.

use crate::config::Config;
use crate::error::Result;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a valid configuration that writes into `dir` and never uploads
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.transcripts.directory = dir.path().to_path_buf();
    config.archive.enabled = false;
    config
        .auth
        .passwords
        .insert("alice".to_string(), "wonderland".to_string());
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InterviewError;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "alice.txt", "User: Hi");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "User: Hi");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(InterviewError::AuthenticationRejected.into());
        assert_error_contains(result, "incorrect");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(InterviewError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config_is_valid() {
        let dir = temp_dir();
        let config = test_config(&dir);
        assert!(config.validate().is_ok());
        assert_eq!(config.transcripts.directory, dir.path());
    }
}
