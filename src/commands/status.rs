//! Completion status handler.

use crate::completion::CompletionOracle;
use crate::config::Config;
use crate::error::Result;
use crate::session::validate_username;
use colored::Colorize;

/// Prints whether `username` has completed the interview and returns it
///
/// # Errors
///
/// Returns [`crate::error::InterviewError::InvalidUsername`] for names that
/// cannot belong to a transcript.
pub fn show_status(config: &Config, username: &str) -> Result<bool> {
    validate_username(username)?;
    let oracle = CompletionOracle::new(&config.transcripts);
    let completed = oracle.completed(username);
    tracing::debug!(username = %username, completed, "Completion check");

    if completed {
        println!("{}", format!("{} has completed the interview", username).green());
    } else {
        println!("{}", format!("{} has not completed the interview", username).yellow());
    }
    Ok(completed)
}
