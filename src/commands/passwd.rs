//! Keyring password provisioning handler.
//!
//! Only meaningful with `auth.secret_source: keyring`; the config-file
//! password table is edited directly.

use crate::auth::KeyringSecretStore;
use crate::commands::interview::{InputHelper, InterviewEditor};
use crate::config::{Config, SecretSource};
use crate::error::{InterviewError, Result};
use crate::session::validate_username;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use zeroize::Zeroizing;

/// Checks a new password and its confirmation
///
/// # Errors
///
/// Returns [`InterviewError::Config`] for an empty password or a mismatch.
pub fn check_new_password(password: &str, confirmation: &str) -> Result<()> {
    if password.is_empty() {
        return Err(InterviewError::Config("Password cannot be empty".to_string()).into());
    }
    if password != confirmation {
        return Err(InterviewError::Config("Passwords do not match".to_string()).into());
    }
    Ok(())
}

fn read_masked(rl: &mut InterviewEditor, prompt: &str) -> Result<Option<Zeroizing<String>>> {
    match rl.readline(prompt) {
        Ok(line) => Ok(Some(Zeroizing::new(line))),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Prompts twice for a password and stores it for `username`
///
/// # Errors
///
/// Returns error if the username is invalid, the secret source is not the
/// keyring, the passwords differ, or the keyring write fails.
pub fn run_set_password(config: Config, username: &str) -> Result<()> {
    validate_username(username)?;
    if config.auth.secret_source != SecretSource::Keyring {
        return Err(InterviewError::Config(
            "set-password requires auth.secret_source: keyring".to_string(),
        )
        .into());
    }

    let mut rl: InterviewEditor = Editor::new()?;
    rl.set_helper(Some(InputHelper::masked()));

    let Some(password) = read_masked(&mut rl, "New password: ")? else {
        println!("Cancelled");
        return Ok(());
    };
    let Some(confirmation) = read_masked(&mut rl, "Confirm password: ")? else {
        println!("Cancelled");
        return Ok(());
    };
    check_new_password(&password, &confirmation)?;

    KeyringSecretStore::new(config.auth.keyring_service.clone()).set_secret(username, &password)?;
    tracing::info!(username = %username, service = %config.auth.keyring_service, "Keyring password stored");
    println!("{}", format!("Password stored for {}", username).green());
    Ok(())
}
