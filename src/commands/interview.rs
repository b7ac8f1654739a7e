//! Interactive interview handler.
//!
//! Prompts for credentials until a login succeeds, refuses users who have
//! already completed the interview, then records messages until `/end`
//! saves the transcript and archives it.

use crate::auth::{secret_store_from_config, CredentialVerifier};
use crate::commands::archive_saved;
use crate::completion::CompletionOracle;
use crate::config::Config;
use crate::error::{InterviewError, Result};
use crate::session::Session;
use crate::transcript::TranscriptWriter;
use colored::Colorize;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};
use zeroize::Zeroizing;

/// Line editor helper that renders input as `*` while masking is on
#[derive(Default)]
pub struct InputHelper {
    masking: bool,
}

impl InputHelper {
    /// Helper that masks every line
    pub fn masked() -> Self {
        Self { masking: true }
    }
}

impl Completer for InputHelper {
    type Candidate = String;
}

impl Hinter for InputHelper {
    type Hint = String;
}

impl Validator for InputHelper {}

impl Highlighter for InputHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            Owned("*".repeat(line.chars().count()))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.masking
    }
}

impl Helper for InputHelper {}

pub(crate) type InterviewEditor = Editor<InputHelper, DefaultHistory>;

/// One parsed line of interview input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewInput {
    /// Blank line
    Empty,
    /// Message to append
    Message {
        /// Speaker label
        role: String,
        /// Message text
        content: String,
    },
    /// Save and finish the interview
    End,
    /// Leave without saving
    Quit,
    /// Show message count and elapsed time
    Status,
    /// Show available commands
    Help,
    /// Unrecognised slash command
    Unknown(String),
}

/// Parses one input line
///
/// Plain lines are `user` messages; `/as <role> <text>` records any role.
pub fn parse_input(line: &str) -> InterviewInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InterviewInput::Empty;
    }
    if !trimmed.starts_with('/') {
        return InterviewInput::Message {
            role: "user".to_string(),
            content: line.trim_end_matches(['\r', '\n']).to_string(),
        };
    }

    let (command, rest) = trimmed.split_once(char::is_whitespace).unwrap_or((trimmed, ""));
    match command {
        "/end" | "/save" => InterviewInput::End,
        "/quit" | "/exit" => InterviewInput::Quit,
        "/status" => InterviewInput::Status,
        "/help" => InterviewInput::Help,
        "/as" => match rest.trim_start().split_once(char::is_whitespace) {
            Some((role, content)) if !content.trim().is_empty() => InterviewInput::Message {
                role: role.to_string(),
                content: content.trim_start().to_string(),
            },
            _ => InterviewInput::Unknown(trimmed.to_string()),
        },
        _ => InterviewInput::Unknown(trimmed.to_string()),
    }
}

fn print_help() {
    println!("{}", "Interview commands:".bold());
    println!("  <text>              record a message from the user");
    println!("  /as <role> <text>   record a message with any role");
    println!("  /status             show message count and elapsed time");
    println!("  /end                save the transcript and finish");
    println!("  /quit               leave without saving");
}

/// Prompts until a login succeeds; `None` when the user gives up
fn prompt_login(
    rl: &mut InterviewEditor,
    verifier: &CredentialVerifier,
) -> Result<Option<Session>> {
    loop {
        let username = match rl.readline("Username: ") {
            Ok(line) => line.trim().to_string(),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if username.is_empty() {
            continue;
        }

        if let Some(helper) = rl.helper_mut() {
            helper.masking = true;
        }
        let password = rl.readline("Password: ");
        if let Some(helper) = rl.helper_mut() {
            helper.masking = false;
        }
        let password = match password {
            Ok(line) => Zeroizing::new(line),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match verifier.login(&username, password) {
            Ok(session) => {
                println!("{}", format!("Logged in as {}", username).green());
                return Ok(Some(session));
            }
            Err(e) => match e.downcast_ref::<InterviewError>() {
                Some(InterviewError::AuthenticationRejected) => {
                    println!("{}", "User or password incorrect".red());
                }
                _ => return Err(e),
            },
        }
    }
}

/// Records messages until the user ends or quits; `true` means save
fn record_messages(rl: &mut InterviewEditor, session: &mut Session) -> Result<bool> {
    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("{}", "Input closed, saving transcript".yellow());
                return Ok(true);
            }
            Err(e) => return Err(e.into()),
        };

        match parse_input(&line) {
            InterviewInput::Empty => continue,
            InterviewInput::Message { role, content } => {
                rl.add_history_entry(line.as_str())?;
                tracing::debug!(role = %role, "Message recorded");
                session.append(role, content);
            }
            InterviewInput::End => return Ok(true),
            InterviewInput::Quit => return Ok(false),
            InterviewInput::Status => {
                let elapsed = session.elapsed()?;
                println!(
                    "{} messages, {} elapsed",
                    session.len(),
                    crate::transcript::format_hms(elapsed)
                );
            }
            InterviewInput::Help => print_help(),
            InterviewInput::Unknown(cmd) => {
                println!("{}", format!("Unknown command: {} (try /help)", cmd).yellow());
            }
        }
    }
}

/// Runs an interactive interview
///
/// # Errors
///
/// Returns error if the terminal cannot be read, the transcript cannot be
/// written, or the archive upload fails. A failed upload leaves the local
/// transcript in place.
pub async fn run_interview(config: Config) -> Result<()> {
    let verifier = CredentialVerifier::new(secret_store_from_config(&config.auth));
    let oracle = CompletionOracle::new(&config.transcripts);
    let writer = TranscriptWriter::new(&config.transcripts);

    let mut rl: InterviewEditor = Editor::new()?;
    rl.set_helper(Some(InputHelper::default()));

    let Some(mut session) = prompt_login(&mut rl, &verifier)? else {
        println!("Login cancelled");
        return Ok(());
    };

    if oracle.completed(session.username()) {
        println!(
            "{}",
            "You have already completed the interview. Thank you!".yellow()
        );
        return Ok(());
    }

    println!("Type /help for commands. Finish with /end.");
    if !record_messages(&mut rl, &mut session)? {
        tracing::info!(username = %session.username(), "Interview abandoned without saving");
        println!("Interview abandoned, nothing saved");
        return Ok(());
    }

    let saved = writer.save(&session)?;
    println!(
        "{}",
        format!("Transcript saved: {}", saved.transcript_path.display()).green()
    );

    archive_saved(&config, &saved).await?;
    Ok(())
}
