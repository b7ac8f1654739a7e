//! Interview session state
//!
//! A [`Session`] is created when a participant logs in and is owned by the
//! code driving the interview. Messages are append-only; the session is read
//! once at save time by the transcript writer.

use crate::error::{InterviewError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One conversation turn
///
/// # Examples
///
/// ```
/// use interview_keeper::session::Message;
///
/// let msg = Message::new("assistant", "Welcome to the interview.");
/// assert_eq!(msg.role, "assistant");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Speaker label, e.g. `user` or `assistant`
    pub role: String,
    /// Message text, stored verbatim
    pub content: String,
    /// Wall-clock time the message was appended
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped with the current time
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Creates an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// Checks that `username` is usable as a transcript file name stem
///
/// Empty names, path separators, NUL and `..` are rejected.
///
/// # Errors
///
/// Returns [`InterviewError::InvalidUsername`].
pub fn validate_username(username: &str) -> Result<()> {
    let invalid = username.trim().is_empty()
        || username.contains(['/', '\\', '\0'])
        || username.contains("..");
    if invalid {
        return Err(InterviewError::InvalidUsername(username.to_string()).into());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct StartTime {
    wall: DateTime<Utc>,
    // Only present for sessions started in this process.
    monotonic: Option<Instant>,
}

/// State of one authenticated participant's interview
///
/// # Examples
///
/// ```
/// use interview_keeper::session::Session;
///
/// let mut session = Session::start("alice");
/// session.append("assistant", "Hello!");
/// session.append("user", "Hi");
/// assert_eq!(session.len(), 2);
/// assert!(session.elapsed().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    username: String,
    authenticated: bool,
    start: Option<StartTime>,
    messages: Vec<Message>,
}

impl Session {
    /// Creates a session that has not started its clock yet
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            authenticated: false,
            start: None,
            messages: Vec::new(),
        }
    }

    /// Creates an authenticated session whose clock starts now
    pub fn start(username: impl Into<String>) -> Self {
        let mut session = Self::new(username);
        session.authenticated = true;
        session.begin();
        session
    }

    /// Rebuilds a session from an explicit start time and message list
    ///
    /// Used by callers outside a live session; duration is measured with the
    /// wall clock.
    pub fn restore(
        username: impl Into<String>,
        started_at: DateTime<Utc>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            username: username.into(),
            authenticated: true,
            start: Some(StartTime {
                wall: started_at,
                monotonic: None,
            }),
            messages,
        }
    }

    /// Starts the session clock; later calls keep the original start time
    pub fn begin(&mut self) -> DateTime<Utc> {
        let start = self.start.get_or_insert_with(|| StartTime {
            wall: Utc::now(),
            monotonic: Some(Instant::now()),
        });
        start.wall
    }

    /// Username the session belongs to
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether the session was created through a successful login
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Wall-clock start time, if the clock has started
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.start.map(|s| s.wall)
    }

    /// Appends one message to the log
    ///
    /// The role is not validated; any label is accepted.
    pub fn append(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    /// Appends a pre-built message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Messages in the order they were appended
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of recorded messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no messages have been recorded
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Time since the session started
    ///
    /// # Errors
    ///
    /// Returns [`InterviewError::SessionNotStarted`] if the clock was never
    /// started.
    pub fn elapsed(&self) -> Result<Duration> {
        let start = self.start.ok_or(InterviewError::SessionNotStarted)?;
        let elapsed = match start.monotonic {
            Some(instant) => Duration::from_std(instant.elapsed()).unwrap_or(Duration::MAX),
            None => Utc::now() - start.wall,
        };
        Ok(elapsed.max(Duration::zero()))
    }
}
