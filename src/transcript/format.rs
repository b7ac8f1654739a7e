//! Transcript rendering and parsing
//!
//! Two layouts exist. `plain` is the canonical one:
//!
//! ```text
//! User: Hi
//! Assistant: Hello
//!
//! Interview Duration: 00:01:05
//! ```
//!
//! `timestamped` puts a header block first and stamps every line with the
//! UTC time the message was appended:
//!
//! ```text
//! Interview Start: 2024-01-01 10:00:00 UTC
//! Interview Duration: 1.08 minutes
//!
//! [10:00:03] User: Hi
//! [10:00:09] Assistant: Hello
//! ```

use crate::error::{InterviewError, Result};
use crate::session::Message;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DURATION_PREFIX: &str = "Interview Duration: ";
const START_PREFIX: &str = "Interview Start: ";
const END_PREFIX: &str = "Interview End: ";
const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Layout used when serializing a transcript
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptFormat {
    /// `Role: content` lines followed by an `HH:MM:SS` duration line
    #[default]
    Plain,
    /// Start/duration header followed by `[HH:MM:SS] Role: content` lines
    Timestamped,
}

impl fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptFormat::Plain => write!(f, "plain"),
            TranscriptFormat::Timestamped => write!(f, "timestamped"),
        }
    }
}

impl FromStr for TranscriptFormat {
    type Err = InterviewError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Ok(TranscriptFormat::Plain),
            "timestamped" => Ok(TranscriptFormat::Timestamped),
            other => Err(InterviewError::Config(format!(
                "Invalid transcript format: {}. Must be one of: plain, timestamped",
                other
            ))),
        }
    }
}

/// A transcript read back from its text form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTranscript {
    /// `(display role, content)` pairs in file order
    pub entries: Vec<(String, String)>,
    /// Raw value of the `Interview Duration:` line, if present
    pub duration: Option<String>,
    /// Raw value of the `Interview Start:` line, if present
    pub started_at: Option<String>,
}

/// Renders a role label for display: first letter upper case, rest lower case
///
/// # Examples
///
/// ```
/// use interview_keeper::transcript::display_role;
///
/// assert_eq!(display_role("assistant"), "Assistant");
/// assert_eq!(display_role("USER"), "User");
/// ```
pub fn display_role(role: &str) -> String {
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Formats a duration as `HH:MM:SS`; hours are not wrapped at 24
pub fn format_hms(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Formats a duration as minutes with two decimals
pub fn format_minutes(duration: Duration) -> String {
    let millis = duration.num_milliseconds().max(0);
    format!("{:.2}", millis as f64 / 60_000.0)
}

/// Renders messages and timing data into transcript text
///
/// Content is written verbatim. `ended_at` earlier than `started_at` is
/// treated as zero duration.
pub fn render(
    format: TranscriptFormat,
    messages: &[Message],
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
) -> String {
    let duration = (ended_at - started_at).max(Duration::zero());
    let mut out = String::new();

    match format {
        TranscriptFormat::Plain => {
            for message in messages {
                out.push_str(&display_role(&message.role));
                out.push_str(": ");
                out.push_str(&message.content);
                out.push('\n');
            }
            out.push('\n');
            out.push_str(DURATION_PREFIX);
            out.push_str(&format_hms(duration));
            out.push('\n');
        }
        TranscriptFormat::Timestamped => {
            out.push_str(START_PREFIX);
            out.push_str(&started_at.format(START_TIME_FORMAT).to_string());
            out.push('\n');
            out.push_str(DURATION_PREFIX);
            out.push_str(&format_minutes(duration));
            out.push_str(" minutes\n\n");
            for message in messages {
                out.push_str(&format!(
                    "[{}] {}: {}\n",
                    message.timestamp.format("%H:%M:%S"),
                    display_role(&message.role),
                    message.content
                ));
            }
        }
    }

    out
}

/// Renders the contents of a timing sidecar file
pub fn render_timing(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> String {
    let duration = (ended_at - started_at).max(Duration::zero());
    format!(
        "{}{}\n{}{}\n{}{}\n",
        START_PREFIX,
        started_at.format(START_TIME_FORMAT),
        END_PREFIX,
        ended_at.format(START_TIME_FORMAT),
        DURATION_PREFIX,
        format_hms(duration)
    )
}

/// Splits `Role: rest` at the first `": "`; any role text is accepted
fn split_record(line: &str) -> Option<(&str, &str)> {
    line.split_once(": ")
}

/// Strips a leading `[HH:MM:SS] ` stamp
fn strip_stamp(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let (stamp, rest) = rest.split_once("] ")?;
    if stamp.len() == 8 && stamp.chars().all(|c| c.is_ascii_digit() || c == ':') {
        Some(rest)
    } else {
        None
    }
}

/// Parses transcript text produced by [`render`]
///
/// In `plain` text every line holding a `": "` starts a new record and
/// other lines continue the previous message's content. In `timestamped`
/// text only stamped lines start a record. Lines are split on `\n` alone,
/// so a `\r` inside content survives.
///
/// # Errors
///
/// Returns [`InterviewError::Config`] for text with no duration line.
pub fn parse(text: &str) -> Result<ParsedTranscript> {
    let mut parsed = ParsedTranscript::default();
    let timestamped = text.starts_with(START_PREFIX);
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }

    if timestamped {
        let mut header_end = 0;
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                header_end = i + 1;
                break;
            }
            if let Some(v) = line.strip_prefix(START_PREFIX) {
                parsed.started_at = Some(v.to_string());
            } else if let Some(v) = line.strip_prefix(DURATION_PREFIX) {
                parsed.duration = Some(v.to_string());
            }
        }
        lines.drain(..header_end);
    } else {
        // Trailing block: blank line, duration line.
        if let Some(pos) = lines.iter().rposition(|l| l.starts_with(DURATION_PREFIX)) {
            parsed.duration = lines[pos]
                .strip_prefix(DURATION_PREFIX)
                .map(str::to_string);
            let mut cut = pos;
            if cut > 0 && lines[cut - 1].is_empty() {
                cut -= 1;
            }
            lines.truncate(cut);
        }
    }

    if parsed.duration.is_none() {
        return Err(InterviewError::Config("Transcript has no duration line".to_string()).into());
    }

    for line in lines {
        let body = if timestamped {
            strip_stamp(line)
        } else {
            Some(line)
        };
        match body.and_then(split_record) {
            Some((role, content)) => parsed.entries.push((role.to_string(), content.to_string())),
            None => match parsed.entries.last_mut() {
                Some((_, content)) => {
                    content.push('\n');
                    content.push_str(line);
                }
                None => {
                    return Err(InterviewError::Config(format!(
                        "Unexpected line before first message: {}",
                        line
                    ))
                    .into())
                }
            },
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap() + Duration::seconds(secs as i64)
    }

    fn msg(role: &str, content: &str, secs: u32) -> Message {
        Message {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: at(secs),
        }
    }

    #[test]
    fn test_display_role() {
        assert_eq!(display_role("user"), "User");
        assert_eq!(display_role("ASSISTANT"), "Assistant");
        assert_eq!(display_role("a"), "A");
        assert_eq!(display_role(""), "");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(Duration::seconds(65)), "00:01:05");
        assert_eq!(format_hms(Duration::seconds(3600 * 25 + 1)), "25:00:01");
        assert_eq!(format_hms(Duration::seconds(-5)), "00:00:00");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(Duration::seconds(65)), "1.08");
        assert_eq!(format_minutes(Duration::zero()), "0.00");
    }

    #[test]
    fn test_render_plain() {
        let messages = vec![msg("user", "Hi", 1), msg("assistant", "Hello", 2)];
        let text = render(TranscriptFormat::Plain, &messages, at(0), at(65));
        assert_eq!(
            text,
            "User: Hi\nAssistant: Hello\n\nInterview Duration: 00:01:05\n"
        );
    }

    #[test]
    fn test_render_timestamped() {
        let messages = vec![msg("user", "Hi", 3), msg("assistant", "Hello", 9)];
        let text = render(TranscriptFormat::Timestamped, &messages, at(0), at(65));
        assert_eq!(
            text,
            "Interview Start: 2024-01-01 10:00:00 UTC\n\
             Interview Duration: 1.08 minutes\n\n\
             [10:00:03] User: Hi\n\
             [10:00:09] Assistant: Hello\n"
        );
    }

    #[test]
    fn test_render_content_is_verbatim() {
        let messages = vec![msg("user", "  <b>&amp; \"quoted\" 100%  ", 0)];
        let text = render(TranscriptFormat::Plain, &messages, at(0), at(1));
        assert!(text.starts_with("User:   <b>&amp; \"quoted\" 100%  \n"));
    }

    #[test]
    fn test_render_empty_transcript() {
        let text = render(TranscriptFormat::Plain, &[], at(0), at(0));
        assert_eq!(text, "\nInterview Duration: 00:00:00\n");
        let parsed = parse(&text).unwrap();
        assert!(parsed.entries.is_empty());
    }

    #[test]
    fn test_parse_recovers_entries_in_order() {
        let messages = vec![
            msg("user", "Hi: there", 1),
            msg("assistant", "Line one\nline two", 2),
            msg("user", "", 3),
        ];
        for format in [TranscriptFormat::Plain, TranscriptFormat::Timestamped] {
            let text = render(format, &messages, at(0), at(65));
            let parsed = parse(&text).unwrap();
            assert_eq!(
                parsed.entries,
                vec![
                    ("User".to_string(), "Hi: there".to_string()),
                    ("Assistant".to_string(), "Line one\nline two".to_string()),
                    ("User".to_string(), String::new()),
                ],
                "format {}",
                format
            );
        }
    }

    #[test]
    fn test_parse_round_trips_unusual_roles() {
        let messages = vec![
            msg("user", "first", 1),
            msg("hiring manager", "second", 2),
            msg("", "third", 3),
            msg("42", "fourth", 4),
            msg("user", "carriage\r", 5),
        ];
        for format in [TranscriptFormat::Plain, TranscriptFormat::Timestamped] {
            let parsed = parse(&render(format, &messages, at(0), at(65))).unwrap();
            assert_eq!(
                parsed.entries,
                vec![
                    ("User".to_string(), "first".to_string()),
                    ("Hiring manager".to_string(), "second".to_string()),
                    (String::new(), "third".to_string()),
                    ("42".to_string(), "fourth".to_string()),
                    ("User".to_string(), "carriage\r".to_string()),
                ],
                "format {}",
                format
            );
        }
    }

    #[test]
    fn test_parse_keeps_trailing_newline_of_last_content() {
        let messages = vec![msg("user", "ends with newline\n", 1)];
        let parsed = parse(&render(TranscriptFormat::Plain, &messages, at(0), at(1))).unwrap();
        assert_eq!(
            parsed.entries,
            vec![("User".to_string(), "ends with newline\n".to_string())]
        );
    }

    #[test]
    fn test_parse_duration_fields() {
        let messages = vec![msg("user", "Hi", 1)];
        let plain = parse(&render(TranscriptFormat::Plain, &messages, at(0), at(65))).unwrap();
        assert_eq!(plain.duration.as_deref(), Some("00:01:05"));
        assert_eq!(plain.started_at, None);

        let stamped =
            parse(&render(TranscriptFormat::Timestamped, &messages, at(0), at(65))).unwrap();
        assert_eq!(stamped.duration.as_deref(), Some("1.08 minutes"));
        assert_eq!(
            stamped.started_at.as_deref(),
            Some("2024-01-01 10:00:00 UTC")
        );
    }

    #[test]
    fn test_parse_rejects_text_without_duration() {
        assert!(parse("User: Hi\n").is_err());
    }

    #[test]
    fn test_render_timing() {
        let text = render_timing(at(0), at(65));
        assert!(text.contains("Interview Start: 2024-01-01 10:00:00 UTC"));
        assert!(text.contains("Interview End: 2024-01-01 10:01:05 UTC"));
        assert!(text.contains("Interview Duration: 00:01:05"));
    }

    #[test]
    fn test_transcript_format_from_str() {
        assert_eq!(
            "Plain".parse::<TranscriptFormat>().unwrap(),
            TranscriptFormat::Plain
        );
        assert_eq!(
            "timestamped".parse::<TranscriptFormat>().unwrap(),
            TranscriptFormat::Timestamped
        );
        assert!("csv".parse::<TranscriptFormat>().is_err());
    }
}
