//! Transcript serialization
//!
//! - `format`: rendering and parsing of transcript text
//! - `writer`: atomic persistence under the transcripts directory

pub mod format;
pub mod writer;

pub use format::{
    display_role, format_hms, format_minutes, parse, render, ParsedTranscript, TranscriptFormat,
};
pub use writer::{SavedTranscript, TranscriptWriter};
