//! Command-line interface definition for Interview Keeper
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for running an interview, checking completion,
//! saving explicit transcripts, uploading files to the archive, and
//! provisioning keyring passwords.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Interview Keeper - password-gated interview transcripts
///
/// Authenticates a participant, records the conversation, saves the
/// transcript locally, and archives it to Google Drive.
#[derive(Parser, Debug, Clone)]
#[command(name = "interview-keeper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the transcripts directory
    #[arg(long)]
    pub transcripts_dir: Option<PathBuf>,

    /// Skip the remote archive step
    #[arg(long)]
    pub no_archive: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Interview Keeper
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and record an interview interactively
    Interview,

    /// Report whether a user has already completed the interview
    Status {
        /// Username to check
        #[arg(short, long)]
        username: String,
    },

    /// Serialize an explicit message list (JSON) into a transcript
    Save {
        /// Username the transcript belongs to
        #[arg(short, long)]
        username: String,

        /// JSON file holding `[{"role": ..., "content": ...}]`
        #[arg(short, long)]
        input: PathBuf,

        /// RFC 3339 start time of the interview
        #[arg(long)]
        started_at: String,
    },

    /// Upload existing files to the configured archive folder
    Upload {
        /// Files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Store a user's login password in the OS keyring
    SetPassword {
        /// Username to provision
        #[arg(short, long)]
        username: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            transcripts_dir: None,
            no_archive: false,
            command: Commands::Interview,
        }
    }
}
