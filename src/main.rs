//! Interview Keeper - password-gated interview transcripts
//!
//! Main entry point for the interview-keeper binary.

use std::process::ExitCode;

use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use interview_keeper::cli::{Cli, Commands};
use interview_keeper::commands;
use interview_keeper::config::Config;
use interview_keeper::Result;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Failures are printed here and nowhere else.
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("{}", format!("Error: {}", e).red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Interview => {
            tracing::info!("Starting interactive interview");
            commands::interview::run_interview(config).await
        }
        Commands::Status { username } => {
            tracing::info!("Checking completion status");
            commands::status::show_status(&config, &username)?;
            Ok(())
        }
        Commands::Save {
            username,
            input,
            started_at,
        } => {
            tracing::info!("Saving transcript from {}", input.display());
            commands::save::run_save(config, username, &input, &started_at).await
        }
        Commands::Upload { paths } => {
            tracing::info!("Starting archive upload");
            commands::upload::run_upload(config, paths).await
        }
        Commands::SetPassword { username } => {
            tracing::info!("Storing a keyring password");
            commands::passwd::run_set_password(config, &username)
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "interview_keeper=debug"
    } else {
        "interview_keeper=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
