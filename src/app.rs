//! Application orchestration and command routing.
//!
//! Parses the command line, loads configuration, builds the shared clients
//! once, and delegates to the command handlers.

use crate::commands;
use crate::config::RelayConfig;
use crate::handler::{StartJobHandler, TranscribeHandler};
use crate::logging;
use crate::server::AppState;
use crate::transcription::{AwsTranscribe, HttpTranscriptFetcher, TranscriptionService};
use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Runs AWS Transcribe jobs on request and returns the transcript
#[derive(Parser)]
#[command(name = "transcribe-relay")]
#[command(version)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/transcribe-relay/relay.toml\n    Overrides:          TRANSCRIBE_RELAY_LANGUAGE_CODE, TRANSCRIBE_RELAY_MEDIA_URI,\n                        TRANSCRIBE_RELAY_OUTPUT_BUCKET, TRANSCRIBE_RELAY_OUTPUT_KEY,\n                        TRANSCRIBE_RELAY_BIND\n    AWS credentials:    standard AWS provider chain"
)]
struct Cli {
    /// Path to the config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the handlers over HTTP
    ///
    /// POST /transcriptions        body {"audioFileUrl": "..."}; waits for the transcript
    /// POST /transcription-jobs    starts a job for the configured audio and returns
    /// GET  /health                liveness probe
    Serve {
        /// Address to listen on (overrides [server] bind)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Run one transcription invocation from an event document
    ///
    /// The event has the shape {"body": ...}, where body is a JSON string or
    /// object containing audioFileUrl. Prints the response envelope and exits
    /// with status 1 when the response is not 200.
    ///
    /// Examples:
    ///   transcribe-relay invoke event.json
    ///   echo '{"body":"{\"audioFileUrl\":\"s3://bucket/a.mp3\"}"}' | transcribe-relay invoke
    #[command(visible_alias = "i")]
    Invoke {
        /// Event file; reads stdin when omitted or "-"
        #[arg(value_name = "EVENT")]
        event: Option<PathBuf>,
    },

    /// Start a job for the configured audio and return immediately
    ///
    /// Uses [start_job] media_uri and output_bucket from the config file or
    /// the TRANSCRIBE_RELAY_* environment overrides.
    Start,

    /// Print the effective configuration
    Config,

    /// Show recent log entries (file logging only)
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long)]
        lines: Option<usize>,
    },

    /// Generate shell completion script
    ///
    /// Examples:
    ///   transcribe-relay completions bash > transcribe-relay.bash
    ///   transcribe-relay completions zsh > _transcribe-relay
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Builds the shared clients and both handlers from configuration.
///
/// # Errors
/// - If the HTTP client for transcript downloads cannot be created
pub async fn build_state(config: &RelayConfig) -> Result<AppState, anyhow::Error> {
    let service: Arc<dyn TranscriptionService> =
        Arc::new(AwsTranscribe::from_env(config.transcribe.region.as_deref()).await);
    let fetcher = Arc::new(HttpTranscriptFetcher::new(config.fetch.timeout())?);

    Ok(AppState {
        transcribe: TranscribeHandler::new(service.clone(), fetcher, config.transcribe_settings()),
        start: StartJobHandler::new(service, config.start_job_settings()),
    })
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: Handler returned an error response, or a general error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If configuration or logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        generate(*shell, &mut Cli::command(), "transcribe-relay", &mut io::stdout());
        return Ok(());
    }

    let mut config = RelayConfig::load(cli.config.as_deref())
        .map_err(|e| anyhow!("Configuration error: {e}"))?;

    if let Commands::Config = cli.command {
        return commands::handle_config(&config, cli.config.as_deref());
    }
    if let Commands::Logs { lines } = cli.command {
        return commands::handle_logs(&config, lines);
    }

    logging::init_logging(&config.logging)?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let state = build_state(&config).await?;
            commands::handle_serve(state, &config).await?;
        }
        Commands::Invoke { event } => {
            let state = build_state(&config).await?;
            let response = commands::handle_invoke(&state.transcribe, event.as_deref()).await?;
            if !response.is_success() {
                process::exit(1);
            }
        }
        Commands::Start => {
            let state = build_state(&config).await?;
            let response = commands::handle_start(&state.start).await?;
            if !response.is_success() {
                process::exit(1);
            }
        }
        Commands::Config | Commands::Logs { .. } | Commands::Completions { .. } => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
