//! Subvox - Video Subtitling Service
//!
//! Main entry point: parses the CLI, wires up logging and configuration, and
//! either starts the HTTP server or runs a one-shot processing command.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use subvox::account::AccountService;
use subvox::cli::{Args, Commands};
use subvox::config::Config;
use subvox::server;
use subvox::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Log to both console and a daily-rolling file
    let _guard = setup_logging(args.verbose);

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            info!("Starting Subvox server");
            let workflow = Arc::new(Workflow::new(config.clone())?);
            let accounts = Arc::new(AccountService::new(config.auth.clone())?);
            server::serve(&config, workflow, accounts).await?;
        }

        Commands::Process {
            input,
            language,
            source_lang,
            burn,
        } => {
            let workflow = Workflow::new(config)?;
            let outcome = workflow
                .process_video(&input, &language, source_lang.as_deref(), burn)
                .await?;

            println!(
                "Generated {} subtitle cue(s) ({:?}) -> {}",
                outcome.subtitles.len(),
                outcome.translation,
                outcome.srt_file
            );
            if let Some(video) = outcome.burned_video {
                println!("Burned video: {}", video);
            }
            if let Some(err) = outcome.burn_error {
                eprintln!("Subtitle burn-in failed: {}", err);
            }
        }

        Commands::Extract { input, output } => {
            let workflow = Workflow::new(config)?;
            workflow.extract_audio(&input, &output).await?;
            println!("Audio extracted to {}", output.display());
        }

        Commands::Transcribe {
            input,
            output,
            language,
        } => {
            let workflow = Workflow::new(config)?;
            workflow
                .transcribe_audio(&input, &output, language.as_deref())
                .await?;
            println!("Transcript written to {}", output.display());
        }

        Commands::Burn {
            video,
            subtitles,
            output,
        } => {
            let workflow = Workflow::new(config)?;
            workflow.burn_subtitles(&video, &subtitles, &output).await?;
            println!("Subtitled video written to {}", output.display());
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = rolling::daily("logs", "subvox.log");
    let (file_writer, guard) = non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    guard
}
