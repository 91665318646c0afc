//! Vett CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vett::cli::delivery::DeliveryOptions;
use vett::cli::{commands, Cli, Commands};
use vett::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("vett={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = match &config_path {
        Some(path) => Settings::load_from(Some(path))?,
        None => Settings::load()?,
    };

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    match cli.command {
        Commands::Ask {
            query,
            tier,
            translate_to,
            speak,
            download,
            json,
            no_wait,
        } => {
            let options = DeliveryOptions {
                translate_to,
                speak,
                download,
            };
            commands::run_ask(&query, &tier, options, json, no_wait, settings).await?;
        }

        Commands::Summarize {
            input,
            tier,
            download,
        } => {
            commands::run_summarize(&input, &tier, download, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, config_path, settings)?;
        }

        Commands::Languages => {
            commands::run_languages();
        }
    }

    Ok(())
}
