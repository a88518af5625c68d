//! vidseek CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vidseek::cli::commands::{self, ImportArgs};
use vidseek::cli::{Cli, Commands};
use vidseek::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref().map(Settings::expand_path);

    // Load configuration
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("vidseek={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    // Ensure the data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match cli.command {
        Commands::Import {
            url,
            title,
            transcript,
            description,
            summary,
            upload_date,
            duration,
            tags,
            index,
        } => {
            let args = ImportArgs {
                url,
                title,
                transcript,
                description,
                summary,
                upload_date,
                duration,
                tags,
                index,
            };
            commands::run_import(args, settings).await?;
        }

        Commands::Index { video_id, all } => {
            commands::run_index(video_id, all, settings).await?;
        }

        Commands::Search { query, json } => {
            commands::run_search(&query, json, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Show { video_id } => {
            commands::run_show(video_id, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, config_path, settings)?;
        }
    }

    Ok(())
}
