//! uiprobe - perception and resilience engine for UI test agents.
//!
//! Main entry point for the uiprobe CLI.

mod app;
mod cli;
mod commands;

use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use uiprobe_config::{ConfigLoader, LoggingConfig};

use crate::app::{App, CliResult, check_config};
use crate::cli::{Cli, Commands};

/// Console logging, plus daily-rotated files when `logging.dir` is set.
///
/// `RUST_LOG` overrides the configured level. Keep the returned guard alive
/// until exit so buffered file output is flushed.
fn init_tracing(config: &LoggingConfig) -> CliResult<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let console = fmt::layer().with_target(true).with_writer(std::io::stderr);

    let Some(dir) = &config.dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .init();
        return Ok(None);
    };

    let log_dir = ConfigLoader::expand_path(dir);
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("uiprobe")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    if let Commands::Validate = cli.command {
        return commands::run_validate(&cli.config);
    }

    let config = ConfigLoader::load_or_default(&cli.config)?;
    let _guard = init_tracing(&config.logging)?;
    check_config(&config)?;
    info!("uiprobe v{} using {}", env!("CARGO_PKG_VERSION"), cli.config.display());

    let app = App::new(config)?;
    let outcome = match cli.command {
        Commands::Match {
            screen,
            template,
            max_results,
        } => commands::run_match(&app, &screen, &template, max_results).await,
        Commands::Index { action } => commands::run_index(&app, action).await,
        Commands::Locate { query } => commands::run_locate(&app, &query).await,
        Commands::WaitFor {
            template,
            gone,
            timeout_ms,
        } => commands::run_wait_for(&app, &template, gone, timeout_ms).await,
        Commands::Validate => Ok(()),
    };
    app.report_usage();
    outcome
}
