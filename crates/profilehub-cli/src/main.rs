//! profilehub - command-line client for profilehub accounts.
//!
//! Registers and logs in against the account API, keeps the session tokens
//! in the configured store, and shows or edits the user's bio and interests.

mod app;
mod command;
mod render;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use command::{Command, USAGE};

/// Directory for an additional rolling log file
const LOG_DIR_ENV: &str = "PROFILEHUB_LOG_DIR";

/// Log file name prefix inside `PROFILEHUB_LOG_DIR`
const LOG_FILE_PREFIX: &str = "profilehub.log";

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the file writer on drop and must be kept alive.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let log_guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            drop(log_guard);
            std::process::exit(2);
        }
    };
    info!(?command, "profilehub starting");

    let mut app = App::new()?;
    if let Err(e) = app.run(command).await {
        eprintln!("Error: {}", e);
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}
