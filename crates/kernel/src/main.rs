//! Palika editor CLI
//!
//! Headless access to the article content store.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use palika_kernel::cli::{self, Cli};
use palika_kernel::config::Config;

fn main() -> Result<ExitCode> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    debug!(
        default_language = %config.default_language,
        integrity = config.integrity.as_str(),
        "configuration loaded"
    );

    let mut stdout = io::stdout().lock();
    let clean = cli::run(cli.command, &config, &mut stdout)?;
    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Log to stderr so stdout stays clean for JSON and HTML output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
