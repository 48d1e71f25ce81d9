//! Sensu Mailer - mails Sensu check events.
//!
//! Reads one event (JSON) from standard input or `--event`, sends at most one
//! mail for it and prints a single status line on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use sensu_mailer::{
    cli::Cli,
    config::Config,
    core::Event,
    notification::smtp::SmtpSink,
    Mailer,
};
use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let event_path = cli.event.clone();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load_from_cli(cli).context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(
        smtp_address = %config.mailer.smtp_address,
        smtp_port = config.mailer.smtp_port,
        smtp_domain = %config.mailer.smtp_domain,
        tls = %config.mailer.tls,
        timeout_seconds = config.mailer.timeout_seconds,
        "Configuration loaded"
    );

    let event = match &event_path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open event file {}", path.display()))?;
            Event::from_reader(BufReader::new(file))
        }
        None => Event::from_reader(io::stdin().lock()),
    }
    .context("Failed to parse event")?;
    info!(short_name = %event.short_name(), action = %event.action, "Handling event");

    let mailer = Mailer::new(Arc::new(config.mailer), Arc::new(SmtpSink::new()));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    let result = runtime.block_on(mailer.handle(&event));
    // A timed-out send may still be blocked on the network; do not wait for it.
    runtime.shutdown_background();

    let delivery = result?;
    println!("{}", delivery);
    Ok(())
}
