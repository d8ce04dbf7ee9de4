use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use homework_bot::config::Config;
use homework_bot::poller::{Poller, SystemClock};
use homework_bot::practicum::PracticumClient;
use homework_bot::telegram::TelegramMessenger;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML settings file; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Unix timestamp to start polling from (defaults to now)
    #[arg(long)]
    from_date: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let cfg = Config::from_env(args.config.as_deref())?;

    let log_file = File::create(&cfg.settings.log_file)
        .with_context(|| format!("failed to open log file {}", cfg.settings.log_file))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_target(false)
        .init();

    cfg.secrets.check()?;

    let api = PracticumClient::from_settings(cfg.secrets.practicum_token.clone(), &cfg.settings)?;
    let messenger = TelegramMessenger::new(cfg.secrets.telegram_token.clone());
    let mut poller = Poller::new(
        &cfg,
        Arc::new(api),
        Arc::new(messenger),
        Arc::new(SystemClock),
    );
    if let Some(from_date) = args.from_date {
        poller = poller.with_cursor(from_date);
    }

    info!(
        cursor = poller.state().cursor_timestamp,
        retry_period_secs = cfg.settings.retry_period_secs,
        "starting homework status polling"
    );
    poller.run(None).await?;
    Ok(())
}
