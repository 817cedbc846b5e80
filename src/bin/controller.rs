//! Controller binary

use anyhow::Context;
use clap::{Parser, Subcommand};
use rendezvous::common::{parse_duration, Config};
use rendezvous::Controller;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rendezvous-controller")]
#[command(about = "Key-value rendezvous point with blocking reads")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the controller
    Serve {
        /// Bind address for HTTP (default 0.0.0.0:6001)
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Snapshot file (default ./state.json)
        #[arg(long)]
        state_file: Option<PathBuf>,

        /// Keep state in memory only
        #[arg(long)]
        ephemeral: bool,

        /// Delay between re-checks of a blocking read (e.g. 500ms, 1s)
        #[arg(long, value_parser = parse_poll_interval)]
        poll_interval: Option<Duration>,
    },
}

fn parse_poll_interval(s: &str) -> Result<Duration, String> {
    match parse_duration(s) {
        Ok(d) if d.is_zero() => Err("poll interval must be greater than zero".to_string()),
        Ok(d) => Ok(d),
        Err(e) => Err(e.to_string()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // File and environment first, CLI flags take priority
    let mut config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve {
            bind,
            state_file,
            ephemeral,
            poll_interval,
        } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(state_file) = state_file {
                config.state_file = state_file;
            }
            if ephemeral {
                config.persist = false;
            }
            if let Some(interval) = poll_interval {
                config.poll_interval_ms = interval.as_millis().try_into().unwrap_or(u64::MAX);
            }
            config.validate()?;

            Controller::new(config).serve().await?;
        }
    }

    Ok(())
}
