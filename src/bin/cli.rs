//! CLI for talking to a running controller

use anyhow::Context;
use clap::{Parser, Subcommand};
use rendezvous::client::{ControllerClient, DEFAULT_URL};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rendezvous")]
#[command(about = "Publish and wait for values on a rendezvous controller")]
#[command(version)]
struct Cli {
    /// Controller URL
    #[arg(long, env = "RENDEZVOUS_URL", default_value = DEFAULT_URL)]
    controller: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for a key and print its value
    Get {
        /// Key
        key: String,
    },

    /// Set a key
    Set {
        /// Key
        key: String,

        /// Value (use --file to read it from disk)
        #[arg(conflicts_with = "file", required_unless_present = "file")]
        value: Option<String>,

        /// Read the value from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print every entry as JSON
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ControllerClient::new(cli.controller);

    match cli.command {
        Commands::Get { key } => {
            tracing::debug!("Waiting for {} on {}", key, client.base_url());
            let value = client.get(&key).await?;
            println!("{}", value);
        }

        Commands::Set { key, value, file } => {
            let value = match (value, file) {
                (Some(value), _) => value,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("either VALUE or --file is required"),
            };
            let echoed = client.set(&key, value).await?;
            println!("{}", echoed);
        }

        Commands::List => {
            let entries = client.list().await?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}
