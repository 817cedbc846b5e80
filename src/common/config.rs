//! Configuration for the rendezvous controller

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the optional TOML config file
pub const CONFIG_ENV: &str = "RENDEZVOUS_CONFIG";

/// Prefix for per-field environment overrides (`RENDEZVOUS_BIND_ADDR`, ...)
pub const ENV_PREFIX: &str = "RENDEZVOUS";

const DEFAULT_CONFIG_FILE: &str = "rendezvous.toml";

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Bind address for the HTTP API
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Write every POST through to the snapshot file and load it at startup
    #[serde(default = "default_persist")]
    pub persist: bool,

    /// Snapshot file (JSON object of key → value)
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Delay between re-checks of a blocking read
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Logging level, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 6001))
}
fn default_persist() -> bool {
    true
}
fn default_state_file() -> PathBuf {
    PathBuf::from("state.json")
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            persist: default_persist(),
            state_file: default_state_file(),
            poll_interval_ms: default_poll_interval_ms(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load config from the file named by `RENDEZVOUS_CONFIG` (if it exists),
    /// then apply `RENDEZVOUS_*` environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Same as [`Config::load`] with an explicit file path. A missing file is
    /// not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.persist && self.state_file.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "state_file must be set when persistence is enabled".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Snapshot path, if persistence is enabled
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.persist.then_some(self.state_file.as_path())
    }
}
