use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::session::CleanupConfig;

pub const BIND_ADDR_VAR: &str = "ULTISCORE_BIND_ADDR";
pub const SNAPSHOT_DIR_VAR: &str = "ULTISCORE_SNAPSHOT_DIR";
pub const CLEANUP_INTERVAL_VAR: &str = "ULTISCORE_CLEANUP_INTERVAL_SECS";
pub const IDLE_TIMEOUT_VAR: &str = "ULTISCORE_IDLE_TIMEOUT_SECS";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LOG_FILTER: &str = "ultiscore=debug,tower_http=debug";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a socket address: {value:?}")]
    InvalidBindAddr { var: &'static str, value: String },

    #[error("{var} is set but empty")]
    EmptySnapshotDir { var: &'static str },

    #[error("{var} must be a positive number of seconds: {value:?}")]
    InvalidDuration { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Sessions are kept in memory only when unset
    pub snapshot_dir: Option<PathBuf>,
    pub cleanup_interval: Duration,
    /// Untouched sessions leave memory after this long
    pub idle_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr {
                var: BIND_ADDR_VAR,
                value: raw_addr.clone(),
            })?;

        let snapshot_dir = match lookup(SNAPSHOT_DIR_VAR) {
            Some(dir) if dir.trim().is_empty() => {
                return Err(ConfigError::EmptySnapshotDir {
                    var: SNAPSHOT_DIR_VAR,
                })
            }
            Some(dir) => Some(PathBuf::from(dir.trim())),
            None => None,
        };

        let defaults = CleanupConfig::default();
        let cleanup_interval =
            seconds_from(&lookup, CLEANUP_INTERVAL_VAR, defaults.cleanup_interval)?;
        let idle_timeout = seconds_from(&lookup, IDLE_TIMEOUT_VAR, defaults.idle_threshold)?;

        Ok(Self {
            bind_addr,
            snapshot_dir,
            cleanup_interval,
            idle_timeout,
        })
    }

    /// Without a snapshot directory an evicted session has nowhere to come
    /// back from, so its in-memory snapshot goes too.
    pub fn cleanup(&self) -> CleanupConfig {
        CleanupConfig {
            cleanup_interval: self.cleanup_interval,
            idle_threshold: self.idle_timeout,
            discard_snapshots: self.snapshot_dir.is_none(),
        }
    }
}

fn seconds_from<F>(lookup: &F, var: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    let parsed = raw.trim().parse::<u64>();
    match parsed {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidDuration { var, value: raw }),
    }
}
