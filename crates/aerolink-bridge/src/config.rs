//! Connection configuration – read from a TOML file, overridable through
//! `AEROLINK_*` environment variables.
//!
//! The values are opaque to the bridge itself; they are handed to
//! [`FlightBackend::connect`][crate::backend::FlightBackend::connect] as is,
//! except for `action_timeout_secs` which the adapter applies to every bound
//! command.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config at {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parameters for one backend connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Address the backend listens on for the vehicle link,
    /// e.g. `udp://:14540`.
    #[serde(default = "default_system_address")]
    pub system_address: String,

    /// Host of the backend's control server.
    #[serde(default = "default_server_host")]
    pub server_host: String,

    /// Port of the backend's control server.
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    /// Abandon a command when the backend has not answered after this many
    /// seconds. Unset means wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_timeout_secs: Option<u64>,
}

fn default_system_address() -> String {
    "udp://:14540".to_string()
}
fn default_server_host() -> String {
    "127.0.0.1".to_string()
}
fn default_server_port() -> u16 {
    50051
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            system_address: default_system_address(),
            server_host: default_server_host(),
            server_port: default_server_port(),
            action_timeout_secs: None,
        }
    }
}

impl ConnectionConfig {
    pub fn action_timeout(&self) -> Option<Duration> {
        self.action_timeout_secs.map(Duration::from_secs)
    }

    /// Load from `path` and apply environment overrides. Returns `Ok(None)`
    /// when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut cfg: ConnectionConfig = toml::from_str(&raw)?;
        cfg.apply_env_overrides();
        Ok(Some(cfg))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, raw).map_err(write_err)
    }

    /// Apply `AEROLINK_*` environment variable overrides.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `AEROLINK_SYSTEM_ADDRESS` | `system_address` |
    /// | `AEROLINK_SERVER_HOST` | `server_host` |
    /// | `AEROLINK_SERVER_PORT` | `server_port` |
    /// | `AEROLINK_ACTION_TIMEOUT_SECS` | `action_timeout_secs` |
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("AEROLINK_SYSTEM_ADDRESS") {
            self.system_address = v;
        }
        if let Some(v) = lookup("AEROLINK_SERVER_HOST") {
            self.server_host = v;
        }
        if let Some(v) = lookup("AEROLINK_SERVER_PORT")
            && let Ok(port) = v.parse::<u16>()
        {
            self.server_port = port;
        }
        if let Some(v) = lookup("AEROLINK_ACTION_TIMEOUT_SECS")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.action_timeout_secs = Some(secs);
        }
    }
}
