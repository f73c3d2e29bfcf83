//! TOML configuration file.
//!
//! Reads [`AppConfig`] from an explicit path or from the platform default:
//! - Windows:  `%APPDATA%\ClipSync\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/clipsync/config.toml` or `~/.config/clipsync/config.toml`
//! - macOS:    `~/Library/Application Support/ClipSync/config.toml`
//!
//! ```toml
//! [peer]
//! address = "192.168.1.100"
//! listen_port = 9999
//! bind_address = "0.0.0.0"
//!
//! [sync]
//! poll_interval_ms = 500
//! keepalive_interval_ms = 10000
//! connect_timeout_ms = 3000
//! send_timeout_ms = 10000
//! backoff_floor_ms = 500
//! backoff_cap_ms = 8000
//! sync_on_start = false
//!
//! [log]
//! level = "info"
//! ```
//!
//! Every section and field is optional.  A missing file is not an error and
//! yields [`AppConfig::default()`]; a file that exists but cannot be read or
//! parsed is.  Command-line flags override whatever is loaded here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::settings::{ConnectorSettings, DEFAULT_LISTEN_PORT};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is not usable.
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub peer: PeerConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Where to connect and where to listen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeerConfig {
    /// The other machine, as `host`, `host:port`, or an IPv6 literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Local TCP port to accept the peer's connections on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Local IP to bind.  `"0.0.0.0"` accepts on every interface.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

/// Polling and connection timing, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
    #[serde(default = "default_backoff_floor_ms")]
    pub backoff_floor_ms: u64,
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
    /// Send the clipboard found at startup instead of only recording it.
    #[serde(default)]
    pub sync_on_start: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// `tracing` filter used when `RUST_LOG` is not set, e.g. `"info"` or
    /// `"clipsync_peer=debug"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_listen_port() -> u16 {
    DEFAULT_LISTEN_PORT
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_poll_interval_ms() -> u64 {
    500
}
fn default_keepalive_interval_ms() -> u64 {
    10_000
}
fn default_connect_timeout_ms() -> u64 {
    3_000
}
fn default_send_timeout_ms() -> u64 {
    10_000
}
fn default_backoff_floor_ms() -> u64 {
    500
}
fn default_backoff_cap_ms() -> u64 {
    8_000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            address: None,
            listen_port: default_listen_port(),
            bind_address: default_bind_address(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            keepalive_interval_ms: default_keepalive_interval_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            send_timeout_ms: default_send_timeout_ms(),
            backoff_floor_ms: default_backoff_floor_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            sync_on_start: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval_ms)
    }

    /// Connector timings from this section.
    pub fn connector_settings(&self) -> ConnectorSettings {
        ConnectorSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            send_timeout: Duration::from_millis(self.send_timeout_ms),
            keepalive_interval: self.keepalive_interval(),
            backoff_floor: Duration::from_millis(self.backoff_floor_ms),
            backoff_cap: Duration::from_millis(self.backoff_cap_ms),
        }
    }
}

impl AppConfig {
    /// Rejects values that parse but cannot drive the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timings = [
            ("sync.poll_interval_ms", self.sync.poll_interval_ms),
            ("sync.keepalive_interval_ms", self.sync.keepalive_interval_ms),
            ("sync.connect_timeout_ms", self.sync.connect_timeout_ms),
            ("sync.send_timeout_ms", self.sync.send_timeout_ms),
            ("sync.backoff_floor_ms", self.sync.backoff_floor_ms),
        ];
        for (field, value) in timings {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if self.sync.backoff_cap_ms < self.sync.backoff_floor_ms {
            return Err(ConfigError::Invalid {
                field: "sync.backoff_cap_ms",
                reason: format!(
                    "{} is below backoff_floor_ms ({})",
                    self.sync.backoff_cap_ms, self.sync.backoff_floor_ms
                ),
            });
        }
        if self.peer.listen_port == 0 {
            return Err(ConfigError::Invalid {
                field: "peer.listen_port",
                reason: "must be between 1 and 65535".to_string(),
            });
        }
        Ok(())
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the platform default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory
/// cannot be determined from the environment.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the config from the platform default location.
///
/// No platform directory (e.g. `HOME` unset in a service environment) is
/// treated like a missing file.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    match default_config_path() {
        Ok(path) => load_config_from(&path),
        Err(ConfigError::NoPlatformConfigDir) => Ok(AppConfig::default()),
        Err(e) => Err(e),
    }
}

/// Loads and validates the config at `path`, returning
/// `AppConfig::default()` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed, and
/// [`ConfigError::Invalid`] for unusable values.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let cfg = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str::<AppConfig>(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Resolves the platform config directory including the `clipsync` folder.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("ClipSync"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("ClipSync")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("clipsync"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
