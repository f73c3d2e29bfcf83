//! Configuration file persistence.

pub mod config;

pub use config::{default_config_path, load_config, load_config_from, AppConfig, ConfigError};
