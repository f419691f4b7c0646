//! Server configuration.
//!
//! Settings come from an optional TOML file plus `HUDDLE_`-prefixed
//! environment variables (e.g. `HUDDLE_SERVER__PORT=9000`), environment
//! winning. With neither present the defaults run a local server against a
//! database under the platform data directory.

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::completion::CompletionConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HuddleConfig {
    pub server: ServerConfig,
    pub completion: CompletionConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Path to the SQLite database file.
    pub database_path: PathBuf,
    /// Allowed CORS origins; empty means permissive.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_path: default_database_path(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("huddle")
        .join("huddle.db")
}

impl HuddleConfig {
    /// Load configuration.
    ///
    /// `path` overrides the default config file location
    /// (`<config dir>/huddle/config.toml`); a missing default file is fine,
    /// a missing explicit one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        builder = match path {
            Some(path) => builder.add_source(File::from(path).format(FileFormat::Toml)),
            None => {
                let default_path = dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("huddle")
                    .join("config.toml");
                builder.add_source(
                    File::from(default_path)
                        .format(FileFormat::Toml)
                        .required(false),
                )
            }
        };

        builder
            .add_source(Environment::with_prefix("HUDDLE").separator("__"))
            .build()?
            .try_deserialize()
    }
}
