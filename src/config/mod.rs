//! Configuration module for the Mist Online 2 beauty server
//!
//! Loads server settings from a TOML file. Static game data (shops, items,
//! NPCs, palettes) lives in the data directory named here and is loaded by
//! the metadata store.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT, MAX_TOTAL_CONNECTIONS};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Complete server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub game: GameSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_starting_coin")]
    pub starting_coin: i64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_connections() -> usize {
    MAX_TOTAL_CONNECTIONS
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_starting_coin() -> i64 {
    1000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            starting_coin: default_starting_coin(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            game: GameSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::ParseError {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.game.data_dir, "data");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [server]
            port = 9999

            [game]
            starting_coin = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.game.starting_coin, 5000);
        assert_eq!(config.game.data_dir, "data");
    }
}
