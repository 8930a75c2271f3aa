//! Configuration management for VoteChain

use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub election: ElectionConfig,
}

#[derive(Debug, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ElectionConfig {
    /// Candidates seeded into the registry at startup.
    #[serde(default)]
    pub candidates: Vec<String>,
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let config_str = fs::read_to_string("config.toml").unwrap_or_default();
    let config: Config = if config_str.is_empty() {
        // Provide sane defaults when config.toml is absent
        Config {
            network: NetworkConfig {
                api_port: default_api_port(),
            },
            database: DatabaseConfig {
                path: default_db_path(),
            },
            election: ElectionConfig::default(),
        }
    } else {
        toml::from_str(&config_str)?
    };

    // Validate critical values
    if config.database.path.is_empty() {
        return Err("database.path must be set in config.toml".into());
    }

    Ok(config)
}

fn default_api_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    "votes.db".to_string()
}
