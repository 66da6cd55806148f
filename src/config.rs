use crate::{analytics::DEFAULT_TOP_N, error::PortalError, folder::SegmentPolicy};
use clap::Parser;
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Clone, Parser)]
pub struct StartArgs {
    #[arg(short, long, default_value = "config.json")]
    pub config_path: String,

    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    #[arg(short, long, default_value = "3030")]
    pub port: u16,

    #[arg(short, long, default_value = "INFO")]
    pub log_level: tracing::Level,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Postgres connection string. `DATABASE_URL` is used when absent.
    #[serde(default)]
    pub database_url: Option<String>,

    /// What to do with empty segments in resource folder paths
    #[serde(default)]
    pub segment_policy: SegmentPolicy,

    /// Amount of resources on the analytics leaderboard when the
    /// request does not specify one
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            segment_policy: SegmentPolicy::default(),
            leaderboard_size: default_leaderboard_size(),
            max_connections: default_max_connections(),
        }
    }
}

impl Config {
    /// Read the config from a JSON file, or YAML if the extension says so.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, PortalError> {
        let yaml = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yml" || ext == "yaml");

        let config = fs::read_to_string(path)?;

        if yaml {
            Ok(serde_yaml::from_str(&config)?)
        } else {
            Ok(serde_json::from_str(&config)?)
        }
    }

    /// The configured database URL, falling back to the environment.
    pub fn database_url(&self) -> Result<String, PortalError> {
        match &self.database_url {
            Some(url) => Ok(url.clone()),
            None => std::env::var("DATABASE_URL")
                .map_err(|_| PortalError::InvalidConfig("DATABASE_URL not set".to_string())),
        }
    }
}

fn default_leaderboard_size() -> usize {
    DEFAULT_TOP_N
}

fn default_max_connections() -> u32 {
    5
}
