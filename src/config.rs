use std::{fmt::Display, path::{Path, PathBuf}};

use serde::Deserialize;

use crate::{
    retention_service::{MalformedNamePolicy, DEFAULT_RETENTION_DAYS},
    upload_service::SubdirectoryPolicy,
};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub root_folder_id: String,
    pub backup_dirs: Vec<PathBuf>,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default)]
    pub malformed_names: MalformedNamePolicy,
    #[serde(default)]
    pub subdirectories: SubdirectoryPolicy,
    #[serde(default = "default_client_secret_path")]
    pub client_secret_path: PathBuf,
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    IOError(std::io::Error),
    ParseError(serde_json::Error),
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IOError(e) => write!(f, "could not read config: {}", e),
            ConfigError::ParseError(e) => write!(f, "could not parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::IOError(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        ConfigError::ParseError(value)
    }
}

fn default_retention_days() -> i64 { DEFAULT_RETENTION_DAYS }
fn default_client_secret_path() -> PathBuf { PathBuf::from("client_secret.json") }
fn default_token_path() -> PathBuf { PathBuf::from("token.json") }

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        if config.root_folder_id.is_empty() {
            return Err(ConfigError::Invalid("`root_folder_id` must not be empty"));
        }
        if config.retention_days < 0 {
            return Err(ConfigError::Invalid("`retention_days` must not be negative"));
        }
        Ok(config)
    }
}
