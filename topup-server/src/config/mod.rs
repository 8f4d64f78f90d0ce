//! Configuration loading and validation.

pub mod file;

use std::path::{Path, PathBuf};

use thiserror::Error;
use topup_core::identity::AuthMode;

pub use file::{AttestationConfig, AuthConfig, CatalogSource, CorsConfig, FileConfig, ServerConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("strict auth mode requires auth.verify_url")]
    MissingAuthVerifyUrl,
    #[error("enabled attestation requires attestation.verify_url")]
    MissingAttestationVerifyUrl,
    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loads and validates the TOML configuration file.
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        let raw = std::fs::read_to_string(&self.path)?;
        let config: FileConfig = toml::from_str(&raw)?;
        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.auth.mode == AuthMode::Strict && config.auth.verify_url.is_none() {
        return Err(ConfigError::MissingAuthVerifyUrl);
    }
    if config.attestation.enabled && config.attestation.verify_url.is_none() {
        return Err(ConfigError::MissingAttestationVerifyUrl);
    }
    Ok(())
}

/// Get the database connection string from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
