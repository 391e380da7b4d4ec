use std::{path::PathBuf, str::FromStr};

use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_TOKEN_ATTEMPTS: u32 = 32;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Unsupported registry URL: {0}")]
    UnsupportedRegistry(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageProvider {
    Filesystem,
    Memory,
}

impl FromStr for StorageProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filesystem" | "fs" => Ok(StorageProvider::Filesystem),
            "memory" => Ok(StorageProvider::Memory),
            other => Err(ConfigError::InvalidValue {
                key: "STORAGE_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

/// Where token bindings live. URL-backed variants keep the full connection string.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryProvider {
    Memory,
    Sqlite(String),
    Postgres(String),
    Redis(String),
}

impl FromStr for RegistryProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = s.trim();
        if url.is_empty() || url.eq_ignore_ascii_case("memory") {
            Ok(RegistryProvider::Memory)
        } else if url.starts_with("sqlite:") {
            Ok(RegistryProvider::Sqlite(url.to_string()))
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(RegistryProvider::Postgres(url.to_string()))
        } else if url.starts_with("redis://") || url.starts_with("rediss://") {
            Ok(RegistryProvider::Redis(url.to_string()))
        } else {
            Err(ConfigError::UnsupportedRegistry(url.to_string()))
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalConfig {
    pub port: u16,
    pub storage: StorageProvider,
    pub upload_dir: PathBuf,
    pub registry: RegistryProvider,
    pub max_token_attempts: u32,
    pub max_upload_bytes: usize,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            storage: StorageProvider::Filesystem,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            registry: RegistryProvider::Memory,
            max_token_attempts: DEFAULT_MAX_TOKEN_ATTEMPTS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_allowed_origins: None,
        }
    }
}

impl LocalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            config.port = parse_number("PORT", &port)?;
        }
        if let Some(storage) = lookup("STORAGE_BACKEND") {
            config.storage = storage.parse()?;
        }
        if let Some(dir) = lookup("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("REGISTRY_URL") {
            config.registry = url.parse()?;
        }
        if let Some(attempts) = lookup("MAX_TOKEN_ATTEMPTS") {
            let attempts: u32 = parse_number("MAX_TOKEN_ATTEMPTS", &attempts)?;
            if attempts == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "MAX_TOKEN_ATTEMPTS",
                    value: attempts.to_string(),
                });
            }
            config.max_token_attempts = attempts;
        }
        if let Some(limit) = lookup("MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = parse_number("MAX_UPLOAD_BYTES", &limit)?;
        }
        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = Some(
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }

        Ok(config)
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
