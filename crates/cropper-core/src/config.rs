//! Configuration module
//!
//! Configuration is read from the process environment (a `.env` file is
//! honoured). Every value has a default so the service starts with no
//! environment at all.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const SERVER_PORT: u16 = 5000;
const SERVER_HOST: &str = "0.0.0.0";
const STORAGE_DIR: &str = "static/output";
const CLEANUP_INTERVAL_SECS: u64 = 3600;
const FETCH_TIMEOUT_SECS: u64 = 30;
const MAX_IMAGE_SIZE_MB: usize = 10;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_format: LogFormat,
}

/// Pipeline settings: storage location, purge schedule and fetch limits.
#[derive(Clone, Debug)]
pub struct CropperConfig {
    pub base: BaseConfig,
    pub storage_dir: PathBuf,
    pub cleanup_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub max_image_size_bytes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<CropperConfig>);

impl Config {
    fn as_cropper(&self) -> &CropperConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = CropperConfig::from_lookup(lookup)?;
        config.validate()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_cropper().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment().to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn server_host(&self) -> &str {
        &self.as_cropper().base.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.as_cropper().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_cropper().base.environment
    }

    pub fn log_format(&self) -> LogFormat {
        self.as_cropper().base.log_format
    }

    pub fn storage_dir(&self) -> &Path {
        &self.as_cropper().storage_dir
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.as_cropper().cleanup_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.as_cropper().fetch_timeout_secs)
    }

    pub fn max_image_size_bytes(&self) -> usize {
        self.as_cropper().max_image_size_bytes
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, raw)),
        _ => Ok(default),
    }
}

impl CropperConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        let base = BaseConfig {
            server_host: lookup("HOST").unwrap_or_else(|| SERVER_HOST.to_string()),
            server_port: parse_or(&lookup, "PORT", SERVER_PORT)?,
            environment,
            log_format,
        };

        let max_image_size_mb: usize = parse_or(&lookup, "MAX_IMAGE_SIZE_MB", MAX_IMAGE_SIZE_MB)?;

        Ok(CropperConfig {
            base,
            storage_dir: lookup("STORAGE_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(STORAGE_DIR)),
            cleanup_interval_secs: parse_or(&lookup, "CLEANUP_INTERVAL_SECS", CLEANUP_INTERVAL_SECS)?,
            fetch_timeout_secs: parse_or(&lookup, "FETCH_TIMEOUT_SECS", FETCH_TIMEOUT_SECS)?,
            max_image_size_bytes: max_image_size_mb.saturating_mul(1024 * 1024),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.cleanup_interval_secs == 0 {
            return Err(anyhow::anyhow!("CLEANUP_INTERVAL_SECS must be greater than 0"));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(anyhow::anyhow!("FETCH_TIMEOUT_SECS must be greater than 0"));
        }

        if self.max_image_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_SIZE_MB must be greater than 0"));
        }

        if self.storage_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_DIR cannot be empty"));
        }

        Ok(())
    }
}
