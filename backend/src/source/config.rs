//! Application configuration file support.
//!
//! Settings are read from a `flights.toml` file and can be overridden by
//! environment variables:
//!
//! ```toml
//! [source]
//! type = "file"            # local | file | http
//! path = "data/flights.csv"
//! url = "https://example.org/flights"
//! timeout_secs = 30
//!
//! [cache]
//! ttl_secs = 600           # omit or 0 to keep the table until refreshed
//!
//! [dashboard]
//! scatter_sample_cap = 5000
//! top_airlines = 15
//! top_routes = 15
//! top_origins = 10
//! page_size = 500
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::error::{SourceError, SourceResult};
use super::factory::SourceType;
use crate::services::DashboardSettings;

/// Name of the configuration file searched by [`AppConfig::load`].
pub const CONFIG_FILE_NAME: &str = "flights.toml";

/// Full application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Record source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(rename = "type", default = "default_source_type")]
    pub source_type: String,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            source_type: default_source_type(),
            path: None,
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Dataset cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl CacheSettings {
    /// Cache lifetime; `None` (or 0) means "until refreshed".
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// HTTP server bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_source_type() -> String {
    "local".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(AppConfig)` if successful
    /// * `Err(SourceError)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> SourceResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            SourceError::configuration(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> SourceResult<Self> {
        toml::from_str(content).map_err(|e| {
            SourceError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Locate `flights.toml` in the standard locations.
    ///
    /// Searches:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn find_default_location() -> Option<PathBuf> {
        [
            PathBuf::from(CONFIG_FILE_NAME),
            Path::new("backend").join(CONFIG_FILE_NAME),
            Path::new("..").join(CONFIG_FILE_NAME),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Load configuration from the default location.
    ///
    /// # Returns
    /// * `Err(SourceError)` if no file is found or it fails to parse
    pub fn from_default_location() -> SourceResult<Self> {
        let path = Self::find_default_location().ok_or_else(|| {
            SourceError::configuration(format!(
                "No {} found in standard locations",
                CONFIG_FILE_NAME
            ))
        })?;
        Self::from_file(path)
    }

    /// Load the default file when present (defaults otherwise), then apply
    /// environment overrides.
    pub fn load() -> SourceResult<Self> {
        let mut config = match Self::find_default_location() {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => {
                log::info!("No {} found, using defaults", CONFIG_FILE_NAME);
                Self::default()
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `FLIGHT_SOURCE_TYPE`, `FLIGHTS_URL`, `FLIGHTS_FILE`,
    /// `FLIGHTS_CACHE_TTL_SECS`, `HOST` and `PORT`.
    ///
    /// Setting `FLIGHTS_URL` or `FLIGHTS_FILE` without `FLIGHT_SOURCE_TYPE`
    /// also switches the source type accordingly.
    pub fn apply_env_overrides(&mut self) -> SourceResult<()> {
        if let Some(url) = env_value("FLIGHTS_URL") {
            self.source.url = Some(url);
            self.source.source_type = "http".to_string();
        }
        if let Some(path) = env_value("FLIGHTS_FILE") {
            self.source.path = Some(PathBuf::from(path));
            self.source.source_type = "file".to_string();
        }
        if let Some(kind) = env_value("FLIGHT_SOURCE_TYPE") {
            SourceType::from_str(&kind).map_err(SourceError::configuration)?;
            self.source.source_type = kind;
        }
        if let Some(ttl) = env_value("FLIGHTS_CACHE_TTL_SECS") {
            let secs = ttl.parse::<u64>().map_err(|e| {
                SourceError::configuration(format!(
                    "Invalid FLIGHTS_CACHE_TTL_SECS '{}': {}",
                    ttl, e
                ))
            })?;
            self.cache.ttl_secs = Some(secs);
        }
        if let Some(host) = env_value("HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_value("PORT") {
            self.server.port = port.parse().map_err(|e| {
                SourceError::configuration(format!("Invalid PORT '{}': {}", port, e))
            })?;
        }
        Ok(())
    }

    /// Parsed source type.
    pub fn source_type(&self) -> SourceResult<SourceType> {
        SourceType::from_str(&self.source.source_type).map_err(SourceError::configuration)
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
