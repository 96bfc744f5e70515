//! Record source factory.
//!
//! Creates the configured [`RecordSource`] implementation at startup.

use std::str::FromStr;
use std::sync::Arc;
#[cfg(feature = "http-source")]
use std::time::Duration;

use super::config::{AppConfig, SourceSettings};
use super::error::{SourceError, SourceResult};
use super::file::FileSource;
#[cfg(feature = "http-source")]
use super::http::HttpSource;
use super::local::LocalSource;
use super::RecordSource;
use crate::models::FlightRecord;

/// Record source kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    /// In-memory table
    Local,
    /// JSON or CSV file on disk
    File,
    /// JSON array served over HTTP
    Http,
}

impl FromStr for SourceType {
    type Err = String;

    /// Parse a source type ("local", "file", "http").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "file" | "json" | "csv" => Ok(Self::File),
            "http" | "https" | "api" => Ok(Self::Http),
            _ => Err(format!("Unknown source type: {}", s)),
        }
    }
}

impl SourceType {
    /// Source type from the environment.
    ///
    /// Reads `FLIGHT_SOURCE_TYPE`; otherwise infers Http when `FLIGHTS_URL` is
    /// set, File when `FLIGHTS_FILE` is set, and Local as the fallback.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("FLIGHT_SOURCE_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("FLIGHTS_URL").is_ok() {
            Self::Http
        } else if std::env::var("FLIGHTS_FILE").is_ok() {
            Self::File
        } else {
            Self::Local
        }
    }
}

/// Factory for record sources.
pub struct SourceFactory;

impl SourceFactory {
    /// Create the source described by `settings`.
    ///
    /// # Returns
    /// * `Err(SourceError::ConfigurationError)` when the type is unknown, a
    ///   required path/url is missing, or the HTTP feature is disabled
    pub fn create(settings: &SourceSettings) -> SourceResult<Arc<dyn RecordSource>> {
        let source_type =
            SourceType::from_str(&settings.source_type).map_err(SourceError::configuration)?;

        match source_type {
            SourceType::Local => Ok(Self::create_local(Vec::new())),
            SourceType::File => {
                let path = settings.path.as_ref().ok_or_else(|| {
                    SourceError::configuration("File source requires 'source.path' setting")
                })?;
                Ok(Arc::new(FileSource::new(path.clone())?))
            }
            SourceType::Http => {
                #[cfg(feature = "http-source")]
                {
                    let url = settings.url.as_deref().ok_or_else(|| {
                        SourceError::configuration("HTTP source requires 'source.url' setting")
                    })?;
                    let source =
                        HttpSource::with_timeout(url, Duration::from_secs(settings.timeout_secs))?;
                    Ok(Arc::new(source))
                }
                #[cfg(not(feature = "http-source"))]
                {
                    Err(SourceError::configuration(
                        "HTTP source feature not enabled",
                    ))
                }
            }
        }
    }

    /// Create an in-memory source serving `records`.
    pub fn create_local(records: Vec<FlightRecord>) -> Arc<dyn RecordSource> {
        Arc::new(LocalSource::new(records))
    }

    /// Create the source named by an application configuration.
    pub fn from_config(config: &AppConfig) -> SourceResult<Arc<dyn RecordSource>> {
        Self::create(&config.source)
    }

    /// Create a source from environment variables alone.
    pub fn from_env() -> SourceResult<Arc<dyn RecordSource>> {
        let mut config = AppConfig::default();
        config.apply_env_overrides()?;
        Self::create(&config.source)
    }
}
