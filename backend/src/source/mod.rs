//! Record sources for the flight table.
//!
//! A source produces the full, typed flight table in one fetch. Which concrete
//! source is used does not matter to the pipeline: it only sees the resulting
//! [`Dataset`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers / dashboard services                      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  DatasetCache (cache.rs) - explicit TTL + invalidation   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  RecordSource trait - fetch + ingest                     │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┼──────────────────┐
//!     │ LocalSource   │ FileSource       │ HttpSource
//!     │ (in-memory)   │ (JSON / CSV)     │ (GET, JSON array)
//!     └───────────────┴──────────────────┘
//! ```

use async_trait::async_trait;

use crate::models::Dataset;

pub mod cache;
pub mod checksum;
pub mod config;
pub mod error;
pub mod factory;
pub mod file;
#[cfg(feature = "http-source")]
pub mod http;
pub mod ingest;
pub mod local;

pub use cache::{DatasetCache, RefreshOutcome};
pub use checksum::calculate_checksum;
pub use config::AppConfig;
pub use error::{ErrorContext, SourceError, SourceResult};
pub use factory::{SourceFactory, SourceType};
pub use file::FileSource;
#[cfg(feature = "http-source")]
pub use http::HttpSource;
pub use local::LocalSource;

/// Supplier of the raw flight table.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so one instance can be shared by all
/// request handlers.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Load the complete flight table.
    ///
    /// # Returns
    /// * `Ok(Dataset)` - Validated records plus a schema report
    /// * `Err(SourceError)` - `SourceUnavailable` when the backend cannot be
    ///   reached, `SchemaMismatch` when required columns are absent
    async fn fetch(&self) -> SourceResult<Dataset>;

    /// Short description used in logs and health output.
    fn describe(&self) -> String;
}
