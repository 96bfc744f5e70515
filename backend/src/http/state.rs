//! Application state for the HTTP server.

use std::sync::Arc;

use super::error::AppError;
use crate::models::Dataset;
use crate::services::DashboardSettings;
use crate::source::{DatasetCache, RecordSource};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Configured record source
    pub source: Arc<dyn RecordSource>,
    /// Loaded table, shared by every request
    pub cache: Arc<DatasetCache>,
    pub settings: Arc<DashboardSettings>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn RecordSource>,
        cache: DatasetCache,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            source,
            cache: Arc::new(cache),
            settings: Arc::new(settings),
        }
    }

    /// The cached dataset, loading it on first use or after expiry.
    pub async fn dataset(&self) -> Result<Arc<Dataset>, AppError> {
        Ok(self.cache.get_or_load(self.source.as_ref()).await?)
    }
}
