//! Explicit, application-owned cache for the loaded flight table.
//!
//! The table is loaded once and shared read-only as `Arc<Dataset>` until it
//! expires (optional TTL) or is invalidated. Concurrent callers that find the
//! cache empty wait on a single load instead of fetching in parallel.

use log::{info, warn};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::error::SourceResult;
use super::RecordSource;
use crate::models::Dataset;

struct CachedDataset {
    dataset: Arc<Dataset>,
    loaded_at: Instant,
}

/// Result of a manual refresh.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    /// Rows in the newly loaded table.
    pub rows: usize,
    /// Whether the payload checksum differs from the previous load.
    pub changed: bool,
    pub checksum: String,
}

/// Cache holding at most one loaded dataset.
pub struct DatasetCache {
    ttl: Option<Duration>,
    slot: RwLock<Option<CachedDataset>>,
    load_lock: Mutex<()>,
}

impl DatasetCache {
    /// Create a cache; `ttl = None` keeps the dataset until invalidated.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Return the cached dataset, loading it from `source` when absent or expired.
    pub async fn get_or_load(&self, source: &dyn RecordSource) -> SourceResult<Arc<Dataset>> {
        if let Some(dataset) = self.fresh() {
            return Ok(dataset);
        }

        let _guard = self.load_lock.lock().await;
        // Another caller may have finished loading while we waited.
        if let Some(dataset) = self.fresh() {
            return Ok(dataset);
        }

        self.load(source).await
    }

    /// Reload unconditionally and report whether the data changed.
    ///
    /// On failure the previous entry is left in place.
    pub async fn refresh(&self, source: &dyn RecordSource) -> SourceResult<RefreshOutcome> {
        let _guard = self.load_lock.lock().await;
        let previous = self.current().map(|d| d.checksum.clone());

        let dataset = self.load(source).await.inspect_err(|e| {
            warn!("Refresh from {} failed: {}", source.describe(), e);
        })?;

        Ok(RefreshOutcome {
            rows: dataset.len(),
            changed: previous.as_deref() != Some(dataset.checksum.as_str()),
            checksum: dataset.checksum.clone(),
        })
    }

    /// Drop the cached dataset; the next `get_or_load` fetches again.
    pub fn invalidate(&self) {
        if self.slot.write().take().is_some() {
            info!("Flight dataset cache invalidated");
        }
    }

    /// The cached dataset, even if expired.
    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.slot.read().as_ref().map(|c| Arc::clone(&c.dataset))
    }

    /// True when a dataset is cached and not expired.
    pub fn is_fresh(&self) -> bool {
        self.fresh().is_some()
    }

    /// Time since the cached dataset was loaded.
    pub fn age(&self) -> Option<Duration> {
        self.slot.read().as_ref().map(|c| c.loaded_at.elapsed())
    }

    fn fresh(&self) -> Option<Arc<Dataset>> {
        let slot = self.slot.read();
        let cached = slot.as_ref()?;
        match self.ttl {
            Some(ttl) if cached.loaded_at.elapsed() >= ttl => None,
            _ => Some(Arc::clone(&cached.dataset)),
        }
    }

    async fn load(&self, source: &dyn RecordSource) -> SourceResult<Arc<Dataset>> {
        let started = Instant::now();
        let dataset = Arc::new(source.fetch().await?);
        info!(
            "Loaded {} flight records from {} in {:?}",
            dataset.len(),
            source.describe(),
            started.elapsed()
        );

        *self.slot.write() = Some(CachedDataset {
            dataset: Arc::clone(&dataset),
            loaded_at: Instant::now(),
        });
        Ok(dataset)
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(None)
    }
}
