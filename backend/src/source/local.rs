//! In-memory record source.
//!
//! Holds a fixed table in memory. Used for unit tests, demos and local
//! development; it can also simulate an outage so callers can exercise the
//! `SourceUnavailable` path.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::checksum::calculate_checksum;
use super::error::{SourceError, SourceResult};
use super::RecordSource;
use crate::models::{Dataset, FlightRecord, SchemaReport};

/// In-memory record source.
#[derive(Clone)]
pub struct LocalSource {
    data: Arc<RwLock<LocalData>>,
    fetches: Arc<AtomicUsize>,
}

struct LocalData {
    records: Vec<FlightRecord>,
    schema: SchemaReport,
    is_healthy: bool,
}

impl LocalSource {
    /// Create a source serving `records` with a complete schema.
    pub fn new(records: Vec<FlightRecord>) -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData {
                records,
                schema: SchemaReport {
                    missing_columns: Vec::new(),
                    date_available: true,
                },
                is_healthy: true,
            })),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create an empty source.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Override the schema report returned with every fetch.
    pub fn with_schema(self, schema: SchemaReport) -> Self {
        self.data.write().schema = schema;
        self
    }

    /// Replace the served table, as if the upstream data changed.
    pub fn replace_records(&self, records: Vec<FlightRecord>) {
        self.data.write().records = records;
    }

    /// Toggle simulated availability.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Number of completed `fetch` calls.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait]
impl RecordSource for LocalSource {
    async fn fetch(&self) -> SourceResult<Dataset> {
        let data = self.data.read();
        if !data.is_healthy {
            return Err(SourceError::unavailable("Local source is marked unavailable")
                .with_source(self.describe()));
        }

        let payload = serde_json::to_vec(&data.records)?;
        let dataset = Dataset::new(data.records.clone(), data.schema.clone(), self.describe())
            .with_checksum(calculate_checksum(&payload));
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(dataset)
    }

    fn describe(&self) -> String {
        "local://memory".to_string()
    }
}
