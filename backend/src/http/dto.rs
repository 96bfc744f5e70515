//! Data Transfer Objects for the HTTP API.
//!
//! View payloads (`DashboardData`, `FlightPage`, `AggregationResult`,
//! `FilterOptions`) already derive `Serialize` and are returned as is.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use crate::services::{
    AggregationResult, DashboardData, FilterOptions, FlightKpis, FlightPage, GroupRow,
    ScatterPoint,
};
pub use crate::source::RefreshOutcome;

use crate::models::{FilterSpec, FlagMode};

/// Filter and paging query parameters shared by the data endpoints.
///
/// List parameters are comma separated (`airlines=AA,DL`). Leaving a bound of
/// a range out makes that side open.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub airlines: Option<String>,
    #[serde(default)]
    pub origins: Option<String>,
    #[serde(default)]
    pub destinations: Option<String>,
    #[serde(default)]
    pub min_arr_delay: Option<f64>,
    #[serde(default)]
    pub max_arr_delay: Option<f64>,
    #[serde(default)]
    pub cancelled: Option<String>,
    #[serde(default)]
    pub diverted: Option<String>,
    /// Zero-based table page
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
    /// Seed for a reproducible scatter sample
    #[serde(default)]
    pub seed: Option<u64>,
}

impl FilterQuery {
    /// Build the immutable filter for this request.
    pub fn to_filter_spec(&self) -> Result<FilterSpec, String> {
        let mut builder = FilterSpec::builder();

        let start = parse_date("start_date", self.start_date.as_deref())?;
        let end = parse_date("end_date", self.end_date.as_deref())?;
        if start.is_some() || end.is_some() {
            builder = builder.date_range(
                start.unwrap_or(NaiveDate::MIN),
                end.unwrap_or(NaiveDate::MAX),
            );
        }

        builder = builder
            .airlines(split_list(self.airlines.as_deref()))
            .origins(split_list(self.origins.as_deref()))
            .destinations(split_list(self.destinations.as_deref()));

        if self.min_arr_delay.is_some() || self.max_arr_delay.is_some() {
            let min = self.min_arr_delay.unwrap_or(f64::NEG_INFINITY);
            let max = self.max_arr_delay.unwrap_or(f64::INFINITY);
            if min.is_nan() || max.is_nan() {
                return Err("Arrival delay bounds must be numbers".to_string());
            }
            builder = builder.arr_delay_range(min, max);
        }

        builder = builder
            .cancelled(parse_flag_mode(self.cancelled.as_deref())?)
            .diverted(parse_flag_mode(self.diverted.as_deref())?);

        Ok(builder.build())
    }
}

fn parse_date(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| format!("Invalid {} '{}': {} (expected YYYY-MM-DD)", name, v, e)),
    }
}

fn parse_flag_mode(value: Option<&str>) -> Result<FlagMode, String> {
    value.map_or(Ok(FlagMode::Any), FlagMode::from_str)
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Query parameters for the aggregate endpoint (filters are read separately).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateQuery {
    /// month | airline | route | origin | dest
    #[serde(default)]
    pub group: Option<String>,
    /// Comma separated metrics, e.g. `count,mean:arr_delay`
    #[serde(default)]
    pub metrics: Option<String>,
    /// `count` (default), `key`, or one of the requested metrics
    #[serde(default)]
    pub sort: Option<String>,
    /// Keep only the first N groups after sorting
    #[serde(default)]
    pub top: Option<usize>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Configured record source
    pub source: String,
    /// Whether a non-expired dataset is cached
    pub dataset_cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Filter option sets plus dataset-level notices.
#[derive(Debug, Clone, Serialize)]
pub struct OptionsResponse {
    pub total_rows: usize,
    pub options: FilterOptions,
    pub notices: Vec<String>,
}
