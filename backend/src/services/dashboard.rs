//! Dashboard view builder.
//!
//! `build_dashboard` is a pure function from (dataset, filter, settings) to
//! the complete set of chart series, KPIs and notices a frontend renders.

use serde::{Deserialize, Serialize};

use super::aggregation::{aggregate, AggregationResult, Field, GroupKey, MetricSpec};
use super::filtering::apply_filters_for;
use super::kpis::{compute_kpis, FlightKpis};
use super::sampling::{sample_scatter, ScatterPoint, DEFAULT_SCATTER_SAMPLE_CAP};
use crate::models::{Dataset, FilterSpec, FlightRecord};

/// Rows per table page.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Tunables for the dashboard views, read from the `[dashboard]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSettings {
    #[serde(default = "default_scatter_sample_cap")]
    pub scatter_sample_cap: usize,
    #[serde(default = "default_top_airlines")]
    pub top_airlines: usize,
    #[serde(default = "default_top_routes")]
    pub top_routes: usize,
    #[serde(default = "default_top_origins")]
    pub top_origins: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_scatter_sample_cap() -> usize {
    DEFAULT_SCATTER_SAMPLE_CAP
}

fn default_top_airlines() -> usize {
    15
}

fn default_top_routes() -> usize {
    15
}

fn default_top_origins() -> usize {
    10
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            scatter_sample_cap: default_scatter_sample_cap(),
            top_airlines: default_top_airlines(),
            top_routes: default_top_routes(),
            top_origins: default_top_origins(),
            page_size: default_page_size(),
        }
    }
}

/// Everything the dashboard shows for one filter state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub kpis: FlightKpis,
    /// Flights and mean ArrDelay per month, ascending. Empty when dates are unavailable.
    pub by_month: AggregationResult,
    /// Mean ArrDelay of the busiest airlines.
    pub by_airline: AggregationResult,
    /// Busiest routes with mean ArrDelay.
    pub top_routes: AggregationResult,
    /// Origins with the largest accumulated departure delay.
    pub top_origins: AggregationResult,
    pub scatter: Vec<ScatterPoint>,
    pub notices: Vec<String>,
}

/// Build every dashboard view from `dataset` under `spec`.
pub fn build_dashboard(
    dataset: &Dataset,
    spec: &FilterSpec,
    settings: &DashboardSettings,
    seed: Option<u64>,
) -> DashboardData {
    let filtered = apply_filters_for(dataset, spec);
    let count_and_delay = [MetricSpec::Count, MetricSpec::Mean(Field::ArrDelay)];

    let by_month = aggregate(&filtered, GroupKey::Month, &count_and_delay).sort_by_key();
    let by_airline = aggregate(&filtered, GroupKey::Airline, &count_and_delay)
        .sort_by_count_desc()
        .top_n(settings.top_airlines);
    let top_routes = aggregate(&filtered, GroupKey::Route, &count_and_delay)
        .sort_by_count_desc()
        .top_n(settings.top_routes);
    let top_origins = aggregate(
        &filtered,
        GroupKey::Origin,
        &[
            MetricSpec::Sum(Field::DepDelay),
            MetricSpec::Count,
            MetricSpec::Mean(Field::DepDelay),
        ],
    )
    .sort_by_metric_desc(0)
    .top_n(settings.top_origins);

    let mut notices = dataset.schema.notices();
    if filtered.is_empty() {
        notices.push("No flights match the selected filters".to_string());
    }

    DashboardData {
        total_rows: dataset.len(),
        filtered_rows: filtered.len(),
        kpis: compute_kpis(&filtered),
        by_month,
        by_airline,
        top_routes,
        top_origins,
        scatter: sample_scatter(&filtered, settings.scatter_sample_cap, seed),
        notices,
    }
}

/// One page of the detail table.
#[derive(Debug, Clone, Serialize)]
pub struct FlightPage {
    /// Zero-based page index.
    pub page: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub total_pages: usize,
    pub rows: Vec<FlightRecord>,
}

/// Sort by FlightDate ascending (missing dates last, stable otherwise) and
/// return page `page`. A page past the end is empty; `page_size == 0` uses
/// the default.
pub fn paginate(records: &[FlightRecord], page: usize, page_size: usize) -> FlightPage {
    let page_size = if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };

    let mut ordered: Vec<&FlightRecord> = records.iter().collect();
    ordered.sort_by_key(|r| (r.flight_date.is_none(), r.flight_date));

    let rows = ordered
        .into_iter()
        .skip(page.saturating_mul(page_size))
        .take(page_size)
        .cloned()
        .collect();

    FlightPage {
        page,
        page_size,
        total_rows: records.len(),
        total_pages: records.len().div_ceil(page_size),
        rows,
    }
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod dashboard_tests;
