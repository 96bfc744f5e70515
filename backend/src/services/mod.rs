//! Pure, synchronous pipeline over a loaded flight table.
//!
//! ```text
//! Dataset ─► filtering ─► aggregation / kpis / sampling ─► dashboard
//! ```
//!
//! Nothing here performs I/O or mutates its input; handlers call these
//! functions on every request against the cached dataset.

pub mod aggregation;
pub mod dashboard;
pub mod filtering;
pub mod kpis;
pub mod sampling;

pub use aggregation::{
    aggregate, aggregate_by, parse_metrics, AggregationResult, Field, Flag, GroupKey, GroupRow,
    MetricSpec,
};
pub use dashboard::{
    build_dashboard, paginate, DashboardData, DashboardSettings, FlightPage, DEFAULT_PAGE_SIZE,
};
pub use filtering::{
    apply_filters, apply_filters_for, arr_delay_extent, compile_predicates, FilterOptions, Predicate,
    DEFAULT_AIRLINE_SELECTION,
};
pub use kpis::{compute_kpis, mean, FlightKpis};
pub use sampling::{sample_scatter, ScatterPoint, DEFAULT_SCATTER_SAMPLE_CAP};
