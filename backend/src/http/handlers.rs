//! HTTP handlers for the REST API.
//!
//! Each handler resolves the cached dataset, builds the request's
//! [`FilterSpec`](crate::models::FilterSpec) and delegates to the service
//! layer. CPU-bound view building runs on the blocking pool.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{AggregateQuery, FilterQuery, HealthResponse, OptionsResponse};
use super::error::AppError;
use super::state::AppState;
use crate::io::write_flights_csv;
use crate::models::FilterSpec;
use crate::services::{
    aggregate, apply_filters_for, build_dashboard, paginate, parse_metrics, AggregationResult,
    DashboardData, FilterOptions, FlightPage, GroupKey, MetricSpec,
};
use crate::source::RefreshOutcome;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// File name offered for the CSV download.
pub const EXPORT_FILE_NAME: &str = "vuelos_filtrados.csv";

fn filter_spec(query: &FilterQuery) -> Result<FilterSpec, AppError> {
    query.to_filter_spec().map_err(AppError::BadRequest)
}

async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Reports the configured source and cache state without triggering a load.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let current = state.cache.current();
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        source: state.source.describe(),
        dataset_cached: state.cache.is_fresh(),
        rows: current.as_ref().map(|d| d.len()),
        loaded_at: current.as_ref().map(|d| d.loaded_at),
    }))
}

// =============================================================================
// Dashboard
// =============================================================================

/// GET /v1/options
///
/// Distinct airlines/airports and value extents for building filter controls.
pub async fn get_options(State(state): State<AppState>) -> HandlerResult<OptionsResponse> {
    let dataset = state.dataset().await?;
    let response = run_blocking(move || OptionsResponse {
        total_rows: dataset.len(),
        options: FilterOptions::from_records(&dataset.records),
        notices: dataset.schema.notices(),
    })
    .await?;
    Ok(Json(response))
}

/// GET /v1/dashboard
///
/// KPIs, chart series and scatter sample for the filtered table.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> HandlerResult<DashboardData> {
    let spec = filter_spec(&query)?;
    let dataset = state.dataset().await?;
    let settings = state.settings.clone();

    let data = run_blocking(move || build_dashboard(&dataset, &spec, &settings, query.seed)).await?;
    Ok(Json(data))
}

/// GET /v1/flights
///
/// One page of the filtered table, ordered by flight date.
pub async fn list_flights(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> HandlerResult<FlightPage> {
    let spec = filter_spec(&query)?;
    let dataset = state.dataset().await?;
    let page = query.page.unwrap_or(0);
    let page_size = query.page_size.unwrap_or(state.settings.page_size);

    let data = run_blocking(move || {
        let filtered = apply_filters_for(&dataset, &spec);
        paginate(&filtered, page, page_size)
    })
    .await?;
    Ok(Json(data))
}

/// GET /v1/flights/export
///
/// The whole filtered table as a CSV attachment.
pub async fn export_flights(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, AppError> {
    let spec = filter_spec(&query)?;
    let dataset = state.dataset().await?;

    let csv = run_blocking(move || write_flights_csv(&apply_filters_for(&dataset, &spec)))
        .await??;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        csv,
    )
        .into_response())
}

/// GET /v1/aggregate?group=airline&metrics=count,mean:arr_delay&sort=count&top=15
///
/// Arbitrary grouped summary of the filtered table.
pub async fn get_aggregate(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
    Query(params): Query<AggregateQuery>,
) -> HandlerResult<AggregationResult> {
    let spec = filter_spec(&query)?;
    let group: GroupKey = params
        .group
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Missing 'group' parameter".to_string()))?
        .parse()
        .map_err(AppError::BadRequest)?;
    let metrics = parse_metrics(params.metrics.as_deref().unwrap_or_default())
        .map_err(AppError::BadRequest)?;
    let sort = SortOrder::parse(params.sort.as_deref(), &metrics)?;
    let dataset = state.dataset().await?;

    let result = run_blocking(move || {
        let filtered = apply_filters_for(&dataset, &spec);
        let result = sort.apply(aggregate(&filtered, group, &metrics));
        match params.top {
            Some(n) => result.top_n(n),
            None => result,
        }
    })
    .await?;
    Ok(Json(result))
}

enum SortOrder {
    Count,
    Key,
    Metric(usize),
}

impl SortOrder {
    fn parse(value: Option<&str>, metrics: &[MetricSpec]) -> Result<Self, AppError> {
        match value.map(str::trim).unwrap_or("count") {
            "" | "count" => Ok(Self::Count),
            "key" => Ok(Self::Key),
            other => {
                let metric: MetricSpec = other.parse().map_err(AppError::BadRequest)?;
                metrics
                    .iter()
                    .position(|m| *m == metric)
                    .map(Self::Metric)
                    .ok_or_else(|| {
                        AppError::BadRequest(format!(
                            "Cannot sort by '{}': it is not one of the requested metrics",
                            other
                        ))
                    })
            }
        }
    }

    fn apply(&self, result: AggregationResult) -> AggregationResult {
        match self {
            SortOrder::Count => result.sort_by_count_desc(),
            SortOrder::Key => result.sort_by_key(),
            SortOrder::Metric(index) => result.sort_by_metric_desc(*index),
        }
    }
}

// =============================================================================
// Data refresh
// =============================================================================

/// POST /v1/refresh
///
/// Reload the table from the source and report whether it changed.
pub async fn refresh(State(state): State<AppState>) -> HandlerResult<RefreshOutcome> {
    let outcome = state.cache.refresh(state.source.as_ref()).await?;
    log::info!(
        "Dataset refreshed: {} rows (changed: {})",
        outcome.rows,
        outcome.changed
    );
    Ok(Json(outcome))
}
