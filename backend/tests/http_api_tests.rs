//! Handler-level tests for the REST API.

#![cfg(feature = "http-server")]

mod support;

use axum::body::to_bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

use flight_dashboard::http::dto::{AggregateQuery, FilterQuery};
use flight_dashboard::http::handlers;
use flight_dashboard::http::{AppError, AppState};
use flight_dashboard::io::read_flights_csv;
use flight_dashboard::models::{FlightRecord, SchemaReport};
use flight_dashboard::services::DashboardSettings;
use flight_dashboard::source::{DatasetCache, LocalSource};

fn state_with(source: LocalSource) -> AppState {
    AppState::new(
        std::sync::Arc::new(source),
        DatasetCache::default(),
        DashboardSettings::default(),
    )
}

fn scenario_state() -> AppState {
    state_with(LocalSource::new(support::scenario_records()))
}

fn aa_only() -> FilterQuery {
    FilterQuery {
        airlines: Some("AA".to_string()),
        ..FilterQuery::default()
    }
}

#[tokio::test]
async fn test_health_does_not_load() {
    let state = scenario_state();
    let health = handlers::health_check(State(state.clone())).await.unwrap().0;
    assert_eq!(health.status, "ok");
    assert!(!health.dataset_cached);
    assert!(health.rows.is_none());

    handlers::get_options(State(state.clone())).await.unwrap();
    let health = handlers::health_check(State(state)).await.unwrap().0;
    assert!(health.dataset_cached);
    assert_eq!(health.rows, Some(3));
}

#[tokio::test]
async fn test_options() {
    let options = handlers::get_options(State(scenario_state())).await.unwrap().0;
    assert_eq!(options.total_rows, 3);
    assert_eq!(options.options.airlines, vec!["AA", "BB"]);
    assert_eq!(options.options.default_airlines, vec!["AA", "BB"]);
    assert!(options.notices.is_empty());
}

#[tokio::test]
async fn test_dashboard_with_filter() {
    let data = handlers::get_dashboard(State(scenario_state()), Query(aa_only()))
        .await
        .unwrap()
        .0;
    assert_eq!(data.total_rows, 3);
    assert_eq!(data.filtered_rows, 2);
    assert_eq!(data.kpis.mean_arr_delay, Some(20.0));
    assert_eq!(data.by_airline.rows.len(), 1);
}

#[tokio::test]
async fn test_bad_filter_is_bad_request() {
    let query = FilterQuery {
        cancelled: Some("maybe".to_string()),
        ..FilterQuery::default()
    };
    let err = handlers::get_dashboard(State(scenario_state()), Query(query))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unavailable_source_is_503() {
    let source = LocalSource::new(support::scenario_records());
    source.set_healthy(false);
    let err = handlers::list_flights(State(state_with(source)), Query(FilterQuery::default()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_list_flights_paginates() {
    let query = FilterQuery {
        page: Some(0),
        page_size: Some(2),
        ..FilterQuery::default()
    };
    let page = handlers::list_flights(State(scenario_state()), Query(query))
        .await
        .unwrap()
        .0;
    assert_eq!(page.total_rows, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.rows[0].flight_date, Some(support::date(2024, 1, 5)));
    assert_eq!(page.rows[1].airline, "BB");
}

#[tokio::test]
async fn test_export_is_csv_attachment() {
    let response = handlers::export_flights(State(scenario_state()), Query(aa_only()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("vuelos_filtrados.csv"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let rows = read_flights_csv(&body).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.airline == "AA"));
}

#[tokio::test]
async fn test_aggregate_endpoint() {
    let params = AggregateQuery {
        group: Some("route".to_string()),
        metrics: Some("count,mean:arr_delay".to_string()),
        sort: Some("mean:arr_delay".to_string()),
        top: Some(1),
    };
    let result = handlers::get_aggregate(
        State(scenario_state()),
        Query(FilterQuery::default()),
        Query(params),
    )
    .await
    .unwrap()
    .0;
    assert_eq!(result.dimension, "route");
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0].key, "JFK → SFO");
    assert_eq!(result.rows[0].values[1], Some(30.0));
}

#[tokio::test]
async fn test_aggregate_requires_group() {
    let err = handlers::get_aggregate(
        State(scenario_state()),
        Query(FilterQuery::default()),
        Query(AggregateQuery::default()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let unknown_sort = AggregateQuery {
        group: Some("airline".to_string()),
        sort: Some("sum:distance".to_string()),
        ..AggregateQuery::default()
    };
    let err = handlers::get_aggregate(
        State(scenario_state()),
        Query(FilterQuery::default()),
        Query(unknown_sort),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_reports_changes() {
    let source = LocalSource::new(support::scenario_records());
    let state = state_with(source.clone());
    handlers::get_options(State(state.clone())).await.unwrap();

    let unchanged = handlers::refresh(State(state.clone())).await.unwrap().0;
    assert!(!unchanged.changed);

    source.replace_records(Vec::new());
    let changed = handlers::refresh(State(state.clone())).await.unwrap().0;
    assert!(changed.changed);
    assert_eq!(changed.rows, 0);

    let page = handlers::list_flights(State(state), Query(FilterQuery::default()))
        .await
        .unwrap()
        .0;
    assert_eq!(page.total_rows, 0);
}

fn dateless_state() -> AppState {
    let records = vec![
        FlightRecord::new("AA")
            .with_route("JFK", "LAX")
            .with_delays(None, Some(5.0)),
        FlightRecord::new("BB")
            .with_route("ORD", "ATL")
            .with_delays(None, Some(40.0)),
    ];
    let schema = SchemaReport {
        missing_columns: vec!["FlightDate".to_string()],
        date_available: false,
    };
    state_with(LocalSource::new(records).with_schema(schema))
}

fn year_2024() -> FilterQuery {
    FilterQuery {
        start_date: Some("2024-01-01".to_string()),
        end_date: Some("2024-12-31".to_string()),
        ..FilterQuery::default()
    }
}

#[tokio::test]
async fn test_date_filter_is_noop_without_flight_dates() {
    let state = dateless_state();

    let page = handlers::list_flights(State(state.clone()), Query(year_2024()))
        .await
        .unwrap()
        .0;
    assert_eq!(page.total_rows, 2);

    let dashboard = handlers::get_dashboard(State(state.clone()), Query(year_2024()))
        .await
        .unwrap()
        .0;
    assert_eq!(dashboard.filtered_rows, 2);
    assert!(dashboard.notices[0].contains("FlightDate"));

    let params = AggregateQuery {
        group: Some("airline".to_string()),
        ..AggregateQuery::default()
    };
    let result = handlers::get_aggregate(State(state.clone()), Query(year_2024()), Query(params))
        .await
        .unwrap()
        .0;
    assert_eq!(result.total_count(), 2);

    let response = handlers::export_flights(State(state), Query(year_2024()))
        .await
        .unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(read_flights_csv(&body).unwrap().len(), 2);
}
