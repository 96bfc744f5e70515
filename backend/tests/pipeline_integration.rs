//! End-to-end tests: source -> cache -> filter -> aggregate -> export.

mod support;

use std::collections::BTreeSet;
use std::io::Write;

use flight_dashboard::io::{read_flights_csv, write_flights_csv};
use flight_dashboard::models::{FilterSpec, FlagMode, FlightRecord};
use flight_dashboard::services::{
    aggregate, apply_filters, build_dashboard, compute_kpis, DashboardSettings, Field, GroupKey,
    MetricSpec,
};
use flight_dashboard::source::{DatasetCache, FileSource, LocalSource, RecordSource};

#[test]
fn test_scenario_filter_aggregate_and_disruption() {
    let records = support::scenario_records();

    let spec = FilterSpec::builder().airlines(["AA"]).build();
    let filtered = apply_filters(&records, &spec);
    assert_eq!(filtered.len(), 2);

    let by_airline = aggregate(
        &filtered,
        GroupKey::Airline,
        &[MetricSpec::Count, MetricSpec::Mean(Field::ArrDelay)],
    );
    let aa = by_airline.get("AA").unwrap();
    assert_eq!(aa.count, 2);
    assert_eq!(aa.values[1], Some(20.0));
    assert!(by_airline.get("BB").is_none());

    let disruption = compute_kpis(&records).disruption_rate.unwrap();
    assert!((disruption - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_empty_table() {
    let filtered = apply_filters(&[], &FilterSpec::default());
    assert!(filtered.is_empty());

    let kpis = compute_kpis(&filtered);
    assert_eq!(kpis.total_flights, 0);
    assert!(kpis.mean_dep_delay.is_none());
    assert!(kpis.mean_arr_delay.is_none());
    assert!(kpis.on_time_rate.is_none());
    assert!(kpis.cancellation_rate.is_none());
    assert!(kpis.diversion_rate.is_none());
    assert!(kpis.disruption_rate.is_none());
}

#[test]
fn test_csv_export_round_trip_of_filtered_table() {
    let spec = FilterSpec::builder().cancelled(FlagMode::OnlyFalse).build();
    let filtered = apply_filters(&support::scenario_records(), &spec);

    let bytes = write_flights_csv(&filtered).unwrap();
    let parsed = read_flights_csv(&bytes).unwrap();
    assert_eq!(parsed.len(), filtered.len());

    let tuples = |rows: &[FlightRecord]| -> BTreeSet<(String, Option<String>, Option<String>, Option<String>)> {
        rows.iter()
            .map(|r| {
                (
                    r.airline.clone(),
                    r.origin.clone(),
                    r.dest.clone(),
                    r.arr_delay.map(|d| format!("{:.3}", d)),
                )
            })
            .collect()
    };
    assert_eq!(tuples(&parsed), tuples(&filtered));
}

#[tokio::test]
async fn test_json_file_through_cache_to_dashboard() {
    let mut file = tempfile::NamedTempFile::with_suffix(".json").unwrap();
    write!(file, "{}", support::SCENARIO_JSON).unwrap();

    let source = FileSource::new(file.path()).unwrap();
    let cache = DatasetCache::default();
    let dataset = cache.get_or_load(&source).await.unwrap();
    assert_eq!(dataset.len(), 3);
    assert!(dataset.schema.missing_columns.is_empty());
    assert!(dataset.schema.notices().is_empty());
    assert_eq!(dataset.records[0].origin_city_name.as_deref(), Some("New York, NY"));

    let spec = FilterSpec::builder()
        .date_range(support::date(2024, 1, 1), support::date(2024, 1, 31))
        .build();
    let view = build_dashboard(&dataset, &spec, &DashboardSettings::default(), Some(42));

    assert_eq!(view.filtered_rows, 2);
    assert_eq!(view.by_month.rows.len(), 1);
    assert_eq!(view.by_month.rows[0].key, "2024-01");
    assert_eq!(view.kpis.on_time_rate, Some(1.0));
    assert_eq!(view.scatter.len(), 1);
    assert_eq!(view.top_routes.rows.len(), 2);
}

#[tokio::test]
async fn test_csv_file_source_matches_json_source() {
    let bytes = write_flights_csv(&support::scenario_records()).unwrap();
    let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
    file.write_all(&bytes).unwrap();

    let from_csv = FileSource::new(file.path()).unwrap().fetch().await.unwrap();
    let from_memory = LocalSource::new(support::scenario_records())
        .fetch()
        .await
        .unwrap();

    let kpis_csv = compute_kpis(&from_csv.records);
    let kpis_memory = compute_kpis(&from_memory.records);
    assert_eq!(kpis_csv, kpis_memory);
}

#[tokio::test]
async fn test_cache_reload_sees_new_data_after_invalidate() {
    let source = LocalSource::new(support::scenario_records());
    let cache = DatasetCache::default();
    assert_eq!(cache.get_or_load(&source).await.unwrap().len(), 3);

    source.replace_records(Vec::new());
    assert_eq!(cache.get_or_load(&source).await.unwrap().len(), 3);

    cache.invalidate();
    assert!(cache.get_or_load(&source).await.unwrap().is_empty());
}
