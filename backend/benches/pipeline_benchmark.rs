use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use flight_dashboard::io::write_flights_csv;
use flight_dashboard::models::{Dataset, FilterSpec, FlagMode, FlightRecord, SchemaReport};
use flight_dashboard::services::{
    aggregate, apply_filters, apply_filters_for, build_dashboard, compute_kpis,
    DashboardSettings, Field, GroupKey, MetricSpec,
};

const AIRLINES: [&str; 12] = [
    "AA", "AS", "B6", "DL", "F9", "G4", "HA", "NK", "OO", "UA", "WN", "YX",
];
const AIRPORTS: [&str; 10] = [
    "ATL", "BOS", "DEN", "DFW", "JFK", "LAS", "LAX", "ORD", "SEA", "SFO",
];

fn synthetic_table(n: usize) -> Vec<FlightRecord> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..n)
        .map(|i| {
            let arr_delay = if i % 17 == 0 {
                None
            } else {
                Some((i % 180) as f64 - 30.0)
            };
            FlightRecord::new(AIRLINES[i % AIRLINES.len()])
                .with_date(base + chrono::Duration::days((i % 365) as i64))
                .with_route(AIRPORTS[i % AIRPORTS.len()], AIRPORTS[(i / 3) % AIRPORTS.len()])
                .with_delays(Some((i % 120) as f64 - 10.0), arr_delay)
                .with_distance(Some(200.0 + (i % 2500) as f64), Some(40.0 + (i % 300) as f64))
                .with_flags(i % 53 == 0, i % 211 == 0)
        })
        .collect()
}

fn typical_spec() -> FilterSpec {
    FilterSpec::builder()
        .date_range(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
        )
        .airlines(AIRLINES.iter().take(10).copied())
        .arr_delay_range(-15.0, 120.0)
        .cancelled(FlagMode::OnlyFalse)
        .build()
}

fn bench_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("filtering");

    for size in [10_000usize, 100_000] {
        let records = synthetic_table(size);
        let spec = typical_spec();
        group.bench_with_input(BenchmarkId::new("apply_filters", size), &records, |b, input| {
            b.iter(|| apply_filters(black_box(input), black_box(&spec)));
        });
    }

    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let records = synthetic_table(100_000);
    let metrics = [MetricSpec::Count, MetricSpec::Mean(Field::ArrDelay)];

    for key in [GroupKey::Month, GroupKey::Airline, GroupKey::Route] {
        group.bench_with_input(BenchmarkId::new("aggregate", key.name()), &key, |b, key| {
            b.iter(|| aggregate(black_box(&records), *key, &metrics));
        });
    }

    group.bench_function("compute_kpis", |b| {
        b.iter(|| compute_kpis(black_box(&records)));
    });

    group.finish();
}

fn bench_dashboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard");
    let schema = SchemaReport {
        missing_columns: Vec::new(),
        date_available: true,
    };
    let dataset = Dataset::new(synthetic_table(100_000), schema, "bench");
    let settings = DashboardSettings::default();
    let spec = typical_spec();

    group.bench_function("build_dashboard", |b| {
        b.iter(|| build_dashboard(black_box(&dataset), &spec, &settings, Some(42)));
    });

    let filtered = apply_filters_for(&dataset, &spec);
    group.bench_function("write_flights_csv", |b| {
        b.iter(|| write_flights_csv(black_box(&filtered)));
    });

    group.finish();
}

criterion_group!(benches, bench_filtering, bench_aggregation, bench_dashboard);
criterion_main!(benches);
