use anyhow::{Context, Result};
use polars::prelude::*;
use serde_json::Value;
use std::io::Cursor;
use std::path::Path;

use crate::models::FlightRecord;
use crate::source::ingest::{ingest_rows, RawRow};

/// Column order of the exported file.
pub const CSV_COLUMNS: [&str; 14] = [
    "FlightDate",
    "Airline",
    "Origin",
    "OriginCityName",
    "OriginStateName",
    "Dest",
    "DestCityName",
    "DestStateName",
    "DepDelay",
    "ArrDelay",
    "Distance",
    "AirTime",
    "Cancelled",
    "Diverted",
];

/// Build a Polars DataFrame from flight records.
///
/// Dates become ISO strings and flags 0/1 integers; missing values stay null.
pub fn records_to_dataframe(records: &[FlightRecord]) -> Result<DataFrame> {
    let dates: Vec<Option<String>> = records
        .iter()
        .map(|r| r.flight_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .collect();
    let airlines: Vec<String> = records.iter().map(|r| r.airline.clone()).collect();

    let text = |f: fn(&FlightRecord) -> &Option<String>| -> Vec<Option<String>> {
        records.iter().map(|r| f(r).clone()).collect()
    };
    let numeric = |f: fn(&FlightRecord) -> Option<f64>| -> Vec<Option<f64>> {
        records.iter().map(f).collect()
    };
    let flag = |f: fn(&FlightRecord) -> bool| -> Vec<i32> {
        records.iter().map(|r| i32::from(f(r))).collect()
    };

    let columns = vec![
        Column::new("FlightDate".into(), dates),
        Column::new("Airline".into(), airlines),
        Column::new("Origin".into(), text(|r| &r.origin)),
        Column::new("OriginCityName".into(), text(|r| &r.origin_city_name)),
        Column::new("OriginStateName".into(), text(|r| &r.origin_state_name)),
        Column::new("Dest".into(), text(|r| &r.dest)),
        Column::new("DestCityName".into(), text(|r| &r.dest_city_name)),
        Column::new("DestStateName".into(), text(|r| &r.dest_state_name)),
        Column::new("DepDelay".into(), numeric(|r| r.dep_delay)),
        Column::new("ArrDelay".into(), numeric(|r| r.arr_delay)),
        Column::new("Distance".into(), numeric(|r| r.distance)),
        Column::new("AirTime".into(), numeric(|r| r.air_time)),
        Column::new("Cancelled".into(), flag(|r| r.cancelled)),
        Column::new("Diverted".into(), flag(|r| r.diverted)),
    ];

    DataFrame::new(columns).context("Failed to build flights DataFrame")
}

/// Serialize records as UTF-8 CSV with a header row and no index column.
///
/// Floats are written as plain decimals, never in scientific notation.
pub fn write_flights_csv(records: &[FlightRecord]) -> Result<Vec<u8>> {
    let mut df = records_to_dataframe(records)?;
    let mut buffer: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_float_scientific(Some(false))
        .finish(&mut df)
        .context("Failed to write flights CSV")?;
    Ok(buffer)
}

/// Write the CSV export to a file.
pub fn write_flights_csv_file(records: &[FlightRecord], path: &Path) -> Result<()> {
    let bytes = write_flights_csv(records)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write CSV file {}", path.display()))
}

/// Parse CSV bytes into untyped rows.
///
/// Every column is read as text (schema inference disabled) so that
/// coercion happens in one place, during ingestion.
pub fn read_csv_rows(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .context("Failed to parse CSV into DataFrame")?;

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows: Vec<RawRow> = (0..df.height()).map(|_| RawRow::new()).collect();
    for name in &names {
        let column = df
            .column(name)
            .with_context(|| format!("Missing column {}", name))?
            .cast(&DataType::String)
            .with_context(|| format!("Column {} is not readable as text", name))?;
        let values = column.str()?;
        for (idx, row) in rows.iter_mut().enumerate() {
            let value = values
                .get(idx)
                .map(|s| Value::String(s.to_string()))
                .unwrap_or(Value::Null);
            row.insert(name.clone(), value);
        }
    }

    Ok(rows)
}

/// Parse an exported CSV back into typed records.
pub fn read_flights_csv(bytes: &[u8]) -> Result<Vec<FlightRecord>> {
    let rows = read_csv_rows(bytes)?;
    let dataset = ingest_rows(rows, "csv").context("CSV does not match the flight schema")?;
    Ok(dataset.records)
}
