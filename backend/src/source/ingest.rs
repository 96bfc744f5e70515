//! Ingestion of loosely typed rows into [`FlightRecord`]s.
//!
//! Sources hand over rows as JSON objects keyed by column name. Ingestion
//! checks the column set once, then coerces every value the way a lenient
//! numeric parser would: anything that does not parse becomes missing.

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::checksum::calculate_checksum;
use super::error::{ErrorContext, SourceError, SourceResult};
use crate::models::{Dataset, FlightRecord, SchemaReport};

/// A single untyped row, as delivered by a JSON API or a CSV reader.
pub type RawRow = Map<String, Value>;

/// Columns without which the filter pipeline cannot work.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Airline", "Origin", "Dest"];

/// Columns whose absence only degrades dependent views.
pub const OPTIONAL_COLUMNS: [&str; 11] = [
    "FlightDate",
    "OriginCityName",
    "OriginStateName",
    "DestCityName",
    "DestStateName",
    "DepDelay",
    "ArrDelay",
    "Distance",
    "AirTime",
    "Cancelled",
    "Diverted",
];

/// Parse a JSON array payload and ingest it.
pub fn ingest_json_bytes(payload: &[u8], source: &str) -> SourceResult<Dataset> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| SourceError::from(e).with_source(source))?;

    let rows = match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(SourceError::parse_with_context(
                    format!("Expected a JSON object, found {}", json_kind(&other)),
                    ErrorContext::new("decode_json")
                        .with_source(source)
                        .with_row(idx),
                )),
            })
            .collect::<SourceResult<Vec<RawRow>>>()?,
        other => {
            return Err(SourceError::parse_with_context(
                format!("Expected a JSON array of records, found {}", json_kind(&other)),
                ErrorContext::new("decode_json").with_source(source),
            ))
        }
    };

    Ok(ingest_rows(rows, source)?.with_checksum(calculate_checksum(payload)))
}

/// Validate the column set and convert raw rows into a [`Dataset`].
pub fn ingest_rows(rows: Vec<RawRow>, source: &str) -> SourceResult<Dataset> {
    if rows.is_empty() {
        debug!("Source {} returned no rows", source);
        let schema = SchemaReport {
            missing_columns: Vec::new(),
            date_available: true,
        };
        return Ok(Dataset::new(Vec::new(), schema, source));
    }

    let columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    let schema = check_schema(&columns, source)?;

    let records = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| record_from_row(row, idx, source))
        .collect::<SourceResult<Vec<FlightRecord>>>()?;

    debug!(
        "Ingested {} flight records from {} (missing columns: {:?})",
        records.len(),
        source,
        schema.missing_columns
    );

    Ok(Dataset::new(records, schema, source))
}

fn check_schema(columns: &BTreeSet<&str>, source: &str) -> SourceResult<SchemaReport> {
    for required in REQUIRED_COLUMNS {
        if !columns.contains(required) {
            return Err(SourceError::schema_with_context(
                format!("Required column '{}' is absent", required),
                ErrorContext::new("ingest")
                    .with_source(source)
                    .with_column(required),
            ));
        }
    }

    let missing_columns: Vec<String> = OPTIONAL_COLUMNS
        .iter()
        .filter(|c| !columns.contains(*c))
        .map(|c| c.to_string())
        .collect();

    let date_available = columns.contains("FlightDate")
        || (columns.contains("Year") && columns.contains("Month"));

    if !missing_columns.is_empty() {
        warn!(
            "Source {} is missing optional columns: {}",
            source,
            missing_columns.join(", ")
        );
    }

    Ok(SchemaReport {
        missing_columns,
        date_available,
    })
}

fn record_from_row(row: &RawRow, idx: usize, source: &str) -> SourceResult<FlightRecord> {
    let airline = row.get("Airline").and_then(coerce_string).ok_or_else(|| {
        SourceError::schema_with_context(
            "Airline is null or empty",
            ErrorContext::new("ingest")
                .with_source(source)
                .with_column("Airline")
                .with_row(idx),
        )
    })?;

    let flight_date = row
        .get("FlightDate")
        .and_then(coerce_date)
        .or_else(|| year_month_fallback(row));

    Ok(FlightRecord {
        flight_date,
        airline,
        origin: string_field(row, "Origin"),
        origin_city_name: string_field(row, "OriginCityName"),
        origin_state_name: string_field(row, "OriginStateName"),
        dest: string_field(row, "Dest"),
        dest_city_name: string_field(row, "DestCityName"),
        dest_state_name: string_field(row, "DestStateName"),
        dep_delay: numeric_field(row, "DepDelay"),
        arr_delay: numeric_field(row, "ArrDelay"),
        distance: numeric_field(row, "Distance"),
        air_time: numeric_field(row, "AirTime"),
        cancelled: row.get("Cancelled").map(coerce_flag).unwrap_or(false),
        diverted: row.get("Diverted").map(coerce_flag).unwrap_or(false),
    })
}

fn string_field(row: &RawRow, column: &str) -> Option<String> {
    row.get(column).and_then(coerce_string)
}

fn numeric_field(row: &RawRow, column: &str) -> Option<f64> {
    row.get(column).and_then(coerce_f64)
}

/// First day of the `Year`/`Month` pair, when the row carries one.
fn year_month_fallback(row: &RawRow) -> Option<NaiveDate> {
    let year = row.get("Year").and_then(coerce_f64)?;
    let month = row.get("Month").and_then(coerce_f64)?;
    if year.fract() != 0.0 || month.fract() != 0.0 || month < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year as i32, month as u32, 1)
}

/// Lenient numeric coercion; non-finite or unparsable values are missing.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// 0/1 flag coercion; null and anything unrecognised is false.
pub fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0 && !v.is_nan()).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            match s.as_str() {
                "true" | "yes" | "y" => true,
                _ => s.parse::<f64>().map(|v| v != 0.0 && !v.is_nan()).unwrap_or(false),
            }
        }
        _ => false,
    }
}

/// Non-empty string coercion. Numbers are rendered, other kinds are missing.
pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Date coercion from ISO strings, timestamps or epoch milliseconds.
pub fn coerce_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    // "2024-01-05T00:00:00", "2024-01-05 00:00:00.000"
    if s.len() > 10 && s.is_char_boundary(10) {
        let (head, tail) = s.split_at(10);
        if tail.starts_with('T') || tail.starts_with(' ') {
            if let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }
    NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod ingest_tests;
