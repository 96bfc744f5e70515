//! Flight record types shared by the source, pipeline and HTTP layers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Arrival delay (minutes) above which a flight counts as late.
pub const ON_TIME_THRESHOLD_MINUTES: f64 = 15.0;

/// One row of the flight table.
///
/// Field names serialize with the column names used by the upstream tables
/// (`FlightDate`, `ArrDelay`, ...), so JSON output and CSV headers line up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlightRecord {
    pub flight_date: Option<NaiveDate>,
    pub airline: String,
    pub origin: Option<String>,
    pub origin_city_name: Option<String>,
    pub origin_state_name: Option<String>,
    pub dest: Option<String>,
    pub dest_city_name: Option<String>,
    pub dest_state_name: Option<String>,
    pub dep_delay: Option<f64>,
    pub arr_delay: Option<f64>,
    pub distance: Option<f64>,
    pub air_time: Option<f64>,
    pub cancelled: bool,
    pub diverted: bool,
}

impl FlightRecord {
    /// Minimal record with only the airline set; everything else missing.
    pub fn new(airline: impl Into<String>) -> Self {
        Self {
            flight_date: None,
            airline: airline.into(),
            origin: None,
            origin_city_name: None,
            origin_state_name: None,
            dest: None,
            dest_city_name: None,
            dest_state_name: None,
            dep_delay: None,
            arr_delay: None,
            distance: None,
            air_time: None,
            cancelled: false,
            diverted: false,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.flight_date = Some(date);
        self
    }

    pub fn with_route(mut self, origin: impl Into<String>, dest: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self.dest = Some(dest.into());
        self
    }

    pub fn with_delays(mut self, dep_delay: Option<f64>, arr_delay: Option<f64>) -> Self {
        self.dep_delay = dep_delay;
        self.arr_delay = arr_delay;
        self
    }

    pub fn with_distance(mut self, distance: Option<f64>, air_time: Option<f64>) -> Self {
        self.distance = distance;
        self.air_time = air_time;
        self
    }

    pub fn with_flags(mut self, cancelled: bool, diverted: bool) -> Self {
        self.cancelled = cancelled;
        self.diverted = diverted;
        self
    }

    /// Route label `"ORIGIN → DEST"`, `None` when either end is unknown.
    pub fn route(&self) -> Option<String> {
        match (&self.origin, &self.dest) {
            (Some(origin), Some(dest)) => Some(format!("{} → {}", origin, dest)),
            _ => None,
        }
    }

    /// Calendar month of the flight as `YYYY-MM`.
    pub fn year_month(&self) -> Option<String> {
        self.flight_date.map(|d| d.format("%Y-%m").to_string())
    }

    /// Late arrival, cancellation or diversion.
    ///
    /// A missing arrival delay never counts as late.
    pub fn is_affected(&self) -> bool {
        let late = self
            .arr_delay
            .map(|d| d > ON_TIME_THRESHOLD_MINUTES)
            .unwrap_or(false);
        late || self.cancelled || self.diverted
    }
}

/// Which optional columns were present in the loaded payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReport {
    /// Soft columns absent from the payload.
    pub missing_columns: Vec<String>,
    /// Whether a flight date could be derived (`FlightDate` or `Year`+`Month`).
    pub date_available: bool,
}

impl SchemaReport {
    /// Human readable notices for degraded views.
    pub fn notices(&self) -> Vec<String> {
        let mut notices = Vec::new();
        if !self.date_available {
            notices.push(
                "FlightDate is not available: date filtering and the monthly view are disabled"
                    .to_string(),
            );
        }
        for column in &self.missing_columns {
            if column == "FlightDate" && !self.date_available {
                continue;
            }
            notices.push(format!("Column '{}' is missing from the data source", column));
        }
        notices
    }

    pub fn is_missing(&self, column: &str) -> bool {
        self.missing_columns.iter().any(|c| c == column)
    }
}

/// A loaded, immutable flight table.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<FlightRecord>,
    pub schema: SchemaReport,
    /// Description of the source the rows came from.
    pub source: String,
    /// SHA-256 of the raw payload.
    pub checksum: String,
    pub loaded_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(records: Vec<FlightRecord>, schema: SchemaReport, source: impl Into<String>) -> Self {
        Self {
            records,
            schema,
            source: source.into(),
            checksum: String::new(),
            loaded_at: Utc::now(),
        }
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = checksum.into();
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
