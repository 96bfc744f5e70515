#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Mutex;

use flight_dashboard::models::FlightRecord;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Every environment variable the configuration layer reads.
pub const CONFIG_ENV_VARS: [&str; 6] = [
    "FLIGHT_SOURCE_TYPE",
    "FLIGHTS_URL",
    "FLIGHTS_FILE",
    "FLIGHTS_CACHE_TTL_SECS",
    "HOST",
    "PORT",
];

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to the process-global
/// environment, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

/// Like [`with_scoped_env`], but first clears every configuration variable
/// so the host environment cannot leak into the test.
pub fn with_clean_config_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let mut all: Vec<(&str, Option<&str>)> = CONFIG_ENV_VARS.iter().map(|k| (*k, None)).collect();
    all.extend_from_slice(changes);
    with_scoped_env(&all, f)
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Three-row table: two AA flights (ArrDelay 10 and 30) and one cancelled BB
/// flight with unknown delay.
pub fn scenario_records() -> Vec<FlightRecord> {
    vec![
        FlightRecord::new("AA")
            .with_date(date(2024, 1, 5))
            .with_route("JFK", "LAX")
            .with_delays(Some(2.0), Some(10.0))
            .with_distance(Some(2475.0), Some(320.0)),
        FlightRecord::new("AA")
            .with_date(date(2024, 2, 7))
            .with_route("JFK", "SFO")
            .with_delays(Some(28.0), Some(30.0))
            .with_distance(Some(2586.0), Some(345.0)),
        FlightRecord::new("BB")
            .with_date(date(2024, 1, 9))
            .with_route("ORD", "ATL")
            .with_flags(true, false),
    ]
}

/// JSON array payload for [`scenario_records`], as an upstream API returns it.
pub const SCENARIO_JSON: &str = r#"[
  {"FlightDate": "2024-01-05", "Airline": "AA",
   "Origin": "JFK", "OriginCityName": "New York, NY", "OriginStateName": "New York",
   "Dest": "LAX", "DestCityName": "Los Angeles, CA", "DestStateName": "California",
   "DepDelay": 2, "ArrDelay": 10, "Distance": 2475, "AirTime": 320, "Cancelled": 0, "Diverted": 0},
  {"FlightDate": "2024-02-07", "Airline": "AA",
   "Origin": "JFK", "OriginCityName": "New York, NY", "OriginStateName": "New York",
   "Dest": "SFO", "DestCityName": "San Francisco, CA", "DestStateName": "California",
   "DepDelay": 28, "ArrDelay": 30, "Distance": 2586, "AirTime": 345, "Cancelled": 0, "Diverted": 0},
  {"FlightDate": "2024-01-09", "Airline": "BB",
   "Origin": "ORD", "OriginCityName": "Chicago, IL", "OriginStateName": "Illinois",
   "Dest": "ATL", "DestCityName": "Atlanta, GA", "DestStateName": "Georgia",
   "DepDelay": null, "ArrDelay": null, "Distance": null, "AirTime": null, "Cancelled": 1, "Diverted": 0}
]"#;
