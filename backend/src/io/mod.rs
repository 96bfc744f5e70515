//! CSV import/export of flight tables.
//!
//! The export mirrors the in-memory table: one header row, one row per
//! record, no index column, ISO dates and plain decimals.
//!
//! # Example
//!
//! ```no_run
//! use flight_dashboard::io::{read_flights_csv, write_flights_csv};
//! use flight_dashboard::models::FlightRecord;
//!
//! let bytes = write_flights_csv(&[FlightRecord::new("AA")]).expect("export");
//! let records = read_flights_csv(&bytes).expect("import");
//! assert_eq!(records.len(), 1);
//! ```

pub mod flights_csv;

pub use flights_csv::{
    read_csv_rows, read_flights_csv, records_to_dataframe, write_flights_csv,
    write_flights_csv_file, CSV_COLUMNS,
};
