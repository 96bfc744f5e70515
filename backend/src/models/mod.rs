//! Domain models for the flight dashboard.

pub mod filter;
pub mod flight;

pub use filter::{DateRange, DelayRange, FilterSpec, FilterSpecBuilder, FlagMode};
pub use flight::{Dataset, FlightRecord, SchemaReport, ON_TIME_THRESHOLD_MINUTES};
