//! # Flight Dashboard Backend
//!
//! Filtering, aggregation and KPI engine for an airline flight-performance
//! dashboard, with an optional Axum REST API for a chart-rendering frontend.
//!
//! ## Architecture
//!
//! - [`models`]: Flight records, datasets and filter specifications
//! - [`source`]: Record sources (memory, file, HTTP), ingestion and the dataset cache
//! - [`services`]: Pure filter pipeline, aggregation engine, KPIs and dashboard views
//! - [`io`]: CSV export and import
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Example
//!
//! ```
//! use flight_dashboard::models::{FilterSpec, FlightRecord};
//! use flight_dashboard::services::{aggregate, apply_filters, compute_kpis, Field, GroupKey, MetricSpec};
//!
//! let records = vec![
//!     FlightRecord::new("AA").with_delays(None, Some(10.0)),
//!     FlightRecord::new("AA").with_delays(None, Some(30.0)),
//!     FlightRecord::new("BB").with_flags(true, false),
//! ];
//!
//! let spec = FilterSpec::builder().airlines(["AA"]).build();
//! let filtered = apply_filters(&records, &spec);
//! let by_airline = aggregate(&filtered, GroupKey::Airline, &[MetricSpec::Mean(Field::ArrDelay)]);
//!
//! assert_eq!(by_airline.value("AA", 0), Some(20.0));
//! assert_eq!(compute_kpis(&filtered).total_flights, 2);
//! ```

// SourceError carries a structured context in every variant
#![allow(clippy::result_large_err)]

pub mod io;
pub mod models;
pub mod services;
pub mod source;

#[cfg(feature = "http-server")]
pub mod http;
