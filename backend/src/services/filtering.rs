//! Filter pipeline.
//!
//! A [`FilterSpec`] is compiled into a short list of [`Predicate`]s that are
//! ANDed over every record. Criteria left unconstrained produce no predicate
//! at all, so an unconstrained `FilterSpec` is an identity copy.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{Dataset, DateRange, DelayRange, FilterSpec, FlagMode, FlightRecord};

/// Number of airlines pre-selected by the dashboard on first load.
pub const DEFAULT_AIRLINE_SELECTION: usize = 10;

/// A single compiled filter criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<'a> {
    Airline(&'a BTreeSet<String>),
    Origin(&'a BTreeSet<String>),
    Dest(&'a BTreeSet<String>),
    Cancelled(FlagMode),
    Diverted(FlagMode),
    Date(DateRange),
    ArrDelay(DelayRange),
}

impl Predicate<'_> {
    pub fn matches(&self, record: &FlightRecord) -> bool {
        match self {
            Predicate::Airline(set) => set.contains(&record.airline),
            Predicate::Origin(set) => member(set, record.origin.as_deref()),
            Predicate::Dest(set) => member(set, record.dest.as_deref()),
            Predicate::Cancelled(mode) => mode.matches(record.cancelled),
            Predicate::Diverted(mode) => mode.matches(record.diverted),
            Predicate::Date(range) => record.flight_date.is_some_and(|d| range.contains(d)),
            Predicate::ArrDelay(range) => record.arr_delay.is_some_and(|d| range.contains(d)),
        }
    }
}

fn member(set: &BTreeSet<String>, value: Option<&str>) -> bool {
    value.is_some_and(|v| set.contains(v))
}

/// Compile `spec` into predicates, cheapest first: categorical, flags, date,
/// then numeric range.
///
/// `arr_delay_extent` is the observed (min, max) ArrDelay of the input. A
/// delay range covering it compiles to nothing, which keeps rows whose
/// ArrDelay is missing. With no observed values every range covers the
/// (empty) extent.
pub fn compile_predicates(
    spec: &FilterSpec,
    arr_delay_extent: Option<(f64, f64)>,
) -> Vec<Predicate<'_>> {
    let mut predicates = Vec::new();

    if !spec.airlines.is_empty() {
        predicates.push(Predicate::Airline(&spec.airlines));
    }
    if !spec.origins.is_empty() {
        predicates.push(Predicate::Origin(&spec.origins));
    }
    if !spec.destinations.is_empty() {
        predicates.push(Predicate::Dest(&spec.destinations));
    }
    if !spec.cancelled.is_any() {
        predicates.push(Predicate::Cancelled(spec.cancelled));
    }
    if !spec.diverted.is_any() {
        predicates.push(Predicate::Diverted(spec.diverted));
    }
    if let Some(range) = spec.date_range {
        predicates.push(Predicate::Date(range));
    }
    if let Some(range) = spec.arr_delay_range {
        let covers_all = arr_delay_extent.map_or(true, |extent| range.covers(extent));
        if !covers_all {
            predicates.push(Predicate::ArrDelay(range));
        }
    }

    predicates
}

/// Observed (min, max) of ArrDelay, ignoring missing values.
pub fn arr_delay_extent(records: &[FlightRecord]) -> Option<(f64, f64)> {
    records
        .iter()
        .filter_map(|r| r.arr_delay)
        .fold(None, |acc, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
}

/// Records matching every predicate in `predicates`.
pub fn filter_with(records: &[FlightRecord], predicates: &[Predicate<'_>]) -> Vec<FlightRecord> {
    records
        .iter()
        .filter(|r| predicates.iter().all(|p| p.matches(r)))
        .cloned()
        .collect()
}

/// Apply `spec` to `records`, returning the matching rows in input order.
///
/// The input is never mutated; an empty input yields an empty output.
pub fn apply_filters(records: &[FlightRecord], spec: &FilterSpec) -> Vec<FlightRecord> {
    if records.is_empty() {
        return Vec::new();
    }

    let predicates = compile_predicates(spec, arr_delay_extent(records));
    if predicates.is_empty() {
        return records.to_vec();
    }

    let filtered = filter_with(records, &predicates);
    log::debug!(
        "Filter kept {} of {} records ({} predicates)",
        filtered.len(),
        records.len(),
        predicates.len()
    );
    filtered
}

/// Apply `spec` to a loaded dataset, honoring its schema report.
///
/// When the source carried no usable flight date the date range is a no-op,
/// matching the "date filtering disabled" notice.
pub fn apply_filters_for(dataset: &Dataset, spec: &FilterSpec) -> Vec<FlightRecord> {
    if !dataset.schema.date_available && spec.date_range.is_some() {
        log::debug!("Ignoring date range: {} has no flight dates", dataset.source);
        return apply_filters(&dataset.records, &spec.without_dates());
    }
    apply_filters(&dataset.records, spec)
}

/// Option sets a UI needs to build its filter controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub airlines: Vec<String>,
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    /// First and last known flight date.
    pub date_range: Option<DateRange>,
    /// Observed ArrDelay extent, the natural bounds of a delay slider.
    pub arr_delay_range: Option<DelayRange>,
    /// Suggested initial airline selection.
    pub default_airlines: Vec<String>,
}

impl FilterOptions {
    /// Discover sorted distinct values and extents from the full table.
    pub fn from_records(records: &[FlightRecord]) -> Self {
        let airlines: BTreeSet<&str> = records.iter().map(|r| r.airline.as_str()).collect();
        let origins: BTreeSet<&str> = records.iter().filter_map(|r| r.origin.as_deref()).collect();
        let destinations: BTreeSet<&str> =
            records.iter().filter_map(|r| r.dest.as_deref()).collect();

        let dates: Vec<NaiveDate> = records.iter().filter_map(|r| r.flight_date).collect();
        let date_range = match (dates.iter().min(), dates.iter().max()) {
            (Some(start), Some(end)) => Some(DateRange::new(*start, *end)),
            _ => None,
        };

        let airlines: Vec<String> = airlines.into_iter().map(str::to_string).collect();
        let default_airlines = airlines
            .iter()
            .take(DEFAULT_AIRLINE_SELECTION)
            .cloned()
            .collect();

        Self {
            airlines,
            origins: origins.into_iter().map(str::to_string).collect(),
            destinations: destinations.into_iter().map(str::to_string).collect(),
            date_range,
            arr_delay_range: arr_delay_extent(records).map(|(min, max)| DelayRange::new(min, max)),
            default_airlines,
        }
    }
}

#[cfg(test)]
#[path = "filtering_tests.rs"]
mod filtering_tests;
