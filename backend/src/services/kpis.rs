//! Headline KPIs of a filtered flight table.

use serde::Serialize;

use crate::models::{FlightRecord, ON_TIME_THRESHOLD_MINUTES};

/// Scalar KPIs. Every field but `total_flights` is `None` on an empty table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightKpis {
    pub total_flights: usize,
    pub mean_dep_delay: Option<f64>,
    pub mean_arr_delay: Option<f64>,
    /// Share of flights with known ArrDelay arriving within 15 minutes.
    pub on_time_rate: Option<f64>,
    pub cancellation_rate: Option<f64>,
    pub diversion_rate: Option<f64>,
    /// Share of flights that were late, cancelled or diverted.
    pub disruption_rate: Option<f64>,
}

/// Mean of the present values; `None` when there are none.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn rate(hits: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| hits as f64 / total as f64)
}

pub fn compute_kpis(records: &[FlightRecord]) -> FlightKpis {
    let total = records.len();
    if total == 0 {
        return FlightKpis::default();
    }

    let known_arrivals: Vec<f64> = records.iter().filter_map(|r| r.arr_delay).collect();
    let on_time = known_arrivals
        .iter()
        .filter(|d| **d <= ON_TIME_THRESHOLD_MINUTES)
        .count();

    FlightKpis {
        total_flights: total,
        mean_dep_delay: mean(records.iter().map(|r| r.dep_delay)),
        mean_arr_delay: mean(known_arrivals.iter().copied().map(Some)),
        on_time_rate: rate(on_time, known_arrivals.len()),
        cancellation_rate: rate(records.iter().filter(|r| r.cancelled).count(), total),
        diversion_rate: rate(records.iter().filter(|r| r.diverted).count(), total),
        disruption_rate: rate(records.iter().filter(|r| r.is_affected()).count(), total),
    }
}
