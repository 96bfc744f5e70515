//! Bounded sampling for the distance vs. air time scatter view.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::Serialize;

use crate::models::FlightRecord;

/// Maximum number of scatter points sent to a client.
pub const DEFAULT_SCATTER_SAMPLE_CAP: usize = 5000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub distance: f64,
    pub air_time: f64,
    pub airline: String,
    pub arr_delay: Option<f64>,
    pub origin: Option<String>,
    pub dest: Option<String>,
}

impl ScatterPoint {
    fn from_record(record: &FlightRecord) -> Option<Self> {
        Some(Self {
            distance: record.distance?,
            air_time: record.air_time?,
            airline: record.airline.clone(),
            arr_delay: record.arr_delay,
            origin: record.origin.clone(),
            dest: record.dest.clone(),
        })
    }
}

/// Uniform sample without replacement of at most `cap` rows with known
/// Distance and AirTime, in input order.
///
/// With `seed` the sample is reproducible; without it the generator is
/// seeded from OS entropy.
pub fn sample_scatter(records: &[FlightRecord], cap: usize, seed: Option<u64>) -> Vec<ScatterPoint> {
    let eligible: Vec<&FlightRecord> = records
        .iter()
        .filter(|r| r.distance.is_some() && r.air_time.is_some())
        .collect();

    if eligible.len() <= cap {
        return eligible
            .into_iter()
            .filter_map(ScatterPoint::from_record)
            .collect();
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut picked = index::sample(&mut rng, eligible.len(), cap).into_vec();
    picked.sort_unstable();

    picked
        .into_iter()
        .filter_map(|i| ScatterPoint::from_record(eligible[i]))
        .collect()
}
