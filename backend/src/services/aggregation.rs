//! Aggregation engine: grouped counts, means, sums and rates.
//!
//! Results always carry every group; ordering and truncation are applied by
//! the caller (`sort_by_count_desc`, `top_n`, ...). Groups come out of the
//! engine sorted by key.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::models::FlightRecord;

/// Grouping dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// Calendar month `YYYY-MM`; rows without a date are skipped.
    Month,
    Airline,
    /// `"ORIGIN → DEST"`; rows missing either end are skipped.
    Route,
    Origin,
    Dest,
}

impl GroupKey {
    pub fn key_of(&self, record: &FlightRecord) -> Option<String> {
        match self {
            GroupKey::Month => record.year_month(),
            GroupKey::Airline => Some(record.airline.clone()),
            GroupKey::Route => record.route(),
            GroupKey::Origin => record.origin.clone(),
            GroupKey::Dest => record.dest.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GroupKey::Month => "month",
            GroupKey::Airline => "airline",
            GroupKey::Route => "route",
            GroupKey::Origin => "origin",
            GroupKey::Dest => "dest",
        }
    }
}

impl FromStr for GroupKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "month" | "year_month" => Ok(Self::Month),
            "airline" => Ok(Self::Airline),
            "route" => Ok(Self::Route),
            "origin" => Ok(Self::Origin),
            "dest" | "destination" => Ok(Self::Dest),
            other => Err(format!(
                "Unknown group '{}'. Use month, airline, route, origin or dest",
                other
            )),
        }
    }
}

/// Numeric column of a flight record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DepDelay,
    ArrDelay,
    Distance,
    AirTime,
}

impl Field {
    pub fn value(&self, record: &FlightRecord) -> Option<f64> {
        match self {
            Field::DepDelay => record.dep_delay,
            Field::ArrDelay => record.arr_delay,
            Field::Distance => record.distance,
            Field::AirTime => record.air_time,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Field::DepDelay => "dep_delay",
            Field::ArrDelay => "arr_delay",
            Field::Distance => "distance",
            Field::AirTime => "air_time",
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "").as_str() {
            "depdelay" => Ok(Self::DepDelay),
            "arrdelay" => Ok(Self::ArrDelay),
            "distance" => Ok(Self::Distance),
            "airtime" => Ok(Self::AirTime),
            _ => Err(format!("Unknown field '{}'", s)),
        }
    }
}

/// Boolean property of a flight record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Cancelled,
    Diverted,
    /// Late arrival, cancellation or diversion.
    Affected,
}

impl Flag {
    pub fn value(&self, record: &FlightRecord) -> bool {
        match self {
            Flag::Cancelled => record.cancelled,
            Flag::Diverted => record.diverted,
            Flag::Affected => record.is_affected(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Flag::Cancelled => "cancelled",
            Flag::Diverted => "diverted",
            Flag::Affected => "affected",
        }
    }
}

impl FromStr for Flag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cancelled" => Ok(Self::Cancelled),
            "diverted" => Ok(Self::Diverted),
            "affected" | "disrupted" => Ok(Self::Affected),
            _ => Err(format!("Unknown flag '{}'", s)),
        }
    }
}

/// A metric computed per group.
///
/// Text form: `count`, `mean:<field>`, `sum:<field>`, `rate:<flag>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSpec {
    /// Number of rows in the group.
    Count,
    /// Mean over non-missing values; `None` when the group has none.
    Mean(Field),
    /// Sum with missing values counted as 0.
    Sum(Field),
    /// Fraction of rows with the flag set, in [0, 1].
    Rate(Flag),
}

impl fmt::Display for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricSpec::Count => write!(f, "count"),
            MetricSpec::Mean(field) => write!(f, "mean:{}", field.name()),
            MetricSpec::Sum(field) => write!(f, "sum:{}", field.name()),
            MetricSpec::Rate(flag) => write!(f, "rate:{}", flag.name()),
        }
    }
}

impl Serialize for MetricSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for MetricSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("count") {
            return Ok(Self::Count);
        }
        let (kind, arg) = s.split_once(':').ok_or_else(|| {
            format!(
                "Invalid metric '{}'. Use count, mean:<field>, sum:<field> or rate:<flag>",
                s
            )
        })?;
        match kind.to_lowercase().as_str() {
            "mean" | "avg" => Ok(Self::Mean(arg.parse()?)),
            "sum" => Ok(Self::Sum(arg.parse()?)),
            "rate" => Ok(Self::Rate(arg.parse()?)),
            _ => Err(format!("Unknown metric kind '{}'", kind)),
        }
    }
}

/// Parse a comma separated metric list; empty input means `[Count]`.
pub fn parse_metrics(list: &str) -> Result<Vec<MetricSpec>, String> {
    let metrics: Vec<MetricSpec> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(MetricSpec::from_str)
        .collect::<Result<_, _>>()?;
    if metrics.is_empty() {
        Ok(vec![MetricSpec::Count])
    } else {
        Ok(metrics)
    }
}

/// One group of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: String,
    /// Rows in the group.
    pub count: usize,
    /// One value per requested metric, `None` meaning "no data".
    pub values: Vec<Option<f64>>,
}

/// Grouped summary of a filtered table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub dimension: String,
    pub metrics: Vec<MetricSpec>,
    pub rows: Vec<GroupRow>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Sum of group counts.
    pub fn total_count(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn get(&self, key: &str) -> Option<&GroupRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Value of the metric at `metric_index` for group `key`.
    pub fn value(&self, key: &str, metric_index: usize) -> Option<f64> {
        self.get(key)?.values.get(metric_index).copied().flatten()
    }

    /// Index of `metric` in this result.
    pub fn metric_index(&self, metric: MetricSpec) -> Option<usize> {
        self.metrics.iter().position(|m| *m == metric)
    }

    /// Largest count first; ties by key.
    pub fn sort_by_count_desc(mut self) -> Self {
        self.rows
            .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        self
    }

    /// Largest value of the metric at `metric_index` first; missing values
    /// last, ties by key.
    pub fn sort_by_metric_desc(mut self, metric_index: usize) -> Self {
        self.rows.sort_by(|a, b| {
            let va = a.values.get(metric_index).copied().flatten();
            let vb = b.values.get(metric_index).copied().flatten();
            let by_value = match (va, vb) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_value.then_with(|| a.key.cmp(&b.key))
        });
        self
    }

    /// Ascending by key.
    pub fn sort_by_key(mut self) -> Self {
        self.rows.sort_by(|a, b| a.key.cmp(&b.key));
        self
    }

    /// Keep the first `n` groups.
    pub fn top_n(mut self, n: usize) -> Self {
        self.rows.truncate(n);
        self
    }
}

struct Accumulator {
    count: usize,
    totals: Vec<f64>,
    observed: Vec<usize>,
}

impl Accumulator {
    fn new(metrics: usize) -> Self {
        Self {
            count: 0,
            totals: vec![0.0; metrics],
            observed: vec![0; metrics],
        }
    }

    fn push(&mut self, record: &FlightRecord, metrics: &[MetricSpec]) {
        self.count += 1;
        for (i, metric) in metrics.iter().enumerate() {
            match metric {
                MetricSpec::Count => {}
                MetricSpec::Mean(field) | MetricSpec::Sum(field) => {
                    if let Some(v) = field.value(record) {
                        self.totals[i] += v;
                        self.observed[i] += 1;
                    }
                }
                MetricSpec::Rate(flag) => {
                    if flag.value(record) {
                        self.totals[i] += 1.0;
                    }
                }
            }
        }
    }

    fn finish(self, key: String, metrics: &[MetricSpec]) -> GroupRow {
        let values = metrics
            .iter()
            .enumerate()
            .map(|(i, metric)| match metric {
                MetricSpec::Count => Some(self.count as f64),
                MetricSpec::Mean(_) => {
                    (self.observed[i] > 0).then(|| self.totals[i] / self.observed[i] as f64)
                }
                MetricSpec::Sum(_) => Some(self.totals[i]),
                MetricSpec::Rate(_) => {
                    (self.count > 0).then(|| self.totals[i] / self.count as f64)
                }
            })
            .collect();
        GroupRow {
            key,
            count: self.count,
            values,
        }
    }
}

/// Group `records` by a custom key and compute `metrics` per group.
///
/// Rows for which `key_fn` returns `None` belong to no group.
pub fn aggregate_by<F>(
    records: &[FlightRecord],
    dimension: &str,
    key_fn: F,
    metrics: &[MetricSpec],
) -> AggregationResult
where
    F: Fn(&FlightRecord) -> Option<String>,
{
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for record in records {
        let Some(key) = key_fn(record) else {
            continue;
        };
        groups
            .entry(key)
            .or_insert_with(|| Accumulator::new(metrics.len()))
            .push(record, metrics);
    }

    AggregationResult {
        dimension: dimension.to_string(),
        metrics: metrics.to_vec(),
        rows: groups
            .into_iter()
            .map(|(key, acc)| acc.finish(key, metrics))
            .collect(),
    }
}

/// Group `records` by one of the standard dimensions.
pub fn aggregate(
    records: &[FlightRecord],
    key: GroupKey,
    metrics: &[MetricSpec],
) -> AggregationResult {
    aggregate_by(records, key.name(), |r| key.key_of(r), metrics)
}

#[cfg(test)]
#[path = "aggregation_tests.rs"]
mod aggregation_tests;
