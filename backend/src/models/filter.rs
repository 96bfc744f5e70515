//! Filter configuration built fresh for every dashboard query.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// An inverted range contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Inclusive arrival delay range in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: f64,
    pub max: f64,
}

impl DelayRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// True when the range spans the whole `(min, max)` extent.
    pub fn covers(&self, extent: (f64, f64)) -> bool {
        self.min <= extent.0 && self.max >= extent.1
    }
}

/// Tri-state filter over a 0/1 flag column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagMode {
    /// No filtering.
    #[default]
    Any,
    /// Keep rows where the flag is set.
    OnlyTrue,
    /// Keep rows where the flag is not set.
    OnlyFalse,
}

impl FlagMode {
    pub fn matches(&self, flag: bool) -> bool {
        match self {
            FlagMode::Any => true,
            FlagMode::OnlyTrue => flag,
            FlagMode::OnlyFalse => !flag,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, FlagMode::Any)
    }
}

impl FromStr for FlagMode {
    type Err = String;

    /// Accepts the generic names as well as the cancelled/diverted wording
    /// used by the dashboard selectors.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "any" | "all" => Ok(Self::Any),
            "only_true" | "true" | "only_cancelled" | "only_diverted" => Ok(Self::OnlyTrue),
            "only_false" | "false" | "only_not_cancelled" | "only_not_diverted" => {
                Ok(Self::OnlyFalse)
            }
            other => Err(format!(
                "Invalid flag mode '{}'. Use any, only_true or only_false",
                other
            )),
        }
    }
}

impl fmt::Display for FlagMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlagMode::Any => "any",
            FlagMode::OnlyTrue => "only_true",
            FlagMode::OnlyFalse => "only_false",
        };
        write!(f, "{}", s)
    }
}

/// Immutable set of filter criteria.
///
/// Every criterion left at its default is unconstrained: empty sets and
/// `None` ranges let all rows through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub date_range: Option<DateRange>,
    pub airlines: BTreeSet<String>,
    pub origins: BTreeSet<String>,
    pub destinations: BTreeSet<String>,
    pub arr_delay_range: Option<DelayRange>,
    pub cancelled: FlagMode,
    pub diverted: FlagMode,
}

impl FilterSpec {
    pub fn builder() -> FilterSpecBuilder {
        FilterSpecBuilder::default()
    }

    /// True when no criterion constrains the table.
    pub fn is_unconstrained(&self) -> bool {
        self.date_range.is_none()
            && self.airlines.is_empty()
            && self.origins.is_empty()
            && self.destinations.is_empty()
            && self.arr_delay_range.is_none()
            && self.cancelled.is_any()
            && self.diverted.is_any()
    }

    /// The same criteria with the date range dropped.
    pub fn without_dates(&self) -> Self {
        Self {
            date_range: None,
            ..self.clone()
        }
    }
}

/// Builder for [`FilterSpec`].
#[derive(Debug, Clone, Default)]
pub struct FilterSpecBuilder {
    spec: FilterSpec,
}

impl FilterSpecBuilder {
    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.spec.date_range = Some(DateRange::new(start, end));
        self
    }

    pub fn airlines<I, S>(mut self, airlines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.airlines = airlines.into_iter().map(Into::into).collect();
        self
    }

    pub fn origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.origins = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn destinations<I, S>(mut self, destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.destinations = destinations.into_iter().map(Into::into).collect();
        self
    }

    pub fn arr_delay_range(mut self, min: f64, max: f64) -> Self {
        self.spec.arr_delay_range = Some(DelayRange::new(min, max));
        self
    }

    pub fn cancelled(mut self, mode: FlagMode) -> Self {
        self.spec.cancelled = mode;
        self
    }

    pub fn diverted(mut self, mode: FlagMode) -> Self {
        self.spec.diverted = mode;
        self
    }

    pub fn build(self) -> FilterSpec {
        self.spec
    }
}
