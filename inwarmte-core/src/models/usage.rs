//! Usage-related types.
//!
//! This module contains types related to usage tracking:
//! - [`Period`] - A calendar month
//! - [`UsagePeriodRecord`] - One month of usage as reported by the service
//! - [`AggregatedMeasurement`] - Current-period totals for one source
//! - [`MeasurementPeriod`] - Which of the two totals is meant

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::source::SourceType;
use crate::error::CoreError;

/// Current-period totals for every configured source.
pub type Measurements = BTreeMap<SourceType, AggregatedMeasurement>;

// ============================================================================
// Period
// ============================================================================

/// A calendar month.
///
/// Ordering is chronological (year first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Year.
    pub year: i32,
    /// Month (1-12).
    pub month: u32,
}

impl Period {
    /// Creates a period, validating the month.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` if `month` is outside 1-12.
    pub fn new(month: u32, year: i32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidData(format!(
                "month {month} out of valid range [1, 12]"
            )));
        }
        Ok(Self { year, month })
    }

    /// Returns the period containing the given date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns the period containing today's local date.
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    /// Returns January 1 of this period's year.
    pub fn start_of_year(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, 1, 1)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ============================================================================
// Usage Period Record
// ============================================================================

/// One month of usage as reported by the metering service.
///
/// Values are kept as reported: a source may be missing entirely or be
/// explicitly null. Use [`crate::normalize`] for a null-safe view.
#[derive(Debug, Clone, PartialEq)]
pub struct UsagePeriodRecord {
    /// Month (1-12).
    pub month: u32,
    /// Year.
    pub year: i32,
    /// Reported value per source key.
    pub per_source: BTreeMap<SourceType, Option<f64>>,
}

impl UsagePeriodRecord {
    /// Creates a record without any source values.
    pub fn new(month: u32, year: i32) -> Self {
        Self {
            month,
            year,
            per_source: BTreeMap::new(),
        }
    }

    /// Adds a source value (builder style).
    #[must_use]
    pub fn with_value(mut self, source: SourceType, value: Option<f64>) -> Self {
        self.per_source.insert(source, value);
        self
    }

    /// Returns the period of this record.
    pub fn period(&self) -> Period {
        Period {
            year: self.year,
            month: self.month,
        }
    }

    /// Returns the reported value for a source, or `None` when it is
    /// missing or null.
    pub fn value(&self, source: &SourceType) -> Option<f64> {
        self.per_source.get(source).copied().flatten()
    }
}

// ============================================================================
// Aggregated Measurement
// ============================================================================

/// Which current-period total a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementPeriod {
    /// Usage in the current calendar month.
    ThisMonth,
    /// Usage since January 1 of the current year.
    ThisYear,
}

impl MeasurementPeriod {
    /// Returns both periods.
    pub fn all() -> &'static [MeasurementPeriod] {
        &[Self::ThisMonth, Self::ThisYear]
    }

    /// Returns the wire name (`this_month` / `this_year`).
    pub fn key(&self) -> &'static str {
        match self {
            Self::ThisMonth => "this_month",
            Self::ThisYear => "this_year",
        }
    }

    /// Returns the display suffix.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ThisMonth => "this month",
            Self::ThisYear => "this year",
        }
    }
}

/// Current-period totals for a single source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMeasurement {
    /// The source these totals belong to.
    pub source: SourceType,
    /// Usage in the current calendar month.
    pub this_month: f64,
    /// Usage since January 1 of the current year.
    pub this_year: f64,
}

impl AggregatedMeasurement {
    /// Creates a measurement.
    pub fn new(source: SourceType, this_month: f64, this_year: f64) -> Self {
        Self {
            source,
            this_month,
            this_year,
        }
    }

    /// Creates an all-zero measurement.
    pub fn zero(source: SourceType) -> Self {
        Self::new(source, 0.0, 0.0)
    }

    /// Returns the total for the given period.
    pub fn value(&self, period: MeasurementPeriod) -> f64 {
        match period {
            MeasurementPeriod::ThisMonth => self.this_month,
            MeasurementPeriod::ThisYear => self.this_year,
        }
    }

    /// Returns a copy with both totals rounded to `precision` decimals.
    ///
    /// A value that cannot be scaled by `10^precision` without overflowing is
    /// returned unchanged.
    #[must_use]
    pub fn rounded(&self, precision: u32) -> Self {
        let factor = 10f64.powi(i32::try_from(precision).unwrap_or(i32::MAX));
        let round = |value: f64| {
            let scaled = value * factor;
            if scaled.is_finite() {
                scaled.round() / factor
            } else {
                value
            }
        };
        Self {
            source: self.source.clone(),
            this_month: round(self.this_month),
            this_year: round(self.this_year),
        }
    }
}
