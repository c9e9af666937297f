//! Usage normalization and aggregation.
//!
//! Turns the raw monthly records of the current year into per-source
//! "this month" and "this year" totals. Everything here is pure: no I/O, no
//! mutation of the inputs, and identical inputs give identical outputs.

use std::collections::BTreeMap;

use crate::models::{AggregatedMeasurement, Measurements, Period, SourceType, UsagePeriodRecord};

/// Returns the value of every configured source in `record`, with missing and
/// null values replaced by `0.0`.
///
/// Keys in the record that are not configured are ignored.
pub fn normalize(
    record: &UsagePeriodRecord,
    source_types: &[SourceType],
) -> BTreeMap<SourceType, f64> {
    source_types
        .iter()
        .map(|source| (source.clone(), record.value(source).unwrap_or(0.0)))
        .collect()
}

/// Aggregates records into current-period totals for the configured sources.
///
/// - `this_month` is the normalized value of the record for `now`. If the
///   service has no record for that month yet, it is `0.0`.
/// - `this_year` is the sum over all records. The records are expected to be
///   limited to the current year already; they are not filtered again here.
///
/// The yearly sum is computed in chronological order so the result does not
/// depend on the order the service returned the records in.
pub fn aggregate(
    records: &[UsagePeriodRecord],
    source_types: &[SourceType],
    now: Period,
) -> Measurements {
    let current = records
        .iter()
        .find(|record| record.period() == now)
        .map_or_else(
            || normalize(&UsagePeriodRecord::new(now.month, now.year), source_types),
            |record| normalize(record, source_types),
        );

    let mut ordered: Vec<&UsagePeriodRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.period());
    let normalized: Vec<BTreeMap<SourceType, f64>> = ordered
        .into_iter()
        .map(|record| normalize(record, source_types))
        .collect();

    source_types
        .iter()
        .map(|source| {
            let this_month = current.get(source).copied().unwrap_or(0.0);
            let this_year = normalized
                .iter()
                .map(|values| values.get(source).copied().unwrap_or(0.0))
                .sum();
            (
                source.clone(),
                AggregatedMeasurement::new(source.clone(), this_month, this_year),
            )
        })
        .collect()
}
