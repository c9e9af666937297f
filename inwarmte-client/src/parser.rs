//! Usage response parser.
//!
//! The usage endpoint returns one object per month:
//!
//! ```json
//! [
//!   { "month": 1, "year": 2024, "hot": 3.1, "hot_tap": null, "electra": 120.5, "cold": 0.0 }
//! ]
//! ```

use inwarmte_core::{Period, SourceType, UsagePeriodRecord};
use inwarmte_fetch::{FetchError, ProtocolError};
use serde_json::{Map, Value};
use tracing::debug;

/// Parses the body of a usage response.
///
/// Every numeric or null field other than `month` and `year` becomes a
/// source value; fields of any other type are ignored.
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] if the body is not an array, an entry
/// has no valid `month`/`year`, or a value is negative or not finite.
pub fn parse_usage_response(body: Value) -> Result<Vec<UsagePeriodRecord>, FetchError> {
    let Value::Array(entries) = body else {
        return Err(malformed("expected an array of usage records"));
    };

    debug!(count = entries.len(), "Parsing usage records");

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(fields) => parse_record(fields),
            _ => Err(malformed(format!("record {index} is not an object"))),
        })
        .collect()
}

fn parse_record(fields: &Map<String, Value>) -> Result<UsagePeriodRecord, FetchError> {
    let month = fields
        .get("month")
        .and_then(Value::as_u64)
        .and_then(|m| u32::try_from(m).ok())
        .ok_or_else(|| malformed("record without valid month"))?;
    let year = fields
        .get("year")
        .and_then(Value::as_i64)
        .and_then(|y| i32::try_from(y).ok())
        .ok_or_else(|| malformed("record without valid year"))?;
    let period = Period::new(month, year).map_err(|e| malformed(e.to_string()))?;

    let mut record = UsagePeriodRecord::new(period.month, period.year);
    for (key, value) in fields {
        if key == "month" || key == "year" {
            continue;
        }
        let value = match value {
            Value::Null => None,
            Value::Number(n) => {
                let v = n
                    .as_f64()
                    .ok_or_else(|| malformed(format!("{key} is not a float")))?;
                if !v.is_finite() || v < 0.0 {
                    return Err(malformed(format!("{key} for {period} is {v}")));
                }
                Some(v)
            }
            _ => continue,
        };
        record = record.with_value(SourceType::new(key.as_str()), value);
    }

    Ok(record)
}

fn malformed(message: impl Into<String>) -> FetchError {
    ProtocolError::Malformed(message.into()).into()
}
