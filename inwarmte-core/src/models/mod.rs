//! Domain models for `InWarmte`.
//!
//! ## Submodules
//!
//! - [`source`] - Source types (SourceType, EnergyUnit)
//! - [`usage`] - Usage types (Period, UsagePeriodRecord, AggregatedMeasurement)

mod source;
mod usage;

pub use source::{EnergyUnit, SourceType};
pub use usage::{AggregatedMeasurement, MeasurementPeriod, Measurements, Period, UsagePeriodRecord};
