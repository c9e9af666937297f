// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `InWarmte` Core
//!
//! Core types, models, and usage aggregation for the `InWarmte` client.
//!
//! This crate holds everything that does not touch the network:
//!
//! - Domain models (source types, monthly usage records, measurements)
//! - The pure usage aggregator
//! - Error types
//! - The [`MeasurementProvider`] trait implemented by clients
//!
//! ## Key Types
//!
//! ### Sources
//! - [`SourceType`] - Open set of tracked energy categories
//! - [`EnergyUnit`] - Unit a source is reported in
//!
//! ### Usage
//! - [`Period`] - A calendar month
//! - [`UsagePeriodRecord`] - One month of raw usage as reported by the service
//! - [`AggregatedMeasurement`] - This month / this year totals for one source
//! - [`Measurements`] - Totals for every configured source
//!
//! ### Aggregation
//! - [`aggregate()`] - Normalizes records and computes current-period totals
//! - [`normalize()`] - Null-safe view of a single record

pub mod aggregate;
pub mod error;
pub mod models;
pub mod traits;

pub use aggregate::{aggregate, normalize};
pub use error::CoreError;

pub use models::{
    // Source types
    EnergyUnit,
    SourceType,
    // Usage types
    AggregatedMeasurement,
    MeasurementPeriod,
    Measurements,
    Period,
    UsagePeriodRecord,
};

pub use traits::MeasurementProvider;
