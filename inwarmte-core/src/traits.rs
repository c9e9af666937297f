//! Trait definitions for `InWarmte`.
//!
//! The polling harness that drives a client only needs this trait, which keeps
//! it independent of the HTTP stack.

use crate::models::{Measurements, SourceType};

/// Trait for clients that can produce current-period measurements.
///
/// Implementors are responsible for:
/// - Authenticating with the metering service when needed
/// - Fetching the raw usage records for the current year
/// - Aggregating them into [`Measurements`] for the configured sources
pub trait MeasurementProvider: Send + Sync {
    /// Error returned when a poll fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the source types this provider reports on.
    fn source_types(&self) -> &[SourceType];

    /// Fetches the current measurements.
    ///
    /// This is an async operation that may involve network requests.
    fn current_measurements(
        &self,
    ) -> impl std::future::Future<Output = Result<Measurements, Self::Error>> + Send;
}
