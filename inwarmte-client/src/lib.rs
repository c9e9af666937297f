// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `InWarmte` Client
//!
//! Session handling, usage fetching and the measurement facade for the
//! `InWarmte` metering service.
//!
//! - **Auth**: Credentials, bearer token and sign-in ([`AuthSession`])
//! - **Fetcher**: Raw monthly usage records ([`UsageFetcher`])
//! - **Parser**: Usage response validation
//! - **Client**: Authenticate, fetch, retry once on expiry, aggregate
//!   ([`InWarmteClient`])
//!
//! ## Usage
//!
//! ```ignore
//! use inwarmte_client::{ClientConfig, InWarmteClient};
//!
//! let client = InWarmteClient::new(ClientConfig::new("user@example.com", "secret"))?;
//! let measurements = client.current_measurements().await?;
//!
//! for (source, m) in &measurements {
//!     println!("{}: {} this month, {} this year", source.display_name(), m.this_month, m.this_year);
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod fetcher;
pub mod parser;

pub use auth::{AuthSession, Credentials, RemoteAuthState};
pub use client::InWarmteClient;
pub use config::ClientConfig;
pub use fetcher::UsageFetcher;
pub use parser::parse_usage_response;

// Re-export the types a host needs alongside the client
pub use inwarmte_core::{AggregatedMeasurement, Measurements, MeasurementPeriod, SourceType};
pub use inwarmte_fetch::{AuthRetryPolicy, ErrorCategory, FetchError};
