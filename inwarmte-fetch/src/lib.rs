// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `InWarmte` Fetch
//!
//! HTTP request execution and the error taxonomy for the `InWarmte` client.
//!
//! ## Host APIs
//!
//! - [`host::http`] - Request executor with timeout, header injection and
//!   response classification
//!
//! ## Errors
//!
//! - [`FetchError`] - Every failure a request or a poll can end in
//! - [`ErrorCategory`] - How a host should react to a failure
//!
//! ## Retry
//!
//! - [`AuthRetryPolicy`] - Bounded retry on authentication expiry only
//!
//! ## Example
//!
//! ```ignore
//! use inwarmte_fetch::{ApiRequest, RequestExecutor};
//!
//! let executor = RequestExecutor::new()?;
//! let request = ApiRequest::get(url).with_query("add_prediction", "false");
//! let body = executor.execute(request, Some(&token), Ok).await?;
//! ```

pub mod error;
pub mod host;
pub mod retry;
pub mod token;

// Errors
pub use error::{ConnectionError, ErrorCategory, FetchError, ProtocolError};

// Host APIs
pub use host::http::{ApiRequest, DEFAULT_TIMEOUT_SECS, Method, RequestExecutor};

// Session primitives
pub use retry::AuthRetryPolicy;
pub use token::BearerToken;
