//! Host APIs for `InWarmte` requests.
//!
//! - [`http`] - Request executor with timeout and response classification

pub mod http;

// Re-export key types
pub use http::{ApiRequest, Method, RequestExecutor};
