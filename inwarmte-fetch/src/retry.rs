//! Retry policy for expired authentication.
//!
//! Only [`FetchError::Unauthenticated`] is ever retried, and only a bounded
//! number of times. Connection and protocol errors are left to the next
//! scheduled poll.

use crate::error::FetchError;

/// Bounded retry policy for authentication expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRetryPolicy {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
}

impl AuthRetryPolicy {
    /// One attempt plus one retry after re-authenticating.
    pub const MAX_ATTEMPTS: u32 = 2;

    /// Creates a policy with the given attempt limit (at least one).
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Determines if a failed attempt should be followed by another one.
    ///
    /// `attempt` is the 1-based number of the attempt that just failed.
    pub fn should_retry(&self, error: &FetchError, attempt: u32) -> bool {
        attempt < self.max_attempts && error.is_unauthenticated()
    }
}

impl Default for AuthRetryPolicy {
    fn default() -> Self {
        Self::new(Self::MAX_ATTEMPTS)
    }
}
