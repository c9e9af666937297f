//! Fetch error types.
//!
//! Every failure the client can surface is a [`FetchError`]. The variants map
//! onto how a host should react:
//!
//! | Variant | Host reaction |
//! |---------|---------------|
//! | [`FetchError::Connection`] | Mark data unavailable, try again next poll |
//! | [`FetchError::Protocol`] | Mark data unavailable, not retried within a call |
//! | [`FetchError::Unauthenticated`] | Re-authenticate once, then give up |
//! | [`FetchError::Auth`] | Ask the user to re-enter credentials |

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeout or transport failure.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Unexpected content type, status or body shape.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The token is missing or was rejected by the service.
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// The identity provider rejected the credentials.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] inwarmte_core::CoreError),
}

impl FetchError {
    /// Returns true if this error means the token is missing or expired.
    ///
    /// This is the only kind of failure that triggers re-authentication.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Connection(ConnectionError::Timeout(_)))
    }

    /// Classifies the error for the host.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Connection(_) => ErrorCategory::CannotConnect,
            Self::Protocol(_) => ErrorCategory::Protocol,
            Self::Unauthenticated(_) | Self::Auth(_) => ErrorCategory::InvalidAuth,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

// ============================================================================
// Error Category
// ============================================================================

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The service could not be reached; data is temporarily unavailable.
    CannotConnect,
    /// Credentials or token were rejected; the user has to act.
    InvalidAuth,
    /// The service answered with something unexpected.
    Protocol,
    /// The client is misconfigured.
    Config,
}

impl ErrorCategory {
    /// Returns the error key used by setup flows.
    pub fn key(&self) -> &'static str {
        match self {
            Self::CannotConnect => "cannot_connect",
            Self::InvalidAuth => "invalid_auth",
            Self::Protocol => "unknown",
            Self::Config => "invalid_config",
        }
    }

    /// Returns true if the next scheduled poll may succeed without user action.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::CannotConnect | Self::Protocol)
    }
}

// ============================================================================
// Connection Error
// ============================================================================

/// The request did not produce a response.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The request did not complete within the timeout.
    #[error("Timeout occurred while communicating with InWarmte (after {0:?})")]
    Timeout(Duration),

    /// DNS, TLS, connect or read failure.
    #[error("Error occurred while communicating with InWarmte: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ConnectionError {
    fn from(err: reqwest::Error) -> Self {
        ConnectionError::Transport(err.to_string())
    }
}

// ============================================================================
// Protocol Error
// ============================================================================

/// The service answered, but not with what was expected.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The response is not JSON.
    #[error("Response is not json: {body}")]
    NonJson {
        /// Raw response body.
        body: String,
    },

    /// JSON response with a 4xx/5xx status.
    #[error("Response is not success ({status}): {body}")]
    Unsuccessful {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A required field is absent from the response.
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    /// The body could not be parsed or has the wrong shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::Malformed(err.to_string())
    }
}
