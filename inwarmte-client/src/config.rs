//! Client configuration.
//!
//! The host hands over the stored config entry as JSON; everything except the
//! credentials has a default.

use std::fmt;
use std::time::Duration;

use inwarmte_core::{CoreError, SourceType};
use inwarmte_fetch::DEFAULT_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::api::{SIGN_IN_URL, USAGE_URL};
use crate::auth::Credentials;

/// Client configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Account email.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Timeout for a single request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Source types to aggregate.
    #[serde(default = "SourceType::defaults")]
    pub source_types: Vec<SourceType>,
    /// Interval between polls, in seconds. Advisory, for the scheduler.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Decimal places for displayed values. Advisory, for presentation.
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Password sign-in endpoint.
    #[serde(default = "default_sign_in_url")]
    pub sign_in_url: String,
    /// Usage endpoint.
    #[serde(default = "default_usage_url")]
    pub usage_url: String,
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_poll_interval() -> u64 {
    1800
}

fn default_precision() -> u32 {
    3
}

fn default_sign_in_url() -> String {
    SIGN_IN_URL.to_string()
}

fn default_usage_url() -> String {
    USAGE_URL.to_string()
}

impl ClientConfig {
    /// Creates a configuration with default settings.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            request_timeout_secs: default_request_timeout(),
            source_types: SourceType::defaults(),
            poll_interval_secs: default_poll_interval(),
            precision: default_precision(),
            sign_in_url: default_sign_in_url(),
            usage_url: default_usage_url(),
        }
    }

    /// Creates a default configuration with credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidConfig` if `INWARMTE_USERNAME` or
    /// `INWARMTE_PASSWORD` is unset or empty.
    pub fn from_env() -> Result<Self, CoreError> {
        let credentials = Credentials::from_env().ok_or_else(|| {
            CoreError::InvalidConfig(
                "INWARMTE_USERNAME and INWARMTE_PASSWORD must be set".to_string(),
            )
        })?;
        debug!("Loaded credentials from environment");
        Ok(Self::new(credentials.username(), credentials.password()))
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Serialization` for invalid JSON and
    /// `CoreError::InvalidConfig` for invalid values.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the request timeout (builder style).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs();
        self
    }

    /// Sets the source types (builder style).
    #[must_use]
    pub fn with_source_types(mut self, source_types: Vec<SourceType>) -> Self {
        self.source_types = source_types;
        self
    }

    /// Sets both endpoints (builder style).
    #[must_use]
    pub fn with_endpoints(mut self, sign_in_url: &str, usage_url: &str) -> Self {
        self.sign_in_url = sign_in_url.to_string();
        self.usage_url = usage_url.to_string();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.username.trim().is_empty() {
            return Err(CoreError::InvalidConfig("username is empty".to_string()));
        }
        if self.password.is_empty() {
            return Err(CoreError::InvalidConfig("password is empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.source_types.is_empty() {
            return Err(CoreError::InvalidConfig(
                "source_types must not be empty".to_string(),
            ));
        }
        self.sign_in_endpoint()?;
        self.usage_endpoint()?;
        Ok(())
    }

    /// Returns the request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Returns the credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    /// Returns the parsed sign-in endpoint.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidConfig` if the URL does not parse.
    pub fn sign_in_endpoint(&self) -> Result<Url, CoreError> {
        parse_url("sign_in_url", &self.sign_in_url)
    }

    /// Returns the parsed usage endpoint.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidConfig` if the URL does not parse.
    pub fn usage_endpoint(&self) -> Result<Url, CoreError> {
        parse_url("usage_url", &self.usage_url)
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url, CoreError> {
    Url::parse(value).map_err(|e| CoreError::InvalidConfig(format!("{field}: {e}")))
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("source_types", &self.source_types)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("precision", &self.precision)
            .field("usage_url", &self.usage_url)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config =
            ClientConfig::from_json(r#"{"username":"user@example.com","password":"pw"}"#).unwrap();

        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.poll_interval(), Duration::from_secs(1800));
        assert_eq!(config.precision, 3);
        assert_eq!(config.source_types, SourceType::defaults());
        assert_eq!(config.usage_url, USAGE_URL);
        assert!(config.sign_in_endpoint().is_ok());
    }

    #[test]
    fn test_custom_source_types() {
        let config = ClientConfig::from_json(
            r#"{"username":"u","password":"p","source_types":["hot","gas"]}"#,
        )
        .unwrap();
        assert_eq!(
            config.source_types,
            vec![SourceType::HOT, SourceType::new("gas")]
        );
    }

    #[test]
    fn test_missing_credentials_is_serialization_error() {
        let err = ClientConfig::from_json(r#"{"username":"u"}"#).unwrap_err();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn test_validation() {
        assert!(ClientConfig::new("", "pw").validate().is_err());
        assert!(ClientConfig::new("u", "").validate().is_err());
        assert!(
            ClientConfig::new("u", "pw")
                .with_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            ClientConfig::new("u", "pw")
                .with_source_types(vec![])
                .validate()
                .is_err()
        );
        assert!(
            ClientConfig::new("u", "pw")
                .with_endpoints("not a url", USAGE_URL)
                .validate()
                .is_err()
        );
        assert!(ClientConfig::new("u", "pw").validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", ClientConfig::new("u", "hunter2"));
        assert!(!debug.contains("hunter2"));
    }
}
