//! HTTP request executor with timeout and response classification.
//!
//! Every call to the metering service goes through [`RequestExecutor::execute`]:
//! - Adds `Accept: application/json` and, when given, the bearer token
//! - Bounds connect, send and body read by a single timeout
//! - Classifies the response into success or a [`FetchError`]
//! - Hands the parsed JSON body to a caller-supplied continuation
//!
//! The executor never retries. Retry policy belongs to the caller.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

pub use reqwest::Method;

use crate::error::{ConnectionError, FetchError, ProtocolError};
use crate::token::BearerToken;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// User agent string for the client.
const USER_AGENT: &str = concat!("inwarmte-rs/", env!("CARGO_PKG_VERSION"));

/// Content type the service must answer with.
const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// Request
// ============================================================================

/// A request to be executed.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    form: Option<Vec<(String, String)>>,
}

impl ApiRequest {
    /// Creates a GET request.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            form: None,
        }
    }

    /// Creates a POST request with a form-encoded body.
    pub fn post_form<K, V>(url: Url, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            method: Method::POST,
            url,
            form: Some(
                fields
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    /// Returns the request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the full request URL, including query parameters.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the value of a form field, if this request has one.
    pub fn form_field(&self, key: &str) -> Option<&str> {
        self.form
            .as_ref()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// ============================================================================
// Raw Response
// ============================================================================

/// Status, content type and body of a completed response.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub(crate) status: StatusCode,
    pub(crate) content_type: String,
    pub(crate) body: String,
}

impl RawResponse {
    /// Classifies the response and parses the body.
    ///
    /// The order of the checks matters: a 401 is reported as
    /// [`FetchError::Unauthenticated`] whatever its content type.
    pub(crate) fn into_json(self) -> Result<Value, FetchError> {
        if self.status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthenticated(self.body));
        }

        if !self.content_type.contains(JSON_CONTENT_TYPE) {
            return Err(ProtocolError::NonJson { body: self.body }.into());
        }

        if self.status.is_client_error() || self.status.is_server_error() {
            return Err(ProtocolError::Unsuccessful {
                status: self.status.as_u16(),
                body: self.body,
            }
            .into());
        }

        Ok(serde_json::from_str(&self.body).map_err(ProtocolError::from)?)
    }
}

// ============================================================================
// Request Executor
// ============================================================================

/// Executes single requests against the metering service.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    inner: Client,
    timeout: Duration,
}

impl RequestExecutor {
    /// Creates an executor with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the HTTP client cannot be built, which
    /// only happens with a broken TLS setup.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates an executor with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ConnectionError::from)?;

        Ok(Self {
            inner: client,
            timeout,
        })
    }

    /// Returns the timeout applied to every request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Executes a request and passes the parsed JSON body to `handle`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Connection`] on timeout or transport failure
    /// - [`FetchError::Unauthenticated`] on a 401 response
    /// - [`FetchError::Protocol`] on a non-JSON or unsuccessful response
    /// - Whatever `handle` returns
    #[instrument(
        skip(self, request, bearer, handle),
        fields(method = %request.method(), path = %request.url().path())
    )]
    pub async fn execute<T, F>(
        &self,
        request: ApiRequest,
        bearer: Option<&BearerToken>,
        handle: F,
    ) -> Result<T, FetchError>
    where
        F: FnOnce(Value) -> Result<T, FetchError>,
    {
        debug!(authenticated = bearer.is_some(), "Executing request");

        let raw = match tokio::time::timeout(self.timeout, self.send(request, bearer)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs_f64(), "Request timed out");
                return Err(ConnectionError::Timeout(self.timeout).into());
            }
        };

        debug!(status = %raw.status, content_type = %raw.content_type, "Response received");
        handle(raw.into_json()?)
    }

    async fn send(
        &self,
        request: ApiRequest,
        bearer: Option<&BearerToken>,
    ) -> Result<RawResponse, FetchError> {
        let ApiRequest { method, url, form } = request;

        let mut builder = self
            .inner
            .request(method, url)
            .header(ACCEPT, JSON_CONTENT_TYPE);

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token.as_str());
        }

        if let Some(ref fields) = form {
            builder = builder.form(fields);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            ConnectionError::Timeout(self.timeout).into()
        } else {
            warn!(error = %err, "Transport failure");
            ConnectionError::from(err).into()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
