//! Credentials and the authenticated session.
//!
//! [`AuthSession`] owns the credentials and the bearer token. It tracks two
//! separate observations:
//!
//! - [`AuthSession::is_authenticated`] - a token is held locally
//! - [`AuthSession::remote_state`] - what the service said about the
//!   credentials or token the last time it was asked
//!
//! A locally held token does not mean the service will still accept it.

use std::fmt;

use inwarmte_fetch::{ApiRequest, BearerToken, FetchError, ProtocolError, RequestExecutor};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::api::{SignInErrorResponse, SignInResponse, sign_in_fields};

/// Environment variable holding the account email.
pub const USERNAME_ENV: &str = "INWARMTE_USERNAME";

/// Environment variable holding the account password.
pub const PASSWORD_ENV: &str = "INWARMTE_PASSWORD";

// ============================================================================
// Credentials
// ============================================================================

/// Username and password of an `InWarmte` account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Loads credentials from `INWARMTE_USERNAME` and `INWARMTE_PASSWORD`.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads credentials through a variable lookup function.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let username = lookup(USERNAME_ENV).filter(|v| !v.is_empty())?;
        let password = lookup(PASSWORD_ENV).filter(|v| !v.is_empty())?;
        Some(Self::new(username, password))
    }

    /// Returns the username (account email).
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Remote Auth State
// ============================================================================

/// Outcome of the most recent call that exercised the credentials or token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemoteAuthState {
    /// No such call has completed yet.
    #[default]
    Unknown,
    /// The service accepted the credentials or token.
    Accepted,
    /// The service rejected the credentials or token.
    Rejected,
}

// ============================================================================
// Auth Session
// ============================================================================

/// Owns the credentials and the current bearer token.
#[derive(Debug)]
pub struct AuthSession {
    credentials: Credentials,
    sign_in_url: Url,
    token: Option<BearerToken>,
    account_id: Option<String>,
    remote: RemoteAuthState,
}

impl AuthSession {
    /// Creates an unauthenticated session.
    pub fn new(credentials: Credentials, sign_in_url: Url) -> Self {
        Self {
            credentials,
            sign_in_url,
            token: None,
            account_id: None,
            remote: RemoteAuthState::Unknown,
        }
    }

    /// Returns the username this session signs in with.
    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    /// Returns true if a token is held locally.
    ///
    /// Requests may still fail with an authentication error: the service can
    /// reject a token at any time.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Returns the current bearer token.
    pub fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    /// Returns the account identifier issued at sign-in.
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Returns what the service said the last time it was asked.
    pub fn remote_state(&self) -> RemoteAuthState {
        self.remote
    }

    /// Records that the service accepted the current token.
    pub fn mark_accepted(&mut self) {
        self.remote = RemoteAuthState::Accepted;
    }

    /// Records that the service rejected the current token.
    pub fn mark_rejected(&mut self) {
        self.remote = RemoteAuthState::Rejected;
    }

    /// Clears the token and account details. Idempotent.
    ///
    /// The remote state is an observation of the past and is kept.
    pub fn invalidate(&mut self) {
        if self.token.is_some() {
            debug!("Invalidating session");
        }
        self.token = None;
        self.account_id = None;
    }

    /// Signs in with the stored credentials.
    ///
    /// Any previous token is dropped first, so a failed sign-in always leaves
    /// the session unauthenticated.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Auth`] if the identity provider names a credential
    ///   problem (e.g. `INVALID_PASSWORD`)
    /// - [`FetchError::Unauthenticated`] on a 401, for the caller to retry
    /// - [`FetchError::Protocol`] if the response lacks `idToken`
    /// - [`FetchError::Connection`] on timeout or transport failure
    #[instrument(skip(self, executor), fields(username = %self.credentials.username()))]
    pub async fn authenticate(&mut self, executor: &RequestExecutor) -> Result<(), FetchError> {
        self.invalidate();

        let request = ApiRequest::post_form(
            self.sign_in_url.clone(),
            sign_in_fields(self.credentials.username(), self.credentials.password()),
        );

        let signed_in = executor
            .execute(request, None, parse_sign_in)
            .await
            .map_err(classify_sign_in_failure);

        match signed_in {
            Ok((token, account_id)) => {
                self.token = Some(token);
                self.account_id = account_id;
                self.remote = RemoteAuthState::Accepted;
                info!("Signed in to InWarmte");
                Ok(())
            }
            Err(err) => {
                if matches!(err, FetchError::Auth(_)) || err.is_unauthenticated() {
                    self.remote = RemoteAuthState::Rejected;
                }
                warn!(error = %err, "Sign-in failed");
                Err(err)
            }
        }
    }
}

/// Extracts the token and account id from a sign-in body.
fn parse_sign_in(body: Value) -> Result<(BearerToken, Option<String>), FetchError> {
    let response: SignInResponse = serde_json::from_value(body).map_err(ProtocolError::from)?;

    let token = response
        .id_token
        .filter(|t| !t.is_empty())
        .ok_or(ProtocolError::MissingField("idToken"))?;

    debug!(expires_in = ?response.expires_in, "Received ID token");
    Ok((BearerToken::new(token), response.local_id))
}

/// Turns refusals of the credentials into [`FetchError::Auth`].
///
/// Only a 4xx whose error message names a credential problem counts. A 401
/// stays [`FetchError::Unauthenticated`] and everything else passes through
/// unchanged.
fn classify_sign_in_failure(err: FetchError) -> FetchError {
    match err {
        FetchError::Protocol(ProtocolError::Unsuccessful { status, body })
            if (400..500).contains(&status) =>
        {
            match SignInErrorResponse::parse(&body) {
                Some(error) if error.is_credential_error() => {
                    FetchError::Auth(error.reason().unwrap_or_default().to_string())
                }
                _ => ProtocolError::Unsuccessful { status, body }.into(),
            }
        }
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================
