//! The `InWarmte` client facade.
//!
//! Ties the session, the usage fetcher and the aggregator together:
//!
//! 1. Authenticate if no token is held
//! 2. Fetch the raw usage records
//! 3. On an authentication failure, drop the token and try once more
//! 4. Aggregate the records into current-period totals
//!
//! The session sits behind an async mutex owned by the client. A call holds
//! it for its whole duration, so concurrent polls on one client run one after
//! another instead of racing on the token.

use chrono::{Local, NaiveDate};
use inwarmte_core::{Measurements, MeasurementProvider, Period, SourceType, UsagePeriodRecord, aggregate};
use inwarmte_fetch::{AuthRetryPolicy, FetchError, RequestExecutor};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::auth::{AuthSession, RemoteAuthState};
use crate::config::ClientConfig;
use crate::fetcher::UsageFetcher;

// ============================================================================
// Client
// ============================================================================

/// Client for the `InWarmte` metering service.
#[derive(Debug)]
pub struct InWarmteClient {
    config: ClientConfig,
    executor: RequestExecutor,
    fetcher: UsageFetcher,
    retry: AuthRetryPolicy,
    session: Mutex<AuthSession>,
}

impl InWarmteClient {
    /// Creates a client. No network call is made.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] for an invalid configuration.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        config.validate()?;

        let executor = RequestExecutor::with_timeout(config.request_timeout())?;
        let fetcher = UsageFetcher::new(config.usage_endpoint()?);
        let session = AuthSession::new(config.credentials(), config.sign_in_endpoint()?);

        debug!(username = %config.username, sources = config.source_types.len(), "Created InWarmte client");

        Ok(Self {
            config,
            executor,
            fetcher,
            retry: AuthRetryPolicy::default(),
            session: Mutex::new(session),
        })
    }

    /// Sets the retry policy for authentication expiry.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: AuthRetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns true if a token is held locally.
    pub async fn is_authenticated(&self) -> bool {
        self.session.lock().await.is_authenticated()
    }

    /// Returns what the service said about the credentials or token last.
    pub async fn remote_state(&self) -> RemoteAuthState {
        self.session.lock().await.remote_state()
    }

    /// Drops the current token.
    pub async fn invalidate(&self) {
        self.session.lock().await.invalidate();
    }

    /// Signs in, replacing any current token.
    ///
    /// # Errors
    ///
    /// See [`AuthSession::authenticate`].
    pub async fn authenticate(&self) -> Result<(), FetchError> {
        self.session.lock().await.authenticate(&self.executor).await
    }

    /// Fetches the raw records of the current year with the current token.
    ///
    /// Does not authenticate or retry.
    ///
    /// # Errors
    ///
    /// See [`UsageFetcher::fetch_raw`].
    pub async fn usage(&self) -> Result<Vec<UsagePeriodRecord>, FetchError> {
        let session = self.session.lock().await;
        self.fetcher
            .fetch_raw(&self.executor, &session, Local::now().date_naive())
            .await
    }

    /// Checks the configured credentials against the service.
    ///
    /// Signs in afresh and fetches usage once, the way a setup flow validates
    /// credentials before storing them. Returns the account id, if the
    /// identity provider issued one.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Auth`] for wrong credentials
    /// - [`FetchError::Connection`] if the service cannot be reached
    /// - [`FetchError::Protocol`] / [`FetchError::Unauthenticated`] otherwise
    #[instrument(skip(self), fields(username = %self.config.username))]
    pub async fn validate_credentials(&self) -> Result<Option<String>, FetchError> {
        let mut session = self.session.lock().await;
        session.authenticate(&self.executor).await?;

        match self
            .fetcher
            .fetch_raw(&self.executor, &session, Local::now().date_naive())
            .await
        {
            Ok(_) => {
                session.mark_accepted();
                info!("Credentials validated");
                Ok(session.account_id().map(str::to_string))
            }
            Err(err) => {
                if err.is_unauthenticated() {
                    session.mark_rejected();
                    session.invalidate();
                }
                Err(err)
            }
        }
    }

    /// Fetches the current measurements for today's local date.
    ///
    /// # Errors
    ///
    /// See [`InWarmteClient::current_measurements_at`].
    pub async fn current_measurements(&self) -> Result<Measurements, FetchError> {
        self.current_measurements_at(Local::now().date_naive()).await
    }

    /// Fetches the measurements for the month and year containing `today`.
    ///
    /// Authenticates when no token is held. If the service reports the token
    /// as invalid, the token is dropped and the whole sequence runs once more;
    /// a second rejection is returned to the caller. Connection and protocol
    /// errors are returned at once.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Unauthenticated`] if the token is rejected on every attempt
    /// - [`FetchError::Auth`] if the credentials are refused at sign-in
    /// - [`FetchError::Connection`] on timeout or transport failure
    /// - [`FetchError::Protocol`] for unexpected responses
    #[instrument(skip(self))]
    pub async fn current_measurements_at(
        &self,
        today: NaiveDate,
    ) -> Result<Measurements, FetchError> {
        let mut session = self.session.lock().await;
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.attempt(&mut session, today).await {
                Ok(records) => {
                    session.mark_accepted();
                    let measurements =
                        aggregate(&records, &self.config.source_types, Period::from_date(today));
                    info!(
                        attempt,
                        records = records.len(),
                        sources = measurements.len(),
                        "Aggregated InWarmte measurements"
                    );
                    return Ok(measurements);
                }
                Err(err) if err.is_unauthenticated() => {
                    session.invalidate();
                    if self.retry.should_retry(&err, attempt) {
                        warn!(attempt, error = %err, "Authentication expired, retrying");
                        continue;
                    }
                    warn!(attempt, error = %err, "Authentication failed after retry");
                    return Err(err);
                }
                Err(err) => {
                    debug!(attempt, error = %err, "Fetch failed");
                    return Err(err);
                }
            }
        }
    }

    /// One authenticate-then-fetch pass.
    async fn attempt(
        &self,
        session: &mut AuthSession,
        today: NaiveDate,
    ) -> Result<Vec<UsagePeriodRecord>, FetchError> {
        if !session.is_authenticated() {
            session.authenticate(&self.executor).await?;
        }

        let result = self.fetcher.fetch_raw(&self.executor, session, today).await;
        if let Err(ref err) = result {
            if err.is_unauthenticated() && session.is_authenticated() {
                session.mark_rejected();
            }
        }
        result
    }
}

impl MeasurementProvider for InWarmteClient {
    type Error = FetchError;

    fn source_types(&self) -> &[SourceType] {
        &self.config.source_types
    }

    fn current_measurements(
        &self,
    ) -> impl std::future::Future<Output = Result<Measurements, Self::Error>> + Send {
        InWarmteClient::current_measurements(self)
    }
}
