//! Raw usage fetcher.

use chrono::NaiveDate;
use inwarmte_core::{CoreError, Period, UsagePeriodRecord};
use inwarmte_fetch::{ApiRequest, FetchError, RequestExecutor};
use tracing::{debug, info, instrument};
use url::Url;

use crate::auth::AuthSession;
use crate::parser::parse_usage_response;

// ============================================================================
// Fetcher
// ============================================================================

/// Fetches the monthly usage records of the current year.
#[derive(Debug, Clone)]
pub struct UsageFetcher {
    usage_url: Url,
}

impl UsageFetcher {
    /// Creates a fetcher for the given usage endpoint.
    pub fn new(usage_url: Url) -> Self {
        Self { usage_url }
    }

    /// Builds the usage request for the year containing `today`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] if January 1 of that year cannot be
    /// represented.
    pub fn request_for(&self, today: NaiveDate) -> Result<ApiRequest, FetchError> {
        let start = Period::from_date(today)
            .start_of_year()
            .ok_or_else(|| CoreError::InvalidData(format!("no start of year for {today}")))?;

        Ok(ApiRequest::get(self.usage_url.clone())
            .with_query("start_date", &start.format("%Y-%m-%d").to_string())
            .with_query("add_prediction", "false"))
    }

    /// Fetches the raw records since January 1 of the year containing `today`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Unauthenticated`] without a network call if the session
    ///   holds no token, or from the service if it rejects the token
    /// - [`FetchError::Protocol`] if the body is not a valid record list
    /// - [`FetchError::Connection`] on timeout or transport failure
    #[instrument(skip(self, executor, session))]
    pub async fn fetch_raw(
        &self,
        executor: &RequestExecutor,
        session: &AuthSession,
        today: NaiveDate,
    ) -> Result<Vec<UsagePeriodRecord>, FetchError> {
        let Some(token) = session.token() else {
            debug!("Usage requested without a token");
            return Err(FetchError::Unauthenticated(
                "Authentication required".to_string(),
            ));
        };

        let request = self.request_for(today)?;
        let records = executor
            .execute(request, Some(token), parse_usage_response)
            .await?;

        info!(count = records.len(), "Fetched InWarmte usage");
        Ok(records)
    }
}
