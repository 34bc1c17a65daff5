//! Transaction ledger HTTP client (reqwest-based).
//!
//! Talks to the provider's `/v1/transactions` listing and lookup endpoints
//! with bearer-token auth, bounded timeouts, and cursor pagination.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use tessera_engine::{ExternalTransaction, LedgerError, PaymentLedger, TimeWindow};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default page size for the listing endpoint.
const DEFAULT_PAGE_LIMIT: usize = 100;

/// One page of the provider's transaction listing.
#[derive(Debug, Deserialize)]
struct TransactionPage {
    data: Vec<ExternalTransaction>,
    #[serde(default)]
    has_more: bool,
}

/// HTTP client for the payment provider's transaction ledger.
///
/// Wraps `reqwest::Client` with the provider's auth and pagination
/// conventions. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RestLedgerClient {
    /// Base URL of the provider API (e.g. "<https://api.payments.example>").
    base_url: String,
    api_token: String,
    http_client: Client,
    page_limit: usize,
}

impl RestLedgerClient {
    /// Create a new ledger client with the default timeout.
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        Self::with_timeout(base_url, api_token, DEFAULT_TIMEOUT)
    }

    /// Create a new ledger client with an explicit per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tessera/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LedgerError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_http_client(base_url, api_token, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        http_client: Client,
    ) -> Self {
        // Normalize base URL: strip trailing slash.
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_token: api_token.into(),
            http_client,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Set the listing page size.
    #[must_use]
    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = limit;
        self
    }

    async fn fetch_page(
        &self,
        window: TimeWindow,
        starting_after: Option<&str>,
    ) -> Result<TransactionPage, LedgerError> {
        let url = format!("{}/v1/transactions", self.base_url);
        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[
                ("status", "completed".to_string()),
                ("from", window.from.to_rfc3339()),
                ("to", window.to.to_rfc3339()),
                ("limit", self.page_limit.to_string()),
            ]);
        if let Some(cursor) = starting_after {
            request = request.query(&[("starting_after", cursor)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LedgerError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LedgerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<TransactionPage>()
            .await
            .map_err(|e| LedgerError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PaymentLedger for RestLedgerClient {
    async fn list_completed_transactions(
        &self,
        window: TimeWindow,
    ) -> Result<Vec<ExternalTransaction>, LedgerError> {
        let mut transactions: Vec<ExternalTransaction> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.fetch_page(window, cursor.as_deref()).await?;
            let page_len = page.data.len();
            transactions.extend(page.data);

            debug!(
                window = %window,
                page_len,
                total = transactions.len(),
                has_more = page.has_more,
                "Fetched transaction page"
            );

            if !page.has_more || page_len == 0 {
                break;
            }
            cursor = transactions.last().map(|tx| tx.id.clone());
        }

        Ok(transactions)
    }

    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<ExternalTransaction>, LedgerError> {
        let url = format!("{}/v1/transactions/{transaction_id}", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| LedgerError::Request(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LedgerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<ExternalTransaction>()
            .await
            .map(Some)
            .map_err(|e| LedgerError::Decode(e.to_string()))
    }
}
