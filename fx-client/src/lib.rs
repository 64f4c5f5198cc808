//! # FX Client SDK
//!
//! A typed Rust client for the FX API, and a poller that follows a
//! transaction until it settles.

pub mod poller;

pub use poller::{Countdown, PollHandle, PollPhase, PollSnapshot, PollerConfig, TransactionPoller};

use async_trait::async_trait;
use fx_types::{
    ApiErrorBody, CurrencyInfo, FxError, PaymentRequest, PaymentResponse, Quote, QuoteId,
    QuoteRequest, StatusSource, StatusUpdateRequest, Transaction, TransactionId,
    TransactionStatus,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {error}")]
    Api { status: u16, error: FxError },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for FxError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => FxError::Unavailable(e.to_string()),
            ClientError::Api { error, .. } => error,
            ClientError::Json(e) => FxError::Internal(format!("Malformed response: {}", e)),
        }
    }
}

/// FX API client.
#[derive(Debug, Clone)]
pub struct FxClient {
    base_url: String,
    http: Client,
}

impl FxClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Lists the supported currencies.
    pub async fn currencies(&self) -> Result<Vec<CurrencyInfo>, ClientError> {
        self.get("/api/currencies").await
    }

    /// Requests a priced quote.
    pub async fn create_quote(&self, req: &QuoteRequest) -> Result<Quote, ClientError> {
        self.post("/api/quotes", req).await
    }

    pub async fn list_quotes(&self) -> Result<Vec<Quote>, ClientError> {
        self.get("/api/quotes").await
    }

    /// Pays a quote.
    pub async fn pay(&self, quote_id: QuoteId) -> Result<PaymentResponse, ClientError> {
        self.post("/api/payments", &PaymentRequest { quote_id }).await
    }

    /// Gets a transaction by ID.
    pub async fn get_transaction_status(
        &self,
        id: TransactionId,
    ) -> Result<Transaction, ClientError> {
        self.get(&format!("/api/transactions/{}", id)).await
    }

    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, ClientError> {
        self.get("/api/transactions").await
    }

    /// Overrides a transaction's status.
    ///
    /// Returns `None` when the server ignored the move.
    pub async fn set_transaction_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<Option<Transaction>, ClientError> {
        let resp = self
            .http
            .put(format!(
                "{}/api/admin/transactions/{}/status",
                self.base_url, id
            ))
            .json(&StatusUpdateRequest { status })
            .send()
            .await?;
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        self.handle_response(resp).await.map(Some)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            error: decode_error(status, body),
        })
    }
}

/// Rebuilds the service error from an error response body.
fn decode_error(status: StatusCode, body: String) -> FxError {
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => parsed.into_error(),
        Err(_) if status == StatusCode::SERVICE_UNAVAILABLE => FxError::Unavailable(body),
        Err(_) => FxError::Internal(format!("{}: {}", status, body)),
    }
}

#[async_trait]
impl StatusSource for FxClient {
    async fn fetch_status(&self, id: TransactionId) -> Result<Transaction, FxError> {
        self.get_transaction_status(id).await.map_err(Into::into)
    }
}
