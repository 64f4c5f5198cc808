//! Error types for the FX service.

use exchange_rates::CurrencyCode;
use serde::{Deserialize, Serialize};

use crate::domain::{QuoteId, TransactionId};

/// Service-level errors surfaced to callers of the quote, payment and status operations.
///
/// Each variant carries only a message so the error survives a trip over the
/// wire unchanged (see [`ErrorCode`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FxError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported currency pair: {0}")]
    UnsupportedPair(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Quote has expired: {0}")]
    Expired(String),

    #[error("Payment already processed for quote {0}")]
    DuplicatePayment(String),

    #[error("Network error: request failed")]
    Transient,

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable machine-readable error codes used in API error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    UnsupportedPair,
    NotFound,
    QuoteExpired,
    DuplicatePayment,
    Transient,
    Unavailable,
    Internal,
}

/// What a user can do about an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Try the same request again.
    Retry,
    /// The quote is gone; request a fresh one.
    RefreshQuote,
}

impl FxError {
    pub fn unsupported_pair(from: CurrencyCode, to: CurrencyCode) -> Self {
        FxError::UnsupportedPair(format!("{} -> {}", from, to))
    }

    pub fn quote_not_found(id: QuoteId) -> Self {
        FxError::NotFound(format!("Quote {}", id))
    }

    pub fn transaction_not_found(id: TransactionId) -> Self {
        FxError::NotFound(format!("Transaction {}", id))
    }

    pub fn expired(id: QuoteId) -> Self {
        FxError::Expired(id.to_string())
    }

    pub fn duplicate_payment(id: QuoteId) -> Self {
        FxError::DuplicatePayment(id.to_string())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            FxError::Validation(_) => ErrorCode::ValidationError,
            FxError::UnsupportedPair(_) => ErrorCode::UnsupportedPair,
            FxError::NotFound(_) => ErrorCode::NotFound,
            FxError::Expired(_) => ErrorCode::QuoteExpired,
            FxError::DuplicatePayment(_) => ErrorCode::DuplicatePayment,
            FxError::Transient => ErrorCode::Transient,
            FxError::Unavailable(_) => ErrorCode::Unavailable,
            FxError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// The message carried by the variant, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            FxError::Validation(msg)
            | FxError::UnsupportedPair(msg)
            | FxError::NotFound(msg)
            | FxError::Expired(msg)
            | FxError::DuplicatePayment(msg)
            | FxError::Unavailable(msg)
            | FxError::Internal(msg) => Some(msg),
            FxError::Transient => None,
        }
    }

    /// Rebuilds an error from its wire form.
    pub fn from_code(code: ErrorCode, detail: Option<String>) -> Self {
        let detail = detail.unwrap_or_default();
        match code {
            ErrorCode::ValidationError => FxError::Validation(detail),
            ErrorCode::UnsupportedPair => FxError::UnsupportedPair(detail),
            ErrorCode::NotFound => FxError::NotFound(detail),
            ErrorCode::QuoteExpired => FxError::Expired(detail),
            ErrorCode::DuplicatePayment => FxError::DuplicatePayment(detail),
            ErrorCode::Transient => FxError::Transient,
            ErrorCode::Unavailable => FxError::Unavailable(detail),
            ErrorCode::Internal => FxError::Internal(detail),
        }
    }

    /// Simulated and transport failures are safe to repeat.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FxError::Transient | FxError::Unavailable(_))
    }

    pub fn recovery(&self) -> Recovery {
        match self {
            FxError::Expired(_) => Recovery::RefreshQuote,
            _ => Recovery::Retry,
        }
    }
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Quote {0} already has a transaction")]
    QuoteAlreadyPaid(QuoteId),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<RepoError> for FxError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::QuoteAlreadyPaid(id) => FxError::duplicate_payment(id),
            RepoError::Conflict(msg) => FxError::Internal(msg),
        }
    }
}
