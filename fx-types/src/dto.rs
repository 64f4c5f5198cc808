//! Data Transfer Objects (DTOs) for requests and responses.

use exchange_rates::{Currency, CurrencyCode};
use serde::{Deserialize, Serialize};

use crate::domain::{QuoteId, TransactionId, TransactionStatus};
use crate::error::{ErrorCode, FxError};

// ─────────────────────────────────────────────────────────────────────────────
// Quote DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request for a priced FX quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub source_currency: CurrencyCode,
    pub destination_currency: CurrencyCode,
    /// Amount to send, in the source currency
    pub amount: f64,
}

impl QuoteRequest {
    /// Builds a request from user-entered currency codes.
    pub fn from_codes(source: &str, destination: &str, amount: f64) -> Result<Self, FxError> {
        let parse = |code: &str| {
            code.parse::<CurrencyCode>()
                .map_err(|e| FxError::Validation(format!("Invalid currency pair: {}", e)))
        };
        Ok(Self {
            source_currency: parse(source)?,
            destination_currency: parse(destination)?,
            amount,
        })
    }
}

/// A supported currency as listed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub code: CurrencyCode,
    pub name: String,
    pub symbol: String,
}

impl From<Currency> for CurrencyInfo {
    fn from(currency: Currency) -> Self {
        Self {
            code: currency.code,
            name: currency.name.to_string(),
            symbol: currency.symbol.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to pay a previously issued quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub quote_id: QuoteId,
}

/// Response after a payment is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub transaction_id: TransactionId,
    pub quote_id: QuoteId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Administrative status override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: TransactionStatus,
}

// ─────────────────────────────────────────────────────────────────────────────
// Error DTO
// ─────────────────────────────────────────────────────────────────────────────

/// JSON body returned with every API error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message
    pub error: String,
    pub code: ErrorCode,
    /// Variant payload, used to rebuild the error on the client side
    #[serde(default)]
    pub detail: Option<String>,
    pub status: u16,
}

impl ApiErrorBody {
    pub fn new(err: &FxError, status: u16) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
            detail: err.detail().map(str::to_string),
            status,
        }
    }

    pub fn into_error(self) -> FxError {
        FxError::from_code(self.code, self.detail)
    }
}
