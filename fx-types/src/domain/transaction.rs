//! Transaction domain model.

use chrono::{DateTime, Utc};
use exchange_rates::CurrencyCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::quote::{Quote, QuoteId};

/// Unique identifier for a Transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a new random TransactionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TransactionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Settlement progress of a transaction.
///
/// Moves forward only: `processing → sent → settled`, or to `failed` from any
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Processing,
    Sent,
    Settled,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown transaction status: {0}")]
pub struct ParseStatusError(pub String);

impl TransactionStatus {
    /// Settled and failed transactions never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Settled | TransactionStatus::Failed)
    }

    pub fn can_advance_to(&self, next: TransactionStatus) -> bool {
        use TransactionStatus::*;
        match (self, next) {
            (Processing, Sent | Settled | Failed) => true,
            (Sent, Settled | Failed) => true,
            _ => false,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionStatus::Processing => "Processing",
            TransactionStatus::Sent => "Sent",
            TransactionStatus::Settled => "Settled",
            TransactionStatus::Failed => "Failed",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Processing => "processing",
            TransactionStatus::Sent => "sent",
            TransactionStatus::Settled => "settled",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "processing" => Ok(TransactionStatus::Processing),
            "sent" => Ok(TransactionStatus::Sent),
            "settled" => Ok(TransactionStatus::Settled),
            "failed" => Ok(TransactionStatus::Failed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// A payment made against exactly one quote.
///
/// Economic fields are copied from the quote when the payment is accepted;
/// only `status` and `updated_at` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub quote_id: QuoteId,
    pub source_currency: CurrencyCode,
    pub destination_currency: CurrencyCode,
    pub amount: f64,
    pub rate: f64,
    pub fee: f64,
    pub total_payable: f64,
}

impl Transaction {
    /// Opens a new `processing` transaction for `quote`.
    pub fn from_quote(quote: &Quote, now: DateTime<Utc>) -> Self {
        Self {
            id: TransactionId::new(),
            status: TransactionStatus::Processing,
            created_at: now,
            updated_at: now,
            quote_id: quote.id,
            source_currency: quote.source_currency,
            destination_currency: quote.destination_currency,
            amount: quote.amount,
            rate: quote.rate,
            fee: quote.fee,
            total_payable: quote.total_payable,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Moves to `next` if the move is forward. Returns whether anything changed.
    pub fn advance(&mut self, next: TransactionStatus, now: DateTime<Utc>) -> bool {
        if !self.status.can_advance_to(next) {
            return false;
        }
        self.status = next;
        self.updated_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeeSchedule;
    use chrono::TimeDelta;

    fn quote() -> Quote {
        Quote::new(
            CurrencyCode::GBP,
            CurrencyCode::INR,
            1_000.0,
            110.5,
            &FeeSchedule::STANDARD,
            Utc::now(),
            TimeDelta::seconds(30),
        )
    }

    #[test]
    fn test_transaction_copies_quote() {
        let quote = quote();
        let now = Utc::now();
        let tx = Transaction::from_quote(&quote, now);

        assert_eq!(tx.status, TransactionStatus::Processing);
        assert_eq!(tx.quote_id, quote.id);
        assert_eq!(tx.created_at, now);
        assert_eq!(tx.updated_at, now);
        assert_eq!(tx.rate, quote.rate);
        assert_eq!(tx.fee, 10.0);
        assert_eq!(tx.total_payable, 1_010.0);
    }

    #[test]
    fn test_status_moves_forward_only() {
        use TransactionStatus::*;
        assert!(Processing.can_advance_to(Sent));
        assert!(Processing.can_advance_to(Settled));
        assert!(Processing.can_advance_to(Failed));
        assert!(Sent.can_advance_to(Settled));
        assert!(!Sent.can_advance_to(Processing));
        assert!(!Settled.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Processing));
        assert!(!Processing.can_advance_to(Processing));
    }

    #[test]
    fn test_advance_refreshes_updated_at() {
        let mut tx = Transaction::from_quote(&quote(), Utc::now());
        let later = tx.created_at + TimeDelta::seconds(5);

        assert!(tx.advance(TransactionStatus::Sent, later));
        assert_eq!(tx.updated_at, later);

        let even_later = later + TimeDelta::seconds(5);
        assert!(!tx.advance(TransactionStatus::Processing, even_later));
        assert_eq!(tx.status, TransactionStatus::Sent);
        assert_eq!(tx.updated_at, later);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&TransactionStatus::Settled).unwrap();
        assert_eq!(json, "\"settled\"");
        assert_eq!("SENT".parse::<TransactionStatus>().unwrap(), TransactionStatus::Sent);
        assert!("done".parse::<TransactionStatus>().is_err());
        assert_eq!(TransactionStatus::Processing.label(), "Processing");
    }
}
