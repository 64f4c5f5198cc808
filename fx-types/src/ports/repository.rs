//! Repository port trait.
//!
//! Owns the two mappings of the service: quote id → quote and
//! transaction id → transaction.

use chrono::{DateTime, Utc};

use crate::domain::{Quote, QuoteId, Transaction, TransactionId, TransactionStatus};
use crate::error::RepoError;

/// Storage port for quotes and the transactions paid against them.
#[async_trait::async_trait]
pub trait FxRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Quotes
    // ─────────────────────────────────────────────────────────────────────────────

    async fn insert_quote(&self, quote: Quote) -> Result<(), RepoError>;

    async fn get_quote(&self, id: QuoteId) -> Result<Option<Quote>, RepoError>;

    /// All quotes, oldest first.
    async fn list_quotes(&self) -> Result<Vec<Quote>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────────

    /// Stores a transaction for its quote.
    ///
    /// The check that no transaction already references `tx.quote_id` and the
    /// insert MUST happen atomically; a second insert for the same quote fails
    /// with [`RepoError::QuoteAlreadyPaid`].
    async fn insert_transaction(&self, tx: Transaction) -> Result<(), RepoError>;

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, RepoError>;

    async fn find_transaction_for_quote(
        &self,
        quote_id: QuoteId,
    ) -> Result<Option<Transaction>, RepoError>;

    /// All transactions, oldest first.
    async fn list_transactions(&self) -> Result<Vec<Transaction>, RepoError>;

    /// Advances a transaction's status if the move is forward.
    ///
    /// Returns the updated transaction, or `None` when the id is unknown or
    /// the move was not applied.
    async fn update_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Transaction>, RepoError>;
}
