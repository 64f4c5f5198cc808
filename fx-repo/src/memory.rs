//! In-memory repository adapter.
//!
//! Quotes and transactions live in two `DashMap`s owned by the repository
//! instance. A third map indexes transactions by quote id; its entry lock is
//! what makes the duplicate-payment check and the insert a single step.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use fx_types::{
    FxRepository, Quote, QuoteId, RepoError, Transaction, TransactionId, TransactionStatus,
};

/// Thread-safe in-memory store for quotes and transactions.
#[derive(Debug, Default)]
pub struct InMemoryRepo {
    quotes: DashMap<QuoteId, Quote>,
    transactions: DashMap<TransactionId, Transaction>,
    paid_quotes: DashMap<QuoteId, TransactionId>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FxRepository for InMemoryRepo {
    async fn insert_quote(&self, quote: Quote) -> Result<(), RepoError> {
        match self.quotes.entry(quote.id) {
            Entry::Occupied(_) => Err(RepoError::Conflict(format!(
                "Quote {} already exists",
                quote.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(quote);
                Ok(())
            }
        }
    }

    async fn get_quote(&self, id: QuoteId) -> Result<Option<Quote>, RepoError> {
        Ok(self.quotes.get(&id).map(|q| q.value().clone()))
    }

    async fn list_quotes(&self) -> Result<Vec<Quote>, RepoError> {
        let mut quotes: Vec<Quote> = self.quotes.iter().map(|q| q.value().clone()).collect();
        quotes.sort_by_key(|q| (q.created_at, *q.id.as_uuid()));
        Ok(quotes)
    }

    async fn insert_transaction(&self, tx: Transaction) -> Result<(), RepoError> {
        // Holding the index entry serialises payers of the same quote.
        match self.paid_quotes.entry(tx.quote_id) {
            Entry::Occupied(_) => Err(RepoError::QuoteAlreadyPaid(tx.quote_id)),
            Entry::Vacant(slot) => {
                if self.transactions.contains_key(&tx.id) {
                    return Err(RepoError::Conflict(format!(
                        "Transaction {} already exists",
                        tx.id
                    )));
                }
                let tx_id = tx.id;
                self.transactions.insert(tx_id, tx);
                slot.insert(tx_id);
                Ok(())
            }
        }
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, RepoError> {
        Ok(self.transactions.get(&id).map(|t| t.value().clone()))
    }

    async fn find_transaction_for_quote(
        &self,
        quote_id: QuoteId,
    ) -> Result<Option<Transaction>, RepoError> {
        let Some(tx_id) = self.paid_quotes.get(&quote_id).map(|id| *id.value()) else {
            return Ok(None);
        };
        self.get_transaction(tx_id).await
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, RepoError> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .map(|t| t.value().clone())
            .collect();
        transactions.sort_by_key(|t| (t.created_at, *t.id.as_uuid()));
        Ok(transactions)
    }

    async fn update_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Transaction>, RepoError> {
        let Some(mut tx) = self.transactions.get_mut(&id) else {
            return Ok(None);
        };
        let from = tx.status;
        if !tx.advance(status, at) {
            tracing::debug!(transaction_id = %id, %from, to = %status, "status move not applied");
            return Ok(None);
        }
        Ok(Some(tx.value().clone()))
    }
}
