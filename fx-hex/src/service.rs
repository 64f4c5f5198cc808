//! FX Application Service
//!
//! The mock transaction service: issues quotes, accepts payments against them
//! and reports transaction status. Every operation first stalls and may fail
//! as dictated by the injected [`SimulationPolicy`].

use std::sync::Arc;

use async_trait::async_trait;
use exchange_rates::{fluctuate, is_valid_pair};
use fx_types::{
    Clock, FxError, FxRepository, Operation, PaymentRequest, PaymentResponse, Quote, QuoteRequest,
    SimulationPolicy, StatusSource, SystemClock, Transaction, TransactionId, TransactionStatus,
};

use crate::config::FxConfig;
use crate::simulation::RandomSimulation;

/// Application service for FX operations.
///
/// Generic over `R: FxRepository` - the adapter is injected at compile time.
/// Simulation policy and clock are swappable at runtime so tests can run
/// without randomness or wall-clock time.
pub struct FxService<R: FxRepository> {
    repo: R,
    config: FxConfig,
    policy: Arc<dyn SimulationPolicy>,
    clock: Arc<dyn Clock>,
}

impl<R: FxRepository> FxService<R> {
    /// Creates a service that simulates latency and failures per `config`.
    pub fn new(repo: R, config: FxConfig) -> Self {
        let policy = Arc::new(RandomSimulation::new(config.simulation.clone()));
        Self {
            repo,
            config,
            policy,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_policy(mut self, policy: impl SimulationPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &FxConfig {
        &self.config
    }

    async fn simulate(&self, op: Operation) -> Result<(), FxError> {
        let latency = self.policy.latency(op);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.policy.should_fail(op) {
            tracing::warn!(operation = %op, "injected transient failure");
            return Err(FxError::Transient);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Quote Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Prices and stores a new quote.
    pub async fn create_quote(&self, req: QuoteRequest) -> Result<Quote, FxError> {
        self.simulate(Operation::Quote).await?;

        let QuoteRequest {
            source_currency: from,
            destination_currency: to,
            amount,
        } = req;

        if !is_valid_pair(from, to) {
            return Err(FxError::Validation(
                "Source and destination currencies must be different".into(),
            ));
        }
        if !(amount.is_finite() && amount > 0.0) {
            return Err(FxError::Validation("Amount must be greater than 0".into()));
        }

        let base_rate = self
            .config
            .rates
            .base_rate(from, to)
            .ok_or_else(|| FxError::unsupported_pair(from, to))?;
        let rate = fluctuate(
            base_rate,
            self.config.rate_fluctuation,
            self.policy.rate_jitter(),
        );

        let quote = Quote::new(
            from,
            to,
            amount,
            rate,
            &self.config.fees,
            self.clock.now(),
            self.config.quote_ttl,
        );
        self.repo.insert_quote(quote.clone()).await?;

        tracing::info!(
            quote_id = %quote.id,
            %from,
            %to,
            amount,
            rate,
            total_payable = quote.total_payable,
            "quote issued"
        );
        Ok(quote)
    }

    /// Lists every quote issued so far.
    pub async fn list_quotes(&self) -> Result<Vec<Quote>, FxError> {
        self.repo.list_quotes().await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Pays an unexpired quote, opening a `processing` transaction.
    ///
    /// Each quote can be paid once.
    pub async fn pay(&self, req: PaymentRequest) -> Result<PaymentResponse, FxError> {
        self.simulate(Operation::Payment).await?;

        let quote = self
            .repo
            .get_quote(req.quote_id)
            .await?
            .ok_or_else(|| FxError::quote_not_found(req.quote_id))?;

        let now = self.clock.now();
        if quote.is_expired(now) {
            return Err(FxError::expired(quote.id));
        }
        if let Some(existing) = self.repo.find_transaction_for_quote(quote.id).await? {
            tracing::warn!(quote_id = %quote.id, transaction_id = %existing.id, "quote already paid");
            return Err(FxError::duplicate_payment(quote.id));
        }

        // The insert re-checks atomically; concurrent payers can both get here.
        let tx = Transaction::from_quote(&quote, now);
        let response = PaymentResponse {
            transaction_id: tx.id,
            quote_id: quote.id,
        };
        self.repo.insert_transaction(tx).await?;

        tracing::info!(
            transaction_id = %response.transaction_id,
            quote_id = %response.quote_id,
            "payment accepted"
        );
        Ok(response)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Transaction Status
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets a transaction by ID.
    pub async fn get_transaction_status(&self, id: TransactionId) -> Result<Transaction, FxError> {
        self.simulate(Operation::Status).await?;

        self.repo
            .get_transaction(id)
            .await?
            .ok_or_else(|| FxError::transaction_not_found(id))
    }

    /// Lists every transaction.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, FxError> {
        self.repo.list_transactions().await.map_err(Into::into)
    }

    /// Administrative override of a transaction's status.
    ///
    /// Unknown ids and non-forward moves are ignored; the updated transaction
    /// is returned only when the status actually changed.
    pub async fn set_transaction_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<Option<Transaction>, FxError> {
        let updated = self.repo.update_status(id, status, self.clock.now()).await?;
        match &updated {
            Some(tx) => tracing::info!(transaction_id = %id, status = %tx.status, "status override applied"),
            None => tracing::warn!(transaction_id = %id, %status, "status override ignored"),
        }
        Ok(updated)
    }
}

#[async_trait]
impl<R: FxRepository> StatusSource for FxService<R> {
    async fn fetch_status(&self, id: TransactionId) -> Result<Transaction, FxError> {
        self.get_transaction_status(id).await
    }
}
