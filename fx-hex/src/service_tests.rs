//! FxService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::{TimeDelta, Utc};
    use exchange_rates::RateTable;
    use fx_repo::InMemoryRepo;
    use fx_types::{
        Clock, CurrencyCode, FxError, FxRepository, ManualClock, Operation, PaymentRequest, QuoteId, QuoteRequest,
        SimulationPolicy, StatusSource, TransactionId, TransactionStatus,
    };

    use crate::config::{FxConfig, OperationProfile, SimulationConfig};
    use crate::simulation::RandomSimulation;
    use crate::{FxService, Quiet};

    /// Deterministic policy: no latency, fixed jitter, failures on demand.
    #[derive(Default)]
    pub struct Scripted {
        failing: Mutex<HashSet<Operation>>,
        jitter: f64,
    }

    impl Scripted {
        pub fn with_jitter(jitter: f64) -> Self {
            Self {
                jitter,
                ..Default::default()
            }
        }

        pub fn failing(op: Operation) -> Self {
            let policy = Self::default();
            policy.set_failing(op, true);
            policy
        }

        pub fn set_failing(&self, op: Operation, on: bool) {
            let mut failing = self.failing.lock().unwrap();
            if on {
                failing.insert(op);
            } else {
                failing.remove(&op);
            }
        }
    }

    /// Hands the service a policy the test can still reach.
    struct Shared(Arc<Scripted>);

    impl SimulationPolicy for Shared {
        fn latency(&self, op: Operation) -> Duration {
            self.0.latency(op)
        }

        fn should_fail(&self, op: Operation) -> bool {
            self.0.should_fail(op)
        }

        fn rate_jitter(&self) -> f64 {
            self.0.rate_jitter()
        }
    }

    impl SimulationPolicy for Scripted {
        fn latency(&self, _op: Operation) -> Duration {
            Duration::ZERO
        }

        fn should_fail(&self, op: Operation) -> bool {
            self.failing.lock().unwrap().contains(&op)
        }

        fn rate_jitter(&self) -> f64 {
            self.jitter
        }
    }

    fn service_with(
        policy: impl SimulationPolicy,
        config: FxConfig,
    ) -> (FxService<InMemoryRepo>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = FxService::new(InMemoryRepo::new(), config)
            .with_policy(policy)
            .with_clock(clock.clone());
        (service, clock)
    }

    fn quiet_service() -> (FxService<InMemoryRepo>, Arc<ManualClock>) {
        service_with(Quiet, FxConfig::default())
    }

    fn request(from: CurrencyCode, to: CurrencyCode, amount: f64) -> QuoteRequest {
        QuoteRequest {
            source_currency: from,
            destination_currency: to,
            amount,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Quotes
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_quote_rate_stays_within_fluctuation_band() {
        let config = FxConfig {
            simulation: SimulationConfig::none(),
            ..FxConfig::default()
        };
        let policy = RandomSimulation::new(config.simulation.clone());
        let (service, _) = service_with(policy, config);
        let rates = RateTable::standard();

        for (from, to, base) in rates.pairs() {
            for _ in 0..10 {
                let quote = service.create_quote(request(from, to, 100.0)).await.unwrap();
                let deviation = (quote.rate / base - 1.0).abs();
                assert!(
                    deviation <= 0.01 + 1e-12,
                    "{from}->{to}: rate {} deviates {deviation} from {base}",
                    quote.rate
                );
            }
        }
    }

    #[tokio::test]
    async fn test_quote_rate_band_edges() {
        for (jitter, expected) in [(0.5, 0.85 * 1.01), (-0.5, 0.85 * 0.99), (0.0, 0.85)] {
            let (service, _) = service_with(Scripted::with_jitter(jitter), FxConfig::default());
            let quote = service
                .create_quote(request(CurrencyCode::USD, CurrencyCode::EUR, 100.0))
                .await
                .unwrap();
            assert!((quote.rate - expected).abs() < 1e-12);
        }
    }

    #[tokio::test]
    async fn test_same_currency_is_rejected_for_every_currency() {
        let (service, _) = quiet_service();
        for &code in CurrencyCode::all() {
            let result = service.create_quote(request(code, code, 100.0)).await;
            assert!(matches!(result, Err(FxError::Validation(_))), "{code}");
        }
        assert!(service.list_quotes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected() {
        let (service, _) = quiet_service();
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = service
                .create_quote(request(CurrencyCode::USD, CurrencyCode::GBP, amount))
                .await;
            assert!(matches!(result, Err(FxError::Validation(_))), "{amount}");
        }
    }

    #[tokio::test]
    async fn test_missing_base_rate_is_unsupported() {
        let config = FxConfig {
            rates: RateTable::standard().without(CurrencyCode::JPY, CurrencyCode::INR),
            ..FxConfig::default()
        };
        let (service, _) = service_with(Quiet, config);

        let result = service
            .create_quote(request(CurrencyCode::JPY, CurrencyCode::INR, 5_000.0))
            .await;
        assert_eq!(
            result.unwrap_err(),
            FxError::unsupported_pair(CurrencyCode::JPY, CurrencyCode::INR)
        );

        // the reverse direction is still quoted
        assert!(
            service
                .create_quote(request(CurrencyCode::INR, CurrencyCode::JPY, 5_000.0))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_fee_and_total() {
        let (service, clock) = quiet_service();
        for amount in [0.01, 1.0, 100.0, 499.99, 500.0, 500.01, 12_345.67] {
            let quote = service
                .create_quote(request(CurrencyCode::EUR, CurrencyCode::USD, amount))
                .await
                .unwrap();
            let expected_fee = (amount * 0.01_f64).max(5.0);
            assert_eq!(quote.fee, expected_fee);
            assert_eq!(quote.total_payable, amount + expected_fee);
            assert_eq!(quote.expires_at, clock.now() + TimeDelta::seconds(30));
        }
        assert_eq!(service.list_quotes().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_injected_failure_precedes_validation() {
        let (service, _) = service_with(Scripted::failing(Operation::Quote), FxConfig::default());

        // invalid input, but the simulated network fails first
        let result = service
            .create_quote(request(CurrencyCode::USD, CurrencyCode::USD, -5.0))
            .await;
        assert_eq!(result.unwrap_err(), FxError::Transient);
        assert!(service.list_quotes().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let mut simulation = SimulationConfig::none();
        simulation.quote = OperationProfile::new(500, 0.0);
        let config = FxConfig {
            simulation: simulation.clone(),
            ..FxConfig::default()
        };
        let (service, _) = service_with(RandomSimulation::new(simulation), config);

        let start = tokio::time::Instant::now();
        service
            .create_quote(request(CurrencyCode::GBP, CurrencyCode::EUR, 10.0))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_pay_opens_processing_transaction() {
        let (service, clock) = quiet_service();
        let quote = service
            .create_quote(request(CurrencyCode::USD, CurrencyCode::INR, 1_000.0))
            .await
            .unwrap();

        clock.advance(TimeDelta::seconds(10));
        let paid = service
            .pay(PaymentRequest { quote_id: quote.id })
            .await
            .unwrap();
        assert_eq!(paid.quote_id, quote.id);

        let tx = service
            .get_transaction_status(paid.transaction_id)
            .await
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Processing);
        assert_eq!(tx.created_at, clock.now());
        assert_eq!(tx.updated_at, clock.now());
        assert_eq!(tx.amount, quote.amount);
        assert_eq!(tx.rate, quote.rate);
        assert_eq!(tx.fee, quote.fee);
        assert_eq!(tx.total_payable, quote.total_payable);
        assert_eq!(tx.source_currency, CurrencyCode::USD);
        assert_eq!(tx.destination_currency, CurrencyCode::INR);
    }

    #[tokio::test]
    async fn test_pay_unknown_quote() {
        let (service, _) = quiet_service();
        let result = service
            .pay(PaymentRequest {
                quote_id: QuoteId::new(),
            })
            .await;
        assert!(matches!(result, Err(FxError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_pay_expired_quote() {
        let (service, clock) = quiet_service();
        let quote = service
            .create_quote(request(CurrencyCode::GBP, CurrencyCode::JPY, 50.0))
            .await
            .unwrap();

        clock.advance(TimeDelta::seconds(30));
        let result = service.pay(PaymentRequest { quote_id: quote.id }).await;
        assert_eq!(result.unwrap_err(), FxError::expired(quote.id));
        assert!(service.list_transactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pay_just_before_expiry() {
        let (service, clock) = quiet_service();
        let quote = service
            .create_quote(request(CurrencyCode::GBP, CurrencyCode::JPY, 50.0))
            .await
            .unwrap();

        clock.advance(TimeDelta::milliseconds(29_999));
        assert!(service.pay(PaymentRequest { quote_id: quote.id }).await.is_ok());
    }

    #[tokio::test]
    async fn test_double_payment_is_rejected() {
        let (service, _) = quiet_service();
        let quote = service
            .create_quote(request(CurrencyCode::EUR, CurrencyCode::GBP, 300.0))
            .await
            .unwrap();

        let first = service.pay(PaymentRequest { quote_id: quote.id }).await;
        let second = service.pay(PaymentRequest { quote_id: quote.id }).await;

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), FxError::duplicate_payment(quote.id));

        let for_quote: Vec<_> = service
            .list_transactions()
            .await
            .unwrap()
            .into_iter()
            .filter(|tx| tx.quote_id == quote.id)
            .collect();
        assert_eq!(for_quote.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_double_payment() {
        let (service, _) = quiet_service();
        let service = Arc::new(service);
        let quote = service
            .create_quote(request(CurrencyCode::EUR, CurrencyCode::GBP, 300.0))
            .await
            .unwrap();

        let a = {
            let service = service.clone();
            tokio::spawn(async move { service.pay(PaymentRequest { quote_id: quote.id }).await })
        };
        let b = {
            let service = service.clone();
            tokio::spawn(async move { service.pay(PaymentRequest { quote_id: quote.id }).await })
        };
        let results = [a.await.unwrap(), b.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(service.list_transactions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payment_failure_leaves_quote_payable() {
        let policy = Arc::new(Scripted::default());
        let (service, _) = service_with(Shared(policy.clone()), FxConfig::default());
        let quote = service
            .create_quote(request(CurrencyCode::USD, CurrencyCode::EUR, 100.0))
            .await
            .unwrap();

        policy.set_failing(Operation::Payment, true);
        assert_eq!(
            service
                .pay(PaymentRequest { quote_id: quote.id })
                .await
                .unwrap_err(),
            FxError::Transient
        );
        assert!(service.list_transactions().await.unwrap().is_empty());
        assert!(service.repo().find_transaction_for_quote(quote.id).await.unwrap().is_none());

        policy.set_failing(Operation::Payment, false);
        let paid = service.pay(PaymentRequest { quote_id: quote.id }).await.unwrap();
        assert_eq!(paid.quote_id, quote.id);
        let transactions = service.list_transactions().await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].id, paid.transaction_id);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Status
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_unknown_transaction_is_not_found() {
        let (service, _) = quiet_service();
        let id = TransactionId::new();
        assert_eq!(
            service.get_transaction_status(id).await.unwrap_err(),
            FxError::transaction_not_found(id)
        );
        assert_eq!(
            service.fetch_status(id).await.unwrap_err(),
            FxError::transaction_not_found(id)
        );
    }

    #[tokio::test]
    async fn test_status_override() {
        let (service, clock) = quiet_service();
        let quote = service
            .create_quote(request(CurrencyCode::INR, CurrencyCode::USD, 10_000.0))
            .await
            .unwrap();
        let paid = service
            .pay(PaymentRequest { quote_id: quote.id })
            .await
            .unwrap();

        clock.advance(TimeDelta::seconds(4));
        let sent = service
            .set_transaction_status(paid.transaction_id, TransactionStatus::Sent)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sent.status, TransactionStatus::Sent);
        assert_eq!(sent.updated_at, clock.now());

        clock.advance(TimeDelta::seconds(4));
        service
            .set_transaction_status(paid.transaction_id, TransactionStatus::Settled)
            .await
            .unwrap();

        // backwards and unknown ids are silent no-ops
        let ignored = service
            .set_transaction_status(paid.transaction_id, TransactionStatus::Processing)
            .await
            .unwrap();
        assert!(ignored.is_none());
        let missing = service
            .set_transaction_status(TransactionId::new(), TransactionStatus::Failed)
            .await
            .unwrap();
        assert!(missing.is_none());

        let tx = service
            .get_transaction_status(paid.transaction_id)
            .await
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Settled);
        assert_eq!(tx.updated_at, clock.now());
    }

    #[tokio::test]
    async fn test_status_failure_injection() {
        let (service, _) = service_with(Scripted::failing(Operation::Status), FxConfig::default());
        let result = service.get_transaction_status(TransactionId::new()).await;
        assert_eq!(result.unwrap_err(), FxError::Transient);
    }
}
