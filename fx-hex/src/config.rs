//! Pricing and simulation settings for the mock service.

use std::time::Duration;

use chrono::TimeDelta;
use exchange_rates::{DEFAULT_FLUCTUATION_RANGE, RateTable};
use fx_types::{FeeSchedule, Operation};

/// How long quotes stay payable, in seconds.
pub const DEFAULT_QUOTE_TTL_SECS: i64 = 30;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct FxConfig {
    pub fees: FeeSchedule,
    pub quote_ttl: TimeDelta,
    /// Width of the symmetric rate fluctuation band, as a fraction of the base rate
    pub rate_fluctuation: f64,
    pub rates: RateTable,
    pub simulation: SimulationConfig,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::STANDARD,
            quote_ttl: TimeDelta::seconds(DEFAULT_QUOTE_TTL_SECS),
            rate_fluctuation: DEFAULT_FLUCTUATION_RANGE,
            rates: RateTable::standard(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// Simulated behaviour of one operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationProfile {
    pub latency: Duration,
    /// Probability in `[0, 1]` that a call fails with a transient error
    pub failure_rate: f64,
}

impl OperationProfile {
    pub const fn new(latency_ms: u64, failure_rate: f64) -> Self {
        Self {
            latency: Duration::from_millis(latency_ms),
            failure_rate,
        }
    }
}

/// Per-operation latency and failure injection.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub quote: OperationProfile,
    pub payment: OperationProfile,
    pub status: OperationProfile,
}

impl SimulationConfig {
    /// No delay, no failures.
    pub fn none() -> Self {
        Self {
            quote: OperationProfile::new(0, 0.0),
            payment: OperationProfile::new(0, 0.0),
            status: OperationProfile::new(0, 0.0),
        }
    }

    pub fn profile(&self, op: Operation) -> &OperationProfile {
        match op {
            Operation::Quote => &self.quote,
            Operation::Payment => &self.payment,
            Operation::Status => &self.status,
        }
    }

    pub fn profile_mut(&mut self, op: Operation) -> &mut OperationProfile {
        match op {
            Operation::Quote => &mut self.quote,
            Operation::Payment => &mut self.payment,
            Operation::Status => &mut self.status,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            quote: OperationProfile::new(500, 0.05),
            payment: OperationProfile::new(1_000, 0.10),
            status: OperationProfile::new(200, 0.02),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FxConfig::default();
        assert_eq!(config.fees.rate, 0.01);
        assert_eq!(config.fees.minimum, 5.0);
        assert_eq!(config.quote_ttl, TimeDelta::seconds(30));
        assert_eq!(config.rate_fluctuation, 0.02);
        assert_eq!(config.rates.len(), 20);

        let sim = &config.simulation;
        assert_eq!(sim.profile(Operation::Quote).latency, Duration::from_millis(500));
        assert_eq!(sim.profile(Operation::Payment).failure_rate, 0.10);
        assert_eq!(sim.profile(Operation::Status).latency, Duration::from_millis(200));
    }
}
