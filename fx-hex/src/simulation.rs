//! Simulation policies.

use std::time::Duration;

use fx_types::{Operation, SimulationPolicy};
use rand::Rng;

use crate::config::SimulationConfig;

/// Configured latencies with randomly injected failures and rate jitter.
#[derive(Debug, Clone)]
pub struct RandomSimulation {
    config: SimulationConfig,
}

impl RandomSimulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl SimulationPolicy for RandomSimulation {
    fn latency(&self, op: Operation) -> Duration {
        self.config.profile(op).latency
    }

    fn should_fail(&self, op: Operation) -> bool {
        let failure_rate = self.config.profile(op).failure_rate;
        failure_rate > 0.0 && rand::rng().random::<f64>() < failure_rate
    }

    fn rate_jitter(&self) -> f64 {
        rand::rng().random::<f64>() - 0.5
    }
}

/// No delay, no failures, base rates exactly.
#[derive(Debug, Default, Clone, Copy)]
pub struct Quiet;

impl SimulationPolicy for Quiet {
    fn latency(&self, _op: Operation) -> Duration {
        Duration::ZERO
    }

    fn should_fail(&self, _op: Operation) -> bool {
        false
    }

    fn rate_jitter(&self) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OperationProfile;

    #[test]
    fn test_certain_failure_and_certain_success() {
        let mut config = SimulationConfig::none();
        config.payment = OperationProfile::new(0, 1.0);
        let policy = RandomSimulation::new(config);

        for _ in 0..100 {
            assert!(policy.should_fail(Operation::Payment));
            assert!(!policy.should_fail(Operation::Quote));
        }
    }

    #[test]
    fn test_jitter_stays_in_band() {
        let policy = RandomSimulation::new(SimulationConfig::none());
        for _ in 0..1_000 {
            let jitter = policy.rate_jitter();
            assert!((-0.5..0.5).contains(&jitter));
        }
    }

    #[test]
    fn test_quiet_policy() {
        assert_eq!(Quiet.latency(Operation::Quote), Duration::ZERO);
        assert!(!Quiet.should_fail(Operation::Status));
        assert_eq!(Quiet.rate_jitter(), 0.0);
    }
}
