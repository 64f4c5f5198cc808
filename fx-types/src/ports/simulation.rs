//! Simulation policy port.
//!
//! The mock service delays and randomly fails its operations to imitate an
//! unreliable network. The policy is injected so tests can swap in
//! deterministic behaviour.

use std::time::Duration;

/// The service operations a policy can distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Quote,
    Payment,
    Status,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Quote => write!(f, "quote"),
            Operation::Payment => write!(f, "payment"),
            Operation::Status => write!(f, "status"),
        }
    }
}

pub trait SimulationPolicy: Send + Sync + 'static {
    /// How long `op` stalls before doing any work.
    fn latency(&self, op: Operation) -> Duration;

    /// Whether this call to `op` fails with a transient error.
    fn should_fail(&self, op: Operation) -> bool;

    /// Position inside the rate fluctuation band, in `[-0.5, 0.5]`.
    fn rate_jitter(&self) -> f64;
}
