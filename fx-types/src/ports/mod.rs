//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod clock;
mod repository;
mod simulation;
mod status;

pub use clock::{Clock, ManualClock, SystemClock};
pub use repository::FxRepository;
pub use simulation::{Operation, SimulationPolicy};
pub use status::StatusSource;
