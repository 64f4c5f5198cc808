//! # FX Hex
//!
//! Application service layer and HTTP adapter for the FX service.
//!
//! ## Architecture
//!
//! - `service/` - Mock transaction service (quote, pay, status)
//! - `simulation/` - Latency and failure injection policies
//! - `config/` - Pricing and simulation settings
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The service is generic over `R: FxRepository`, allowing
//! different repository implementations to be injected.

pub mod config;
pub mod inbound;
pub mod service;
pub mod simulation;

#[cfg(test)]
mod service_tests;

pub use config::{FxConfig, OperationProfile, SimulationConfig};
pub use service::FxService;
pub use simulation::{Quiet, RandomSimulation};
