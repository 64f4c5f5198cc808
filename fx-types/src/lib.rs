//! # FX Types
//!
//! Domain types and port traits for the FX quote and payment service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Quote, Transaction, TransactionStatus)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Service and repository error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    FeeSchedule, ParseStatusError, Quote, QuoteId, Transaction, TransactionId, TransactionStatus,
    format_time_remaining,
};
pub use dto::*;
pub use error::{ErrorCode, FxError, Recovery, RepoError};
pub use exchange_rates::{Currency, CurrencyCode};
pub use ports::{
    Clock, FxRepository, ManualClock, Operation, SimulationPolicy, StatusSource, SystemClock,
};
