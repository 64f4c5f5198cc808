//! Domain models for the FX service.

pub mod quote;
pub mod transaction;

pub use quote::{FeeSchedule, Quote, QuoteId, format_time_remaining};
pub use transaction::{ParseStatusError, Transaction, TransactionId, TransactionStatus};
