//! Transaction status source port.
//!
//! What the polling driver reads from: the service itself in-process, or an
//! HTTP client talking to it.

use crate::domain::{Transaction, TransactionId};
use crate::error::FxError;

#[async_trait::async_trait]
pub trait StatusSource: Send + Sync + 'static {
    async fn fetch_status(&self, id: TransactionId) -> Result<Transaction, FxError>;
}
