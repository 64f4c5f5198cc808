//! Quote domain model.

use chrono::{DateTime, TimeDelta, Utc};
use exchange_rates::CurrencyCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a Quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(Uuid);

impl QuoteId {
    /// Creates a new random QuoteId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for QuoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for QuoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for QuoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Fee charged on top of the requested amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Proportional fee, as a fraction of the amount.
    pub rate: f64,
    /// Floor applied when the proportional fee is smaller.
    pub minimum: f64,
}

impl FeeSchedule {
    pub const STANDARD: FeeSchedule = FeeSchedule {
        rate: 0.01,
        minimum: 5.0,
    };

    pub fn fee_for(&self, amount: f64) -> f64 {
        (amount * self.rate).max(self.minimum)
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A priced, time-limited offer to exchange an amount between two currencies.
///
/// Quotes are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub source_currency: CurrencyCode,
    pub destination_currency: CurrencyCode,
    /// Requested amount, in the source currency
    pub amount: f64,
    /// Units of destination currency per unit of source currency
    pub rate: f64,
    pub fee: f64,
    /// `amount + fee`, in the source currency
    pub total_payable: f64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Quote {
    /// Prices a new quote at `rate`, valid for `ttl` from `now`.
    pub fn new(
        source_currency: CurrencyCode,
        destination_currency: CurrencyCode,
        amount: f64,
        rate: f64,
        fees: &FeeSchedule,
        now: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> Self {
        let fee = fees.fee_for(amount);
        Self {
            id: QuoteId::new(),
            source_currency,
            destination_currency,
            amount,
            rate,
            fee,
            total_payable: amount + fee,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        self.expires_at - now
    }

    /// What the recipient gets, in the destination currency.
    pub fn converted_amount(&self) -> f64 {
        self.amount * self.rate
    }
}

/// Renders a remaining validity window as `m:ss`, or `Expired`.
pub fn format_time_remaining(remaining: TimeDelta) -> String {
    if remaining <= TimeDelta::zero() {
        return "Expired".to_string();
    }
    let seconds = remaining.num_seconds();
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote_at(now: DateTime<Utc>, amount: f64) -> Quote {
        Quote::new(
            CurrencyCode::USD,
            CurrencyCode::EUR,
            amount,
            0.85,
            &FeeSchedule::STANDARD,
            now,
            TimeDelta::seconds(30),
        )
    }

    #[test]
    fn test_minimum_fee_applies_to_small_amounts() {
        let quote = quote_at(Utc::now(), 100.0);
        assert_eq!(quote.fee, 5.0);
        assert_eq!(quote.total_payable, 105.0);
    }

    #[test]
    fn test_proportional_fee_for_large_amounts() {
        let quote = quote_at(Utc::now(), 2_000.0);
        assert_eq!(quote.fee, 20.0);
        assert_eq!(quote.total_payable, 2_020.0);
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let now = Utc::now();
        let quote = quote_at(now, 100.0);
        assert_eq!(quote.expires_at, now + TimeDelta::seconds(30));
        assert!(!quote.is_expired(now + TimeDelta::seconds(29)));
        assert!(quote.is_expired(now + TimeDelta::seconds(30)));
        assert!(quote.is_expired(now + TimeDelta::seconds(31)));
    }

    #[test]
    fn test_converted_amount() {
        let quote = quote_at(Utc::now(), 200.0);
        assert!((quote.converted_amount() - 170.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_time_remaining() {
        assert_eq!(format_time_remaining(TimeDelta::seconds(-1)), "Expired");
        assert_eq!(format_time_remaining(TimeDelta::zero()), "Expired");
        assert_eq!(format_time_remaining(TimeDelta::seconds(65)), "1:05");
        assert_eq!(format_time_remaining(TimeDelta::seconds(30)), "0:30");
        assert_eq!(format_time_remaining(TimeDelta::milliseconds(89_400)), "1:29");
    }

    #[test]
    fn test_quote_id_roundtrip() {
        let id = QuoteId::new();
        let parsed: QuoteId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<QuoteId>().is_err());
    }
}
