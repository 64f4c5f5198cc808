//! Configuration loading from environment.

use std::env;
use std::str::FromStr;

use anyhow::Context;
use chrono::TimeDelta;
use fx_hex::{FxConfig, OperationProfile};
use fx_types::Operation;

/// Jitter is clamped to ±0.5, so the rate stays positive below this band.
const MAX_RATE_FLUCTUATION: f64 = 2.0;

/// Application configuration.
pub struct Config {
    pub port: u16,
    /// When false, the service answers instantly and never fails.
    pub simulate: bool,
    pub json_logs: bool,
    pub fx: FxConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(var("PORT"), "PORT", 3000)?;
        let simulate = parse_or(var("FX_SIMULATE"), "FX_SIMULATE", true)?;
        let json_logs = var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        let mut fx = FxConfig::default();
        fx.fees.rate = parse_or(var("FX_FEE_RATE"), "FX_FEE_RATE", fx.fees.rate)?;
        fx.fees.minimum = parse_or(var("FX_MINIMUM_FEE"), "FX_MINIMUM_FEE", fx.fees.minimum)?;
        fx.rate_fluctuation = parse_or(
            var("FX_RATE_FLUCTUATION"),
            "FX_RATE_FLUCTUATION",
            fx.rate_fluctuation,
        )?;

        let ttl_secs: i64 = parse_or(
            var("FX_QUOTE_TTL_SECS"),
            "FX_QUOTE_TTL_SECS",
            fx.quote_ttl.num_seconds(),
        )?;
        if ttl_secs <= 0 {
            anyhow::bail!("FX_QUOTE_TTL_SECS must be positive, got {}", ttl_secs);
        }
        fx.quote_ttl = TimeDelta::seconds(ttl_secs);

        for (op, suffix) in [
            (Operation::Quote, "QUOTE"),
            (Operation::Payment, "PAYMENT"),
            (Operation::Status, "STATUS"),
        ] {
            let profile = fx.simulation.profile_mut(op);
            *profile = operation_profile(&var, suffix, *profile)?;
        }

        for (key, value) in [
            ("FX_FEE_RATE", fx.fees.rate),
            ("FX_MINIMUM_FEE", fx.fees.minimum),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                anyhow::bail!("{} must be a finite, non-negative number, got {}", key, value);
            }
        }
        // A band of 2 or more lets a jittered rate reach zero.
        if !(0.0..MAX_RATE_FLUCTUATION).contains(&fx.rate_fluctuation) {
            anyhow::bail!(
                "FX_RATE_FLUCTUATION must lie in [0, {}), got {}",
                MAX_RATE_FLUCTUATION,
                fx.rate_fluctuation
            );
        }

        Ok(Self {
            port,
            simulate,
            json_logs,
            fx,
        })
    }
}

fn operation_profile(
    var: &impl Fn(&str) -> Option<String>,
    suffix: &str,
    default: OperationProfile,
) -> anyhow::Result<OperationProfile> {
    let latency_key = format!("FX_LATENCY_MS_{}", suffix);
    let failure_key = format!("FX_FAILURE_RATE_{}", suffix);

    let latency_ms = parse_or(
        var(&latency_key),
        &latency_key,
        default.latency.as_millis() as u64,
    )?;
    let failure_rate: f64 = parse_or(var(&failure_key), &failure_key, default.failure_rate)?;
    if !(0.0..=1.0).contains(&failure_rate) {
        anyhow::bail!("{} must lie in [0, 1], got {}", failure_key, failure_rate);
    }

    Ok(OperationProfile::new(latency_ms, failure_rate))
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
