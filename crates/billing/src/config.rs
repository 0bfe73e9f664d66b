//! Engine configuration.

use anyhow::{Context, bail};

use crate::coerce::MAX_AMOUNT;

/// Environment variable overriding the per-field money cap.
pub const MAX_AMOUNT_ENV: &str = "HOSPIX_BILLING_MAX_AMOUNT";

/// Limits applied by the billing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingConfig {
    /// Upper bound for every coerced money figure; never above `MAX_AMOUNT`.
    pub max_amount: i64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            max_amount: MAX_AMOUNT,
        }
    }
}

impl BillingConfig {
    /// Read overrides from the environment, falling back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var(MAX_AMOUNT_ENV) {
            Ok(raw) => Self::default().with_max_amount_str(&raw),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("reading {MAX_AMOUNT_ENV}")),
        }
    }

    /// The cap actually enforced: `max_amount` bounded to `[0, MAX_AMOUNT]`.
    pub fn effective_max_amount(&self) -> i64 {
        self.max_amount.clamp(0, MAX_AMOUNT)
    }

    fn with_max_amount_str(self, raw: &str) -> anyhow::Result<Self> {
        let max_amount: i64 = raw
            .trim()
            .parse()
            .with_context(|| format!("{MAX_AMOUNT_ENV} must be an integer, got '{raw}'"))?;
        if max_amount <= 0 {
            bail!("{MAX_AMOUNT_ENV} must be positive, got {max_amount}");
        }
        if max_amount > MAX_AMOUNT {
            bail!("{MAX_AMOUNT_ENV} may only lower the cap ({MAX_AMOUNT}), got {max_amount}");
        }
        Ok(Self { max_amount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cap_matches_coercion_cap() {
        assert_eq!(BillingConfig::default().max_amount, 9_999_999);
    }

    #[test]
    fn override_parses_positive_integers() {
        let cfg = BillingConfig::default().with_max_amount_str(" 50000 ").unwrap();
        assert_eq!(cfg.max_amount, 50_000);
    }

    #[test]
    fn override_rejects_garbage_and_non_positive() {
        assert!(BillingConfig::default().with_max_amount_str("lots").is_err());
        assert!(BillingConfig::default().with_max_amount_str("0").is_err());
        assert!(BillingConfig::default().with_max_amount_str("-5").is_err());
    }

    #[test]
    fn override_cannot_raise_cap() {
        assert!(BillingConfig::default().with_max_amount_str("10000000").is_err());
        assert!(
            BillingConfig::default()
                .with_max_amount_str("9223372036854775807")
                .is_err()
        );
        let cfg = BillingConfig::default().with_max_amount_str("9999999").unwrap();
        assert_eq!(cfg.max_amount, MAX_AMOUNT);
    }

    #[test]
    fn effective_cap_is_bounded() {
        assert_eq!(BillingConfig { max_amount: i64::MAX }.effective_max_amount(), MAX_AMOUNT);
        assert_eq!(BillingConfig { max_amount: -3 }.effective_max_amount(), 0);
        assert_eq!(BillingConfig { max_amount: 500 }.effective_max_amount(), 500);
    }
}
