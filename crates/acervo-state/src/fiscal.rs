//! # Fiscal Configuration: Revenue Split Singleton
//!
//! The global split between the rights-holder and the platform. One record,
//! stored under [`FISCAL_CONFIGURATION_KEY`], created lazily by the first
//! administrative update and never deleted.
//!
//! The two percentages need not sum to 1. Whatever they leave over (or
//! overshoot) is a deliberate platform absorption and is preserved as
//! configured, never normalized.
//!
//! A missing configuration is "not yet configured". Callers must surface
//! that as an error; defaulting to zero would grant the platform the whole
//! gross amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use acervo_core::{Money, MoneyError, Percentage, Timestamp};

/// Key of the singleton record.
pub const FISCAL_CONFIGURATION_KEY: &str = "global";

/// The revenue split in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalConfiguration {
    /// Share retained by the rights-holder (the athlete-retained percentage).
    pub beneficiary_percentage: Percentage,
    /// Platform commission percentage.
    pub platform_percentage: Percentage,
    /// Free-text legal basis for the split.
    pub legal_note: Option<String>,
    /// When the split was last changed.
    pub updated_at: Timestamp,
    /// Who last changed it.
    pub updated_by: String,
}

impl FiscalConfiguration {
    /// Build a configuration stamped with its updater.
    pub fn new(
        beneficiary_percentage: Percentage,
        platform_percentage: Percentage,
        legal_note: Option<String>,
        updated_by: impl Into<String>,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            beneficiary_percentage,
            platform_percentage,
            legal_note,
            updated_at,
            updated_by: updated_by.into(),
        }
    }

    /// `1 − (beneficiary + platform)`. Positive when the platform absorbs a
    /// remainder, negative when the configured shares overshoot.
    pub fn unallocated_fraction(&self) -> Decimal {
        Decimal::ONE - self.beneficiary_percentage.fraction() - self.platform_percentage.fraction()
    }

    /// Split `gross` under this configuration.
    ///
    /// The beneficiary share is rounded half-up once; the commission is the
    /// exact remainder, so `commission + net == gross` holds to the cent.
    pub fn split(&self, gross: Money) -> Result<SplitAmounts, MoneyError> {
        let net = gross.share(self.beneficiary_percentage)?;
        let commission = gross.checked_sub(net)?;
        Ok(SplitAmounts {
            gross,
            commission,
            net,
            beneficiary_percentage: self.beneficiary_percentage,
            commission_percentage: self.platform_percentage,
        })
    }
}

/// A computed split, together with the percentages that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitAmounts {
    /// Gross license price.
    pub gross: Money,
    /// Amount retained by the platform.
    pub commission: Money,
    /// Amount due to the beneficiary.
    pub net: Money,
    /// Beneficiary percentage applied.
    pub beneficiary_percentage: Percentage,
    /// Platform commission percentage configured at the time.
    pub commission_percentage: Percentage,
}

impl SplitAmounts {
    /// Whether `commission + net == gross`.
    pub fn is_balanced(&self) -> bool {
        self.commission
            .checked_add(self.net)
            .map_or(false, |total| total == self.gross)
    }

    /// Commission beyond (positive) or short of (negative) the configured
    /// platform percentage: the absorbed remainder, in money.
    pub fn platform_residual(&self) -> Result<Decimal, MoneyError> {
        let configured = self.gross.share(self.commission_percentage)?;
        Ok(self.commission.amount() - configured.amount())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(beneficiary: &str, platform: &str) -> FiscalConfiguration {
        FiscalConfiguration::new(
            Percentage::parse(beneficiary).unwrap(),
            Percentage::parse(platform).unwrap(),
            Some("Resolução 12/2025".to_string()),
            "admin-1",
            Timestamp::now(),
        )
    }

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    #[test]
    fn standard_split() {
        let split = config("0.85", "0.15").split(money("1000.00")).unwrap();
        assert_eq!(split.gross, money("1000.00"));
        assert_eq!(split.net, money("850.00"));
        assert_eq!(split.commission, money("150.00"));
        assert!(split.is_balanced());
        assert_eq!(split.platform_residual().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn remainder_is_absorbed_by_platform_not_normalized() {
        let cfg = config("0.80", "0.15");
        assert_eq!(cfg.unallocated_fraction(), Decimal::new(5, 2));
        let split = cfg.split(money("1000.00")).unwrap();
        assert_eq!(split.net, money("800.00"));
        assert_eq!(split.commission, money("200.00"));
        assert_eq!(split.commission_percentage, Percentage::parse("0.15").unwrap());
        assert_eq!(split.platform_residual().unwrap(), Decimal::new(5000, 2));
    }

    #[test]
    fn overshoot_shows_as_negative_residual() {
        let cfg = config("0.90", "0.15");
        assert!(cfg.unallocated_fraction() < Decimal::ZERO);
        let split = cfg.split(money("100.00")).unwrap();
        assert!(split.is_balanced());
        assert!(split.platform_residual().unwrap() < Decimal::ZERO);
    }

    #[test]
    fn odd_cents_round_once_and_still_balance() {
        let split = config("0.85", "0.15").split(money("0.99")).unwrap();
        // 0.99 × 0.85 = 0.8415 → 0.84
        assert_eq!(split.net, money("0.84"));
        assert_eq!(split.commission, money("0.15"));
        assert!(split.is_balanced());
    }
}
