//! # Fixed-Point Money and Percentages
//!
//! `Money` is a non-negative amount with exactly two fractional digits.
//! `Percentage` is a decimal fraction in `[0, 1]` (`0.85` means 85%).
//! Neither type ever touches floating point.
//!
//! ## Rounding
//!
//! [`Money::share()`] is the only operation that rounds. It multiplies by a
//! percentage and rounds half-up to two places, once. Every other amount in
//! the engine is derived from shares by exact subtraction, so splits always
//! reconcile to the cent.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AcervoError;

/// Errors constructing or combining monetary values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Amount was negative.
    #[error("amount must not be negative: {0}")]
    Negative(Decimal),

    /// Amount carried more than two fractional digits.
    #[error("amount has more than {scale} fractional digits: {value}", scale = Money::SCALE)]
    Precision {
        /// The offending value.
        value: Decimal,
    },

    /// Percentage outside `[0, 1]`.
    #[error("percentage must be within [0, 1]: {0}")]
    PercentageOutOfRange(Decimal),

    /// Arithmetic overflowed the decimal range.
    #[error("monetary arithmetic overflow")]
    Overflow,

    /// Text was not a decimal number.
    #[error("not a decimal number: {0:?}")]
    Parse(String),
}

impl From<MoneyError> for AcervoError {
    fn from(err: MoneyError) -> Self {
        AcervoError::Validation(err.to_string())
    }
}

// ─── Money ───────────────────────────────────────────────────────────

/// A non-negative monetary amount with two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Number of fractional digits every amount carries.
    pub const SCALE: u32 = 2;

    /// Zero.
    pub fn zero() -> Self {
        Self(Decimal::new(0, Self::SCALE))
    }

    /// Wrap a decimal amount.
    ///
    /// # Errors
    ///
    /// Rejects negative amounts and amounts that would need rounding to fit
    /// two fractional digits; rounding only ever happens in [`Money::share`].
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        let normalized = amount.normalize();
        if normalized.scale() > Self::SCALE {
            return Err(MoneyError::Precision { value: amount });
        }
        let mut scaled = normalized;
        scaled.rescale(Self::SCALE);
        Ok(Self(scaled))
    }

    /// Parse a decimal string such as `"1000"` or `"1000.50"`.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let amount: Decimal = s.trim().parse().map_err(|_| MoneyError::Parse(s.to_string()))?;
        Self::new(amount)
    }

    /// The amount in whole cents. Handy for tests and integer ledgers.
    pub fn from_cents(cents: u64) -> Result<Self, MoneyError> {
        let cents = i64::try_from(cents).map_err(|_| MoneyError::Overflow)?;
        Ok(Self(Decimal::new(cents, Self::SCALE)))
    }

    /// The underlying decimal.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `self × percentage`, rounded half-up to two places.
    pub fn share(&self, percentage: Percentage) -> Result<Self, MoneyError> {
        let raw = self
            .0
            .checked_mul(percentage.0)
            .ok_or(MoneyError::Overflow)?;
        let mut rounded = raw.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(Self::SCALE);
        Ok(Self(rounded))
    }

    /// Exact addition.
    pub fn checked_add(&self, other: Money) -> Result<Self, MoneyError> {
        self.0.checked_add(other.0).map(Self).ok_or(MoneyError::Overflow)
    }

    /// Exact subtraction; fails if the result would be negative.
    pub fn checked_sub(&self, other: Money) -> Result<Self, MoneyError> {
        let diff = self.0.checked_sub(other.0).ok_or(MoneyError::Overflow)?;
        Self::new(diff)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ─── Percentage ──────────────────────────────────────────────────────

/// A decimal fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percentage(Decimal);

impl Percentage {
    /// Wrap a fraction, rejecting values outside `[0, 1]`.
    pub fn new(fraction: Decimal) -> Result<Self, MoneyError> {
        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(MoneyError::PercentageOutOfRange(fraction));
        }
        Ok(Self(fraction.normalize()))
    }

    /// Parse a fraction such as `"0.85"`.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let fraction: Decimal = s.trim().parse().map_err(|_| MoneyError::Parse(s.to_string()))?;
        Self::new(fraction)
    }

    /// The underlying fraction.
    pub fn fraction(&self) -> Decimal {
        self.0
    }

    /// Rendered as a percentage (`0.85` → `"85%"`).
    pub fn to_percent_string(&self) -> String {
        format!("{}%", (self.0 * Decimal::ONE_HUNDRED).normalize())
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for Decimal {
    fn from(p: Percentage) -> Self {
        p.0
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
