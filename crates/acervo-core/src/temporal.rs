//! # Temporal Types: UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only instant truncated to microsecond precision.
//!
//! Every instant the engine records (document expiry, transaction creation,
//! governance decision time) is a `Timestamp`. Microseconds are what
//! PostgreSQL `TIMESTAMPTZ` keeps, so an instant read back from the store
//! compares equal to the one that was written, and decisions taken within
//! the same second still order correctly. Renderings stop at whole seconds.
//!
//! Non-UTC inputs are **rejected** by [`Timestamp::parse()`]. Use
//! [`Timestamp::parse_lenient()`] when ingesting values from outside systems.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AcervoError;

/// A UTC-only timestamp, truncated to microsecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated.
    pub fn now() -> Self {
        Self(truncate_to_micros(Utc::now()))
    }

    /// The Unix epoch. Lower bound for open-start ledger period queries.
    pub fn epoch() -> Self {
        Self(DateTime::<Utc>::from(std::time::UNIX_EPOCH))
    }

    /// From a `chrono::DateTime<Utc>`, dropping sub-microsecond digits.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_micros(dt))
    }

    /// Parse an RFC 3339 string. Only the `Z` suffix is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`AcervoError::Validation`] if the string is not RFC 3339 or
    /// carries an explicit offset (even `+00:00`).
    pub fn parse(s: &str) -> Result<Self, AcervoError> {
        if !s.ends_with('Z') {
            return Err(AcervoError::Validation(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        Self::parse_lenient(s)
    }

    /// Parse an RFC 3339 string with any offset, converting to UTC.
    pub fn parse_lenient(s: &str) -> Result<Self, AcervoError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| AcervoError::Validation(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;
        Ok(Self(truncate_to_micros(dt.with_timezone(&Utc))))
    }

    /// From a Unix epoch offset in seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, AcervoError> {
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| AcervoError::Validation(format!("invalid Unix timestamp: {secs}")))?;
        Ok(Self(dt))
    }

    /// Shift by a signed duration. Saturates at the representable range.
    pub fn shifted(&self, delta: Duration) -> Self {
        Self(truncate_to_micros(self.0.checked_add_signed(delta).unwrap_or(self.0)))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// ISO 8601 with Z suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Day-first human rendering used in printed reports (`15/01/2026 12:00:00 UTC`).
    pub fn to_report_format(&self) -> String {
        self.0.format("%d/%m/%Y %H:%M:%S UTC").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

fn truncate_to_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = dt.nanosecond();
    dt.with_nanosecond(nanos - nanos % 1_000).unwrap_or(dt)
}
