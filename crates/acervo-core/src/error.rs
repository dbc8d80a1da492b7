//! # Error Types: Caller-Facing Taxonomy
//!
//! Every engine operation returns `Result<_, AcervoError>`. Lower-level
//! crates keep their own structured errors (`DocumentError`,
//! `TransactionError`, `StoreError`) and convert into this enum at the engine
//! boundary, so callers only ever match on one taxonomy.
//!
//! ## Design
//!
//! - `NotFound` and `Unauthorized` are distinct: a caller must be able to tell
//!   "this item does not exist" apart from "this item is not licensable".
//! - `ConfigurationMissing` is never replaced by a default split. A zero
//!   split would hand the platform 100% of every sale.
//! - `StoreUnavailable` is the only variant that may be worth retrying, and
//!   only for reads.

use thiserror::Error;

/// The kind of record a `NotFound` error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// An archive catalog item.
    Item,
    /// A rights-holder receiving payouts.
    Beneficiary,
    /// A rights document.
    Document,
    /// A settlement transaction.
    Transaction,
    /// A governance ledger entry.
    GovernanceEntry,
    /// The fiscal configuration singleton.
    FiscalConfiguration,
}

impl RecordKind {
    /// Stable lower-case name used in messages and ledger entity types.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Beneficiary => "beneficiary",
            Self::Document => "rights_document",
            Self::Transaction => "transaction",
            Self::GovernanceEntry => "governance_entry",
            Self::FiscalConfiguration => "fiscal_configuration",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for the licensing engine.
#[derive(Error, Debug)]
pub enum AcervoError {
    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What kind of record was looked up.
        kind: RecordKind,
        /// The identifier that was not found.
        id: String,
    },

    /// Licensing was attempted without a permitting, valid rights document.
    #[error("not licensable: {0}")]
    Unauthorized(String),

    /// A lifecycle rule or an immutability rule was violated.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The fiscal configuration singleton has never been written.
    #[error("fiscal configuration is missing; an administrator must configure the revenue split before settlement")]
    ConfigurationMissing,

    /// The persistent store could not be reached or failed mid-operation.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Caller input is malformed (out-of-range percentage, negative price, empty label).
    #[error("validation error: {0}")]
    Validation(String),
}

impl AcervoError {
    /// Construct a `NotFound` error for the given record kind.
    pub fn not_found(kind: RecordKind, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether the failed operation may be retried as-is.
    ///
    /// Only store outages are transient. Callers must still avoid retrying
    /// writes without an idempotency guard.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
