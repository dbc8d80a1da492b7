//! # acervo-state: Records and Their Lifecycles
//!
//! The four record kinds the licensing engine persists, each with the rules
//! that govern how it may change.
//!
//! ## Records
//!
//! - **Rights document** (`rights.rs`): `PendingReview → Validated | Rejected`,
//!   `Validated → Expired`. Owns [`RightsDocument::permits_licensing`], the one
//!   authorization predicate used everywhere.
//!
//! - **Transaction** (`transaction.rs`): amounts fixed at creation from a
//!   fiscal snapshot; only the financial status and export references change
//!   afterwards. `Pending → Approved → Settled`, anything but `Reversed` →
//!   `Reversed`.
//!
//! - **Governance entry** (`governance.rs`): immutable once built. No setters
//!   exist; the content digest detects tampering in storage.
//!
//! - **Fiscal configuration** (`fiscal.rs`): the revenue-split singleton.
//!
//! ## Design
//!
//! Lifecycle fields are private. The only way to change a document's status
//! or a transaction's financial status is through a transition method that
//! checks the current state, so an invalid transition is an `Err`, never a
//! silently corrupted record.

pub mod fiscal;
pub mod governance;
pub mod rights;
pub mod transaction;

// ─── Rights document re-exports ─────────────────────────────────────

pub use rights::{DocumentError, DocumentLifecycle, DocumentStatus, DocumentTerms, RightsDocument};

// ─── Transaction re-exports ─────────────────────────────────────────

pub use transaction::{
    FinancialStatus, LicenseProposal, Transaction, TransactionError, TransactionReferences,
};

// ─── Governance re-exports ──────────────────────────────────────────

pub use governance::{Decision, GovernanceEntry};

// ─── Fiscal re-exports ──────────────────────────────────────────────

pub use fiscal::{FiscalConfiguration, SplitAmounts, FISCAL_CONFIGURATION_KEY};
