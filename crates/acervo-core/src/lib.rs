//! # acervo-core: Foundational Types for the Acervo Licensing Engine
//!
//! This crate is the leaf of the workspace dependency graph. It defines the
//! primitives every other crate builds on: identifiers, time, money, the
//! closed vocabularies of the rights domain, and the error taxonomy that
//! engine operations return to callers.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `DocumentId`, `ItemId`,
//!    `PhotoAssetId`, `BeneficiaryId`, `TransactionId`, `EntryId` are distinct
//!    types. A beneficiary id cannot be passed where an item id is expected.
//!
//! 2. **No floating point for money.** `Money` and `Percentage` wrap
//!    `rust_decimal::Decimal`. Rounding is round-half-up to two places and is
//!    applied exactly once, at the point an amount is derived.
//!
//! 3. **UTC-only timestamps.** `Timestamp` is always UTC and truncated to
//!    microseconds, the precision the store keeps, so a stored instant
//!    compares equal to the one that was written.
//!
//! 4. **Explicit actor context.** Every audited operation takes an
//!    [`ActorContext`] argument instead of reading an ambient session.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `acervo-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod actor;
pub mod domain;
pub mod error;
pub mod identity;
pub mod money;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use actor::ActorContext;
pub use domain::{DecisionCategory, DocumentKind, LicenseType, Purpose, Territory};
pub use error::{AcervoError, RecordKind};
pub use identity::{
    BeneficiaryId, DocumentId, EntryId, ItemId, LicenseeId, PersonId, PhotoAssetId, TransactionId,
};
pub use money::{Money, MoneyError, Percentage};
pub use temporal::Timestamp;
