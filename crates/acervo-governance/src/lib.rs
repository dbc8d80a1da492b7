//! # acervo-governance: Governance Ledger and Export
//!
//! The ledger is the single source of audit truth: an append-only log of
//! legal, licensing, financial and administrative decisions.
//!
//! - [`GovernanceLedger`] records and queries entries. Recording stamps the
//!   decision instant itself; callers cannot backdate an entry.
//! - [`export`] renders a slice of the ledger as delimited text or as a
//!   human-readable report. Both renderings are pure functions of their
//!   input and always emit entries in chronological order.
//!
//! Engines that must commit a record change together with its entry use
//! [`GovernanceLedger::stamp`] to build the entry and add it to their own
//! [`acervo_store::WriteBatch`].

pub mod export;
pub mod ledger;

pub use export::{to_delimited_text, to_report_text, ExportError, DELIMITED_HEADER};
pub use ledger::{resolve_period, GovernanceLedger};
