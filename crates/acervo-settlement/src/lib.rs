//! # acervo-settlement: Revenue Settlement Engine
//!
//! Turns a licensing proposal into either a non-binding [`Simulation`] or a
//! binding, immutable [`acervo_state::Transaction`].
//!
//! ```text
//! Proposed ──simulate──▶ Simulated   (read-only)
//! Proposed ──settle────▶ Settled     (binding; ledger entry committed with it)
//! ```
//!
//! There is no way back from `Settled`. Undoing a settlement applies the
//! `Reversed` status to the existing transaction.
//!
//! Settlement reads the fiscal configuration once per operation and captures
//! the percentages it used into the transaction, so a later configuration
//! change never alters a past split. Two concurrent settlements of the same
//! item are not serialized against each other.

pub mod engine;
pub mod policy;

pub use engine::{labels, SettlementEngine, Simulation, Statement};
pub use policy::SettlementPolicy;
