//! # acervo-cli: Operator CLI
//!
//! The `acervo` binary runs the engine's operator tasks against PostgreSQL.
//!
//! ## Subcommands
//!
//! - `acervo migrate`: Apply embedded database migrations.
//! - `acervo sweep`: Expire lapsed rights documents (schedule this).
//! - `acervo export`: Export the governance ledger as CSV or a text report.
//! - `acervo fiscal show|set`: Read or change the revenue split.
//! - `acervo statement`: A beneficiary's balance and history as JSON.
//!
//! ```bash
//! acervo export --format csv --start 2026-01-01T00:00:00Z --output ledger.csv
//! acervo fiscal set --beneficiary 0.85 --platform 0.15 --note "Resolução 12/2026"
//! ```
//!
//! Configuration is read from the environment; see [`config`].

pub mod config;
pub mod export;
pub mod fiscal;
pub mod services;
pub mod statement;
pub mod sweep;

use acervo_core::Timestamp;

/// clap value parser for RFC 3339 timestamps with any offset.
pub fn parse_timestamp(s: &str) -> Result<Timestamp, String> {
    Timestamp::parse_lenient(s).map_err(|e| e.to_string())
}
