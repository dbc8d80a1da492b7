//! # Fiscal Subcommand
//!
//! `show` prints the configuration in force. `set` replaces it and records
//! an administrative governance entry under the configured operator.

use std::io::Write;

use anyhow::Result;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use acervo_core::ActorContext;

use crate::services::Services;

/// Arguments for `acervo fiscal`.
#[derive(Args, Debug)]
pub struct FiscalArgs {
    #[command(subcommand)]
    pub command: FiscalCommand,
}

/// Fiscal subcommands.
#[derive(Subcommand, Debug)]
pub enum FiscalCommand {
    /// Print the current split as JSON.
    Show,

    /// Replace the split.
    Set {
        /// Fraction retained by the beneficiary, e.g. `0.85`.
        #[arg(long)]
        beneficiary: Decimal,
        /// Fraction retained by the platform, e.g. `0.15`.
        #[arg(long)]
        platform: Decimal,
        /// Legal basis for the change.
        #[arg(long)]
        note: Option<String>,
    },
}

pub async fn run_fiscal(
    args: &FiscalArgs,
    services: &Services,
    actor: &ActorContext,
    out: &mut impl Write,
) -> Result<u8> {
    let config = match &args.command {
        FiscalCommand::Show => services.settlement.current_configuration().await?,
        FiscalCommand::Set {
            beneficiary,
            platform,
            note,
        } => {
            services
                .settlement
                .update_fiscal_configuration(actor, *beneficiary, *platform, note.clone())
                .await?
        }
    };
    serde_json::to_writer_pretty(&mut *out, &config)?;
    writeln!(out)?;
    Ok(0)
}
