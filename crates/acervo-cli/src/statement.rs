//! # Statement Subcommand

use std::io::Write;

use anyhow::Result;
use clap::Args;

use acervo_core::BeneficiaryId;

use crate::services::Services;

/// Arguments for `acervo statement`.
#[derive(Args, Debug)]
pub struct StatementArgs {
    /// Beneficiary identifier.
    #[arg(long)]
    pub beneficiary: String,
}

/// Print the beneficiary's balance and history as pretty JSON.
pub async fn run_statement(
    args: &StatementArgs,
    services: &Services,
    out: &mut impl Write,
) -> Result<u8> {
    let statement = services
        .settlement
        .statement_for(&BeneficiaryId::new(args.beneficiary.as_str()))
        .await?;
    serde_json::to_writer_pretty(&mut *out, &statement)?;
    writeln!(out)?;
    Ok(0)
}
