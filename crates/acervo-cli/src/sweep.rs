//! # Sweep Subcommand
//!
//! Expires every validated rights document whose expiry instant has passed.
//! Meant to run on a schedule; running it twice is harmless.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use acervo_core::Timestamp;

use crate::services::Services;

/// Arguments for `acervo sweep`.
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Evaluate expiry as of this instant instead of now (RFC 3339).
    #[arg(long, value_parser = crate::parse_timestamp)]
    pub at: Option<Timestamp>,
}

/// Run the sweep and report how many documents expired.
pub async fn run_sweep(args: &SweepArgs, services: &Services, out: &mut impl Write) -> Result<u8> {
    let now = args.at.unwrap_or_else(Timestamp::now);
    let expired = services.rights.sweep_expired(now).await?;
    tracing::info!(expired, policy = ?services.rights.expiry_policy(), "Expiry sweep finished");
    writeln!(out, "{expired} document(s) expired")?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::in_memory;

    #[tokio::test]
    async fn sweep_reports_count() {
        let (services, _, _) = in_memory();
        let mut out = Vec::new();
        let code = run_sweep(&SweepArgs { at: None }, &services, &mut out).await.unwrap();
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "0 document(s) expired\n");
    }
}
