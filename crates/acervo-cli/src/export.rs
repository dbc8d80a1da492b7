//! # Export Subcommand
//!
//! Writes the governance ledger for a period as BOM-prefixed CSV (for
//! spreadsheet software) or as a plain-text report. Omitting `--start` and
//! `--end` exports the whole ledger.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use acervo_core::Timestamp;
use acervo_governance::{to_delimited_text, to_report_text, ExportError};

use crate::services::Services;

/// Output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-delimited text with a header row.
    Csv,
    /// Human-readable report.
    Report,
}

/// Arguments for `acervo export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(long, value_enum, default_value = "csv")]
    pub format: ExportFormat,

    /// Earliest decision instant to include (RFC 3339).
    #[arg(long, value_parser = crate::parse_timestamp)]
    pub start: Option<Timestamp>,

    /// Latest decision instant to include (RFC 3339).
    #[arg(long, value_parser = crate::parse_timestamp)]
    pub end: Option<Timestamp>,

    /// Write to this file instead of standard output.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Render the export as bytes.
pub async fn render(args: &ExportArgs, services: &Services) -> Result<Vec<u8>> {
    if let (Some(start), Some(end)) = (args.start, args.end) {
        if start > end {
            return Err(ExportError::InvertedPeriod { start, end }.into());
        }
    }
    let entries = services.ledger.query_by_period(args.start, args.end).await?;
    tracing::info!(entries = entries.len(), format = ?args.format, "Exporting governance ledger");
    Ok(match args.format {
        ExportFormat::Csv => to_delimited_text(&entries),
        ExportFormat::Report => {
            to_report_text(&entries, args.start, args.end, Timestamp::now())?.into_bytes()
        }
    })
}

/// Run the export, writing to `--output` or `out`.
pub async fn run_export(args: &ExportArgs, services: &Services, out: &mut impl Write) -> Result<u8> {
    let bytes = render(args, services).await?;
    match &args.output {
        Some(path) => {
            let mut file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            file.write_all(&bytes)?;
            tracing::info!(path = %path.display(), bytes = bytes.len(), "Export written");
        }
        None => out.write_all(&bytes)?,
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::in_memory;
    use acervo_core::{ActorContext, DecisionCategory};
    use acervo_governance::export::BOM;
    use acervo_state::Decision;

    fn args(format: ExportFormat, start: Option<&str>, end: Option<&str>) -> ExportArgs {
        ExportArgs {
            format,
            start: start.map(|s| Timestamp::parse(s).unwrap()),
            end: end.map(|s| Timestamp::parse(s).unwrap()),
            output: None,
        }
    }

    #[tokio::test]
    async fn csv_export_of_whole_ledger() {
        let (services, _, _) = in_memory();
        services
            .ledger
            .record(
                Decision::new(DecisionCategory::Administrative, "fiscal_configuration", "global", "X"),
                &ActorContext::new("ana", "ADMIN"),
            )
            .await
            .unwrap();
        let bytes = render(&args(ExportFormat::Csv, None, None), &services).await.unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(BOM));
        assert_eq!(text.matches("\r\n").count(), 2);
        assert!(text.contains("\"ana\""));
    }

    #[tokio::test]
    async fn report_names_open_bounds() {
        let (services, _, _) = in_memory();
        let bytes = render(&args(ExportFormat::Report, Some("2026-01-01T00:00:00Z"), None), &services)
            .await
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Período: 01/01/2026 00:00:00 UTC até atual"));
        assert!(text.contains("Total de registros: 0"));
    }

    #[tokio::test]
    async fn inverted_period_is_rejected_for_every_format() {
        let (services, _, _) = in_memory();
        for format in [ExportFormat::Csv, ExportFormat::Report] {
            let err = render(
                &args(format, Some("2026-02-01T00:00:00Z"), Some("2026-01-01T00:00:00Z")),
                &services,
            )
            .await
            .unwrap_err();
            assert!(err.downcast_ref::<ExportError>().is_some());
        }
    }
}
