//! # acervo CLI entry point
//!
//! Parses arguments, reads [`AcervoConfig`] from the environment, initializes
//! tracing and dispatches to the subcommand handlers.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use acervo_cli::config::{AcervoConfig, LogFormat};
use acervo_cli::export::{run_export, ExportArgs};
use acervo_cli::fiscal::{run_fiscal, FiscalArgs};
use acervo_cli::services::Services;
use acervo_cli::statement::{run_statement, StatementArgs};
use acervo_cli::sweep::{run_sweep, SweepArgs};
use acervo_store::postgres;

/// Acervo licensing engine operator CLI.
///
/// Rights-expiry sweeps, governance ledger exports, fiscal configuration and
/// beneficiary statements against the PostgreSQL store named by DATABASE_URL.
#[derive(Parser, Debug)]
#[command(name = "acervo", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv). Overrides RUST_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply the embedded database migrations.
    Migrate,

    /// Expire rights documents whose permission has lapsed.
    Sweep(SweepArgs),

    /// Export the governance ledger as CSV or a text report.
    Export(ExportArgs),

    /// Show or change the revenue split.
    Fiscal(FiscalArgs),

    /// Print a beneficiary's balance and transaction history.
    Statement(StatementArgs),
}

fn init_tracing(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.with_target(false).init(),
    }
}

async fn run(cli: Cli, config: AcervoConfig) -> Result<u8> {
    let mut stdout = std::io::stdout();
    match cli.command {
        Commands::Migrate => {
            let url = config.require_database_url()?;
            postgres::init_pool(url, config.db_max_connections)
                .await
                .context("applying migrations")?;
            Ok(0)
        }
        Commands::Sweep(args) => {
            run_sweep(&args, &Services::connect(&config).await?, &mut stdout).await
        }
        Commands::Export(args) => {
            run_export(&args, &Services::connect(&config).await?, &mut stdout).await
        }
        Commands::Fiscal(args) => {
            let services = Services::connect(&config).await?;
            run_fiscal(&args, &services, &config.actor(), &mut stdout).await
        }
        Commands::Statement(args) => {
            run_statement(&args, &Services::connect(&config).await?, &mut stdout).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AcervoConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::from(2);
        }
    };
    init_tracing(cli.verbose, config.log_format);
    tracing::debug!(
        require_authorization = config.require_authorization,
        audit_expiry = config.audit_expiry,
        actor_id = %config.actor_id,
        "acervo CLI starting"
    );

    match run(cli, config).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
