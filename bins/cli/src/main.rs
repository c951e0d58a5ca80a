//! Bilan command-line generator.
//!
//! Loads a project's ledger from the configured source and prints its
//! balance sheet on stdout.

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bilan_core::ledger::ProjectId;
use bilan_core::source::{LedgerLoader, LedgerSource};
use bilan_core::statement::{BilanBuilder, render_table, to_csv};
use bilan_shared::{AppConfig, DebtPolicy};

/// Bilan - balance sheet generator
#[derive(Parser)]
#[command(name = "bilan")]
#[command(about = "Generate the balance sheet of a project from its ledger")]
#[command(version)]
struct Cli {
    /// Project identifier
    project_id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Payables accumulation policy (defaults to the configured one)
    #[arg(long)]
    debt_policy: Option<DebtPolicy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Two-column grid
    Table,
    /// Spreadsheet CSV
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bilan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let debt_policy = cli.debt_policy.unwrap_or(config.bilan.debt_policy);

    let project_id = ProjectId::parse(&cli.project_id)
        .map_err(anyhow::Error::msg)
        .context("Invalid project id")?;
    let loader = LedgerLoader::from_config(&config.ledger.source)
        .context("Failed to initialize ledger source")?;
    debug!(provider = loader.provider_name(), %debt_policy, "Loading ledger");

    let rows = loader
        .load(&project_id)
        .await
        .with_context(|| format!("Failed to load ledger for project '{project_id}'"))?;
    let statement = BilanBuilder::default()
        .with_debt_policy(debt_policy)
        .build(&rows);

    let output = match cli.format {
        OutputFormat::Json => {
            let mut json = serde_json::to_vec_pretty(&statement)?;
            json.push(b'\n');
            json
        }
        OutputFormat::Table => render_table(&statement).into_bytes(),
        OutputFormat::Csv => to_csv(&statement)?,
    };

    std::io::stdout()
        .lock()
        .write_all(&output)
        .context("Failed to write output")?;

    Ok(())
}
