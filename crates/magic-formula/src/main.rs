//! magic-formula: rank equities by earnings yield and return on capital.
//!
//! Usage:
//!   magic-formula                                  # tickers from TICKERS or the built-in B3 list
//!   magic-formula --tickers PETR4.SA,VALE3.SA
//!   magic-formula --format json --top 10
//!   magic-formula --language PT-BR

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fmp_client::FmpClient;
use formula_core::{Pipeline, ScoreCalculator};

mod config;
mod locale;
mod report;

use config::AppConfig;
use report::RunReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "magic-formula", version, about = "Rank stocks by a Magic Formula composite score")]
struct Cli {
    /// Comma-separated tickers, overrides TICKERS
    #[arg(long, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Companies shown in the heatmap and bar series, overrides TOP_N
    #[arg(long)]
    top: Option<usize>,

    /// PT-BR or EN-US, overrides LANGUAGE
    #[arg(long)]
    language: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    config
        .apply_overrides(cli.tickers, cli.top, cli.language.as_deref())
        .context("Invalid command-line option")?;
    config.log_summary();

    let client = FmpClient::with_options(
        config.api_key.clone(),
        config.base_url.clone(),
        config.endpoint.clone(),
        config.timeout(),
    );
    let pipeline = Pipeline::new(
        Arc::new(client),
        ScoreCalculator::with_weights(config.weights),
        config.concurrency,
    );

    tracing::info!("Fetching metrics for {} tickers", config.tickers.len());
    let outcome = pipeline
        .run(&config.tickers)
        .await
        .context("Run aborted: check API_KEY")?;

    let report = RunReport::new(
        outcome,
        config.language,
        &config.endpoint.name,
        config.weights,
        config.top_n,
    );
    tracing::info!(
        "Done: {} requested, {} ranked, {} without data",
        report.total_requested,
        report.total_scored,
        report.failed.len()
    );

    match cli.format {
        OutputFormat::Table => print!("{}", report.render_table()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}

/// `RUST_LOG` filters, `RUST_LOG_FORMAT=json` switches to JSON lines. Logs go to
/// stderr so stdout stays clean for the table or JSON document.
fn init_tracing() {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(
                "magic_formula=info,formula_core=info,fmp_client=info",
            )
        })
    };

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    }
}
