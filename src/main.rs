//! Fishcast CLI - headless entry point for the prediction function and the
//! ingestion jobs.
//!
//! # Usage
//! ```sh
//! fishcast predict --date 2025-11-13
//! echo '{"target_date":"2025-11-13"}' | fishcast predict --payload -
//! fishcast ingest --date 2025-11-12
//! fishcast ingest --from 2025-01-01 --to 2025-11-12
//! ```
//!
//! # Environment variables
//! - `FISHCAST_STORE_ROOT` - root directory of the object store
//! - `FISHCAST_LOOKBACK_DAYS` - history window fetched per prediction
//! - `FISHCAST_DECISION_THRESHOLD` - optional override of the model's τ

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fishcast::application::{
    DataLoader, FeatureBuilder, InferenceEngine, IngestionService, PredictionService,
};
use fishcast::config::Config;
use fishcast::infrastructure::LocalObjectStore;
use fishcast::interfaces::handler;
use std::io::Read;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "fishcast", about = "Fishing-day prediction pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict for a date (default: tomorrow) and print the response payload
    Predict {
        /// Target date, YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Raw JSON invocation payload; '-' reads stdin. Overrides --date.
        #[arg(long)]
        payload: Option<String>,
    },
    /// Ingest raw daily exports into observation records
    Ingest {
        /// Single day to ingest
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Backfill range start (requires --to)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Backfill range end (requires --from)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let store = Arc::new(LocalObjectStore::new(config.store_root.clone()));

    match cli.command {
        Command::Predict { date, payload } => {
            info!("Fishcast {} starting prediction", env!("CARGO_PKG_VERSION"));

            // Model artifact loads once here; it lives for the process.
            // A load failure is reported in the same payload shape as any
            // other pipeline error before the process exits.
            let engine = match InferenceEngine::load(store.as_ref(), &config).await {
                Ok(engine) => engine,
                Err(err) => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&handler::error_payload(&err))?
                    );
                    std::process::exit(1);
                }
            };
            let service = PredictionService::new(
                DataLoader::new(store.clone(), config.records_prefix.clone()),
                FeatureBuilder::new(),
                engine,
                config.lookback_days,
            );

            let payload_value = match (payload, date) {
                (Some(raw), _) => {
                    let raw = if raw == "-" {
                        let mut buf = String::new();
                        std::io::stdin()
                            .read_to_string(&mut buf)
                            .context("Failed to read payload from stdin")?;
                        buf
                    } else {
                        raw
                    };
                    serde_json::from_str(&raw).context("Payload is not valid JSON")?
                }
                (None, Some(date)) => serde_json::json!({ "target_date": date }),
                (None, None) => serde_json::json!({}),
            };

            let response = handler::handle_request(&service, &payload_value).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Ingest { date, from, to } => {
            let service = IngestionService::new(
                store,
                config.raw_prefix.clone(),
                config.records_prefix.clone(),
            );
            match (date, from, to) {
                (Some(date), None, None) => {
                    service.ingest_day(date).await?;
                }
                (None, Some(from), Some(to)) => {
                    service.backfill(from, to).await?;
                }
                _ => bail!("pass either --date, or both --from and --to"),
            }
        }
    }

    Ok(())
}
