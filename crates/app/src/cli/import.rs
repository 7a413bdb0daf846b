use std::path::PathBuf;

use clap::Args;
use eshop_app::{context::AppContext, domain::catalog::ImportOutcome};
use serde_json::{Value, json};

#[derive(Debug, Args)]
pub(crate) struct ImportArgs {
    /// JSON batch file to import
    #[arg(long)]
    file: PathBuf,

    /// PostgreSQL connection string; an empty in-memory store is used when omitted
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,
}

pub(crate) async fn run(args: ImportArgs) -> Result<(), String> {
    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .map_err(|error| format!("failed to read {}: {error}", args.file.display()))?;

    let payload: Value = serde_json::from_str(&raw)
        .map_err(|error| format!("failed to parse {}: {error}", args.file.display()))?;

    let ctx = match args.database_url {
        Some(url) => AppContext::from_database_url(&url, true)
            .await
            .map_err(|error| format!("failed to initialize storage: {error}"))?,
        None => {
            eprintln!("no database configured; validating against an empty in-memory store");
            AppContext::in_memory()
        }
    };

    let response = match ctx.catalog.import_batch(payload).await {
        ImportOutcome::NoData => json!({ "result": "No data provided" }),
        ImportOutcome::Received(report) => json!({ "received": report }),
    };

    let rendered = serde_json::to_string_pretty(&response)
        .map_err(|error| format!("failed to render report: {error}"))?;

    println!("{rendered}");

    Ok(())
}
