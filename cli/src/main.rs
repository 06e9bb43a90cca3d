pub mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use cli::*;
use common::logger::init_logger;
use harness::orchestrator::Orchestrator;
use store::sqlite_store::{SqliteConnector, StoreAddress};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logger("ingest-bench", cli.json_logs);

    let cfg = cli.to_config();
    print_run_header(&cfg);

    let connector = SqliteConnector::new(
        StoreAddress::parse(&cfg.store_address),
        cfg.database.clone(),
        cfg.collection.clone(),
    )
    .context("invalid store configuration")?;

    // Setup and worker-connect failures end the process with a non-zero status.
    let summary = Orchestrator::new(cfg, Arc::new(connector))
        .run()
        .await
        .context("benchmark aborted")?;

    if cli.summary_json {
        println!("{}", summary.to_json()?);
    }

    Ok(())
}
