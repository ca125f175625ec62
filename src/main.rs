use clap::{Parser, ValueEnum};
use credit_engine::application::config::EngineConfig;
use credit_engine::application::engine::CreditEngine;
use credit_engine::domain::ports::{LedgerStoreBox, RequestStoreBox, SettlementStoreBox};
use credit_engine::error::Result as CreditResult;
use credit_engine::infrastructure::in_memory::{
    InMemoryLedgerStore, InMemoryRequestStore, InMemorySettlementStore,
};
use credit_engine::interfaces::csv::command_reader::{Command, CommandReader, ScriptedCall};
use credit_engine::interfaces::csv::ledger_writer::LedgerWriter;
use log::{info, warn};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Attempts to take a player's ledger lock before giving up
    #[arg(long, default_value_t = EngineConfig::default().lock_attempts)]
    lock_attempts: u32,

    /// Initial backoff between lock attempts, in milliseconds
    #[arg(long, default_value_t = 1)]
    lock_backoff_ms: u64,

    /// Output format for the final ledger report
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
}

type Stores = (LedgerStoreBox, RequestStoreBox, SettlementStoreBox);

fn stores(db_path: Option<PathBuf>) -> Result<Stores> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = db_path {
        let store = credit_engine::infrastructure::rocksdb::RocksDBStore::open(db_path)?;
        return Ok((
            Box::new(store.clone()),
            Box::new(store.clone()),
            Box::new(store),
        ));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }

    Ok((
        Box::new(InMemoryLedgerStore::new()),
        Box::new(InMemoryRequestStore::new()),
        Box::new(InMemorySettlementStore::new()),
    ))
}

async fn dispatch(engine: &CreditEngine, call: ScriptedCall) -> CreditResult<()> {
    let caller = &call.caller;
    match call.command {
        Command::SetLimit { player_id, limit } => {
            engine.set_credit_limit(caller, player_id, limit).await
        }
        Command::Request {
            player_id,
            amount,
            chips,
            notes,
        } => engine
            .create_request(caller, player_id, amount, chips, &notes)
            .await
            .map(|_| ()),
        Command::Decide {
            request_id,
            decision,
            notes,
        } => engine
            .decide(caller, request_id, decision, &notes)
            .await
            .map(|_| ()),
        Command::Settle {
            player_id,
            amount,
            mode,
            evidence,
            notes,
        } => engine
            .settle(caller, player_id, amount, &mode, evidence.as_deref(), &notes)
            .await
            .map(|_| ()),
        Command::Status { player_id } => {
            let status = engine.get_credit_status(caller, player_id).await?;
            info!(
                "row {}: player {} limit {} outstanding {} available {}",
                call.row,
                player_id,
                status.credit_limit,
                status.total_outstanding,
                status.available_credit
            );
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = EngineConfig {
        lock_attempts: cli.lock_attempts.max(1),
        lock_backoff: Duration::from_millis(cli.lock_backoff_ms),
        ..EngineConfig::default()
    };
    let (ledgers, requests, settlements) = stores(cli.db_path)?;
    let engine = CreditEngine::with_config(ledgers, requests, settlements, config);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for call_result in reader.commands() {
        match call_result {
            Ok(call) => {
                let row = call.row;
                if let Err(e) = dispatch(&engine, call).await {
                    warn!("Row {}: {}", row, e);
                }
            }
            Err(e) => warn!("{}", e),
        }
    }

    let ledgers = engine.ledgers().await?;
    let stdout = io::stdout();
    let writer = LedgerWriter::new(stdout.lock());
    match cli.format {
        OutputFormat::Csv => writer.write_csv(&ledgers)?,
        OutputFormat::Json => writer.write_json(&ledgers)?,
    }

    Ok(())
}
