use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use settlement_engine::application::engine::SettlementEngine;
use settlement_engine::config::{EngineConfig, EvidencePolicy};
use settlement_engine::domain::ports::TransactionStoreBox;
use settlement_engine::infrastructure::in_memory::InMemoryTransactionStore;
use settlement_engine::infrastructure::listener::TracingListener;
use settlement_engine::interfaces::csv::command_reader::CommandReader;
use settlement_engine::interfaces::csv::transaction_writer::TransactionWriter;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input settlement commands CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Whether evidence can still be changed after a transaction completes.
    #[arg(long, value_enum, default_value_t = EvidencePolicy::Amendable)]
    evidence_policy: EvidencePolicy,

    /// Format of the final transaction snapshots written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn open_store(db_path: Option<PathBuf>) -> Result<TransactionStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            use settlement_engine::infrastructure::rocksdb::RocksDBStore;
            let store = RocksDBStore::open(path)?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryTransactionStore::new()))
        }
        None => Ok(Box::new(InMemoryTransactionStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let config = EngineConfig::default().with_evidence_policy(cli.evidence_policy);
    let engine = SettlementEngine::new(
        open_store(cli.db_path)?,
        Box::new(TracingListener),
        config,
    );

    // Process commands
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                let tx = command.transaction_id();
                if let Err(e) = engine.execute(command).await {
                    warn!(tx, error = %e, "Error processing command");
                }
            }
            Err(e) => {
                warn!(error = %e, "Error reading command");
            }
        }
    }

    // Output final state
    let transactions = engine.transactions().await?;
    let stdout = io::stdout();
    match cli.format {
        OutputFormat::Csv => {
            let mut writer = TransactionWriter::new(stdout.lock());
            writer.write_transactions(&transactions)?;
        }
        OutputFormat::Json => {
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &transactions).into_diagnostic()?;
            writeln!(out).into_diagnostic()?;
        }
    }

    Ok(())
}
