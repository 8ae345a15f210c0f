#![allow(dead_code)]

use settlement_engine::application::engine::SettlementEngine;
use settlement_engine::config::EngineConfig;
use settlement_engine::domain::transaction::{Transaction, TransactionState};
use settlement_engine::infrastructure::in_memory::InMemoryTransactionStore;
use settlement_engine::infrastructure::listener::NoopListener;
use std::io::Write;
use tempfile::NamedTempFile;

pub const HEADER: &str = "op, tx, caller, mode, employer, worker, agreement, reference";

/// Writes a command CSV with the standard header followed by `rows`.
pub fn commands_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

pub fn in_memory_engine() -> SettlementEngine {
    SettlementEngine::new(
        Box::new(InMemoryTransactionStore::new()),
        Box::new(NoopListener),
        EngineConfig::default(),
    )
}

/// Checks the relationships between state and flags that must hold after
/// every operation.
pub fn assert_consistent(tx: &Transaction) {
    let employer = tx.confirmed_by_employer();
    let worker = tx.confirmed_by_worker();
    let expected = match (employer, worker) {
        (true, true) => TransactionState::Completed,
        (false, false) => TransactionState::Open,
        _ => TransactionState::PartiallyConfirmed,
    };
    assert_eq!(tx.state(), expected, "state drifted from flags: {tx:?}");
    if tx.mode() == settlement_engine::domain::transaction::PaymentMode::Money {
        assert!(
            employer || !worker,
            "worker confirmed receipt before employer confirmed sending: {tx:?}"
        );
    }
}
