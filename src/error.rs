use crate::domain::transaction::{Transaction, TransactionId, Violation};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum SettlementError {
    #[error("Transaction {0} not found")]
    #[diagnostic(code(settlement::not_found))]
    NotFound(TransactionId),
    #[error("Transaction {0} already exists")]
    #[diagnostic(code(settlement::duplicate))]
    DuplicateTransaction(TransactionId),
    #[error("Employer and worker must be different parties")]
    #[diagnostic(code(settlement::self_dealing))]
    SelfDealing,
    /// A transition rule refused the operation. `snapshot` is the unchanged
    /// transaction so the caller can re-render it.
    #[error("Rejected ({violation:?}): {violation}")]
    #[diagnostic(code(settlement::rejected))]
    Rejected {
        violation: Violation,
        snapshot: Box<Transaction>,
    },
    #[error("Malformed command: {0}")]
    #[diagnostic(code(settlement::malformed_command))]
    MalformedCommand(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Settlement listener failed: {0}")]
    ListenerError(String),
}

impl SettlementError {
    /// The rule violation behind a rejection, if this is one.
    pub fn violation(&self) -> Option<Violation> {
        match self {
            Self::Rejected { violation, .. } => Some(*violation),
            _ => None,
        }
    }

    /// The current snapshot carried by a rejection.
    pub fn snapshot(&self) -> Option<&Transaction> {
        match self {
            Self::Rejected { snapshot, .. } => Some(snapshot.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SettlementError>;
