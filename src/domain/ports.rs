use super::transaction::{Transaction, TransactionId};
use crate::error::Result;
use async_trait::async_trait;

/// Get/put-by-identifier persistence for transactions.
///
/// Implementations need not serialize writers themselves; the engine holds a
/// per-transaction lock across every read-check-write.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn store(&self, tx: Transaction) -> Result<()>;
    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>>;
    async fn exists(&self, id: TransactionId) -> Result<bool>;
    async fn get_all(&self) -> Result<Vec<Transaction>>;
}

/// Receives the closure side effect once a transaction becomes completed,
/// e.g. to close the owning work agreement.
#[async_trait]
pub trait SettlementListener: Send + Sync {
    async fn on_settled(&self, tx: &Transaction) -> Result<()>;
}

pub type TransactionStoreBox = Box<dyn TransactionStore>;
pub type SettlementListenerBox = Box<dyn SettlementListener>;
