use crate::domain::ports::TransactionStore;
use crate::domain::transaction::{Transaction, TransactionId};
use crate::error::{Result, SettlementError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing transaction snapshots.
pub const CF_TRANSACTIONS: &str = "transactions";

impl From<rocksdb::Error> for SettlementError {
    fn from(e: rocksdb::Error) -> Self {
        SettlementError::StorageError(e.to_string())
    }
}

/// A persistent store implementation using RocksDB.
///
/// Transactions live in their own Column Family, keyed by the big-endian
/// transaction id and serialized as JSON.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "transactions" column family exists.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_transactions = ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_transactions])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn transactions_cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_TRANSACTIONS).ok_or_else(|| {
            SettlementError::StorageError("Transactions column family not found".to_string())
        })
    }
}

#[async_trait]
impl TransactionStore for RocksDBStore {
    async fn store(&self, tx: Transaction) -> Result<()> {
        let cf = self.transactions_cf()?;
        let value = serde_json::to_vec(&tx)?;
        self.db.put_cf(cf, tx.id().to_be_bytes(), value)?;
        Ok(())
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let cf = self.transactions_cf()?;
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: TransactionId) -> Result<bool> {
        let cf = self.transactions_cf()?;
        // Just check if the key exists without retrieving the value
        let result = self.db.get_pinned_cf(cf, id.to_be_bytes())?;
        Ok(result.is_some())
    }

    async fn get_all(&self) -> Result<Vec<Transaction>> {
        let cf = self.transactions_cf()?;
        let mut transactions = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            transactions.push(serde_json::from_slice(&value)?);
        }
        Ok(transactions)
    }
}
