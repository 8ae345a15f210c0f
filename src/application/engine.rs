use crate::application::command::Command;
use crate::config::EngineConfig;
use crate::domain::ports::{SettlementListenerBox, TransactionStoreBox};
use crate::domain::transaction::{
    AgreementId, PartyId, PaymentMode, Transaction, TransactionId, Transition, Violation,
};
use crate::error::{Result, SettlementError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info};

/// The entry point for settling two-party transactions.
///
/// `SettlementEngine` owns the storage backend and the closure listener.
/// Every operation runs under a per-transaction mutex, so a read-check-write
/// on one transaction never interleaves with another writer on the same id.
/// Distinct transactions proceed independently.
pub struct SettlementEngine {
    store: TransactionStoreBox,
    listener: SettlementListenerBox,
    config: EngineConfig,
    locks: Mutex<HashMap<TransactionId, Arc<Mutex<()>>>>,
}

impl SettlementEngine {
    /// Creates a new `SettlementEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence for transactions.
    /// * `listener` - Notified once per transaction when it completes.
    /// * `config` - Engine policies.
    pub fn new(
        store: TransactionStoreBox,
        listener: SettlementListenerBox,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            listener,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a new OPEN transaction for an accepted work agreement.
    pub async fn open_transaction(
        &self,
        id: TransactionId,
        agreement: AgreementId,
        mode: PaymentMode,
        employer: PartyId,
        worker: PartyId,
    ) -> Result<Transaction> {
        if employer == worker {
            return Err(SettlementError::SelfDealing);
        }

        let guard = self.lock(id).await;
        let tx = Transaction::open(id, agreement, mode, employer, worker);
        let stored = match self.store.exists(id).await {
            Ok(true) => return Err(SettlementError::DuplicateTransaction(id)),
            Ok(false) => self.store.store(tx.clone()).await,
            Err(e) => Err(e),
        };
        if let Err(e) = stored {
            self.release(id, guard).await;
            return Err(e);
        }
        info!(tx = id, agreement, ?mode, employer, worker, "transaction opened");
        Ok(tx)
    }

    /// Employer confirms the money payment was sent.
    pub async fn confirm_payment_sent(
        &self,
        id: TransactionId,
        caller: PartyId,
    ) -> Result<Transaction> {
        self.apply(id, |tx| tx.confirm_payment_sent(caller)).await
    }

    /// Worker confirms the money payment was received. May complete the
    /// transaction.
    pub async fn confirm_payment_received(
        &self,
        id: TransactionId,
        caller: PartyId,
    ) -> Result<Transaction> {
        self.apply(id, |tx| tx.confirm_payment_received(caller)).await
    }

    /// Either party confirms a barter exchange. May complete the transaction.
    pub async fn confirm_barter_exchange(
        &self,
        id: TransactionId,
        caller: PartyId,
    ) -> Result<Transaction> {
        self.apply(id, |tx| tx.confirm_exchange(caller)).await
    }

    /// Confirms on behalf of the caller, picking the operation that matches
    /// their role and the transaction's payment mode.
    pub async fn confirm(&self, id: TransactionId, caller: PartyId) -> Result<Transaction> {
        self.apply(id, |tx| tx.confirm(caller)).await
    }

    pub async fn attach_evidence(
        &self,
        id: TransactionId,
        caller: PartyId,
        reference: &str,
    ) -> Result<Transaction> {
        let policy = self.config.evidence_policy;
        self.apply(id, |tx| tx.attach_evidence(caller, reference, policy)).await
    }

    /// Read-only fetch for polling.
    pub async fn fetch(&self, id: TransactionId) -> Result<Transaction> {
        self.store
            .get(id)
            .await?
            .ok_or(SettlementError::NotFound(id))
    }

    /// All known transactions, ordered by id.
    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        let mut all = self.store.get_all().await?;
        all.sort_by_key(|tx| tx.id());
        Ok(all)
    }

    pub async fn execute(&self, command: Command) -> Result<Transaction> {
        match command {
            Command::Open {
                tx,
                agreement,
                mode,
                employer,
                worker,
            } => {
                self.open_transaction(tx, agreement, mode, employer, worker)
                    .await
            }
            Command::Confirm { tx, caller } => self.confirm(tx, caller).await,
            Command::ConfirmPaymentSent { tx, caller } => {
                self.confirm_payment_sent(tx, caller).await
            }
            Command::ConfirmPaymentReceived { tx, caller } => {
                self.confirm_payment_received(tx, caller).await
            }
            Command::ConfirmExchange { tx, caller } => {
                self.confirm_barter_exchange(tx, caller).await
            }
            Command::AttachEvidence {
                tx,
                caller,
                reference,
            } => self.attach_evidence(tx, caller, &reference).await,
        }
    }

    /// Loads, validates and writes a transaction under its lock.
    ///
    /// The rule in `op` either rejects without touching the transaction or
    /// applies the change including the state recomputation, so what gets
    /// persisted is always consistent.
    async fn apply<F>(&self, id: TransactionId, op: F) -> Result<Transaction>
    where
        F: FnOnce(&mut Transaction) -> std::result::Result<Transition, Violation> + Send,
    {
        let guard = self.lock(id).await;
        let mut tx = match self.store.get(id).await {
            Ok(Some(tx)) => tx,
            Ok(None) => {
                self.release(id, guard).await;
                return Err(SettlementError::NotFound(id));
            }
            Err(e) => {
                self.release(id, guard).await;
                return Err(e);
            }
        };

        let transition = match op(&mut tx) {
            Ok(transition) => transition,
            Err(violation) => {
                return Err(SettlementError::Rejected {
                    violation,
                    snapshot: Box::new(tx),
                });
            }
        };

        self.store.store(tx.clone()).await?;
        debug!(tx = id, ?transition, state = ?tx.state(), "transition applied");

        if transition == Transition::Settled {
            info!(tx = id, agreement = tx.agreement(), "transaction settled");
            // Completion is already persisted; a failed notification is
            // reported but does not reopen the transaction.
            if let Err(e) = self.listener.on_settled(&tx).await {
                error!(tx = id, error = %e, "settlement listener failed");
            }
        }

        Ok(tx)
    }

    async fn lock(&self, id: TransactionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drops the guard and forgets the id's mutex unless another task is
    /// holding or waiting on it. Used when no transaction was found or
    /// created under the id.
    async fn release(&self, id: TransactionId, guard: OwnedMutexGuard<()>) {
        let mut locks = self.locks.lock().await;
        drop(guard);
        if locks
            .get(&id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&id);
        }
    }
}
