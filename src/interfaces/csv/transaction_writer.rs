use crate::domain::transaction::{
    AgreementId, PartyId, PaymentMode, Transaction, TransactionId, TransactionState,
};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct TransactionRecord<'a> {
    tx: TransactionId,
    agreement: AgreementId,
    mode: PaymentMode,
    employer: PartyId,
    worker: PartyId,
    state: TransactionState,
    employer_confirmed: bool,
    worker_confirmed: bool,
    evidence: &'a str,
}

impl<'a> From<&'a Transaction> for TransactionRecord<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            tx: tx.id(),
            agreement: tx.agreement(),
            mode: tx.mode(),
            employer: tx.employer(),
            worker: tx.worker(),
            state: tx.state(),
            employer_confirmed: tx.confirmed_by_employer(),
            worker_confirmed: tx.confirmed_by_worker(),
            evidence: tx.evidence_reference().unwrap_or_default(),
        }
    }
}

/// Writes transaction snapshots as CSV, one row per transaction.
pub struct TransactionWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> TransactionWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_transactions<'a, I>(&mut self, transactions: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        for tx in transactions {
            self.writer.serialize(TransactionRecord::from(tx))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
