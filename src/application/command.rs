use crate::domain::transaction::{AgreementId, PartyId, PaymentMode, TransactionId};

/// A single request against the engine, as submitted by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open {
        tx: TransactionId,
        agreement: AgreementId,
        mode: PaymentMode,
        employer: PartyId,
        worker: PartyId,
    },
    Confirm {
        tx: TransactionId,
        caller: PartyId,
    },
    ConfirmPaymentSent {
        tx: TransactionId,
        caller: PartyId,
    },
    ConfirmPaymentReceived {
        tx: TransactionId,
        caller: PartyId,
    },
    ConfirmExchange {
        tx: TransactionId,
        caller: PartyId,
    },
    AttachEvidence {
        tx: TransactionId,
        caller: PartyId,
        reference: String,
    },
}

impl Command {
    pub fn transaction_id(&self) -> TransactionId {
        match self {
            Command::Open { tx, .. }
            | Command::Confirm { tx, .. }
            | Command::ConfirmPaymentSent { tx, .. }
            | Command::ConfirmPaymentReceived { tx, .. }
            | Command::ConfirmExchange { tx, .. }
            | Command::AttachEvidence { tx, .. } => *tx,
        }
    }
}
