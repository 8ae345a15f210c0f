use crate::config::EvidencePolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TransactionId = u32;
pub type PartyId = u32;
pub type AgreementId = u32;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// Employer sends a payment, worker acknowledges receipt. Ordered.
    Money,
    /// Both parties acknowledge a reciprocal exchange. Unordered.
    Barter,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    #[default]
    Open,
    PartiallyConfirmed,
    Completed,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Role {
    Employer,
    Worker,
}

/// A transition rule refused the requested change. The transaction is left
/// untouched whenever one of these is returned.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Violation {
    #[error("caller is neither the employer nor the worker of this transaction")]
    Unauthorized,
    #[error("transaction is already completed")]
    AlreadyCompleted,
    #[error("caller has already confirmed this transaction")]
    AlreadyConfirmed,
    #[error("payment receipt cannot be confirmed before the employer confirms sending it")]
    PrematureConfirmation,
    #[error("evidence reference must not be empty")]
    InvalidEvidence,
    #[error("operation does not apply to a {0:?} transaction")]
    WrongPaymentMode(PaymentMode),
    #[error("operation is reserved for the {0:?}")]
    WrongRole(Role),
    #[error("evidence cannot be changed after completion")]
    EvidenceLocked,
}

/// The observable effect of an accepted operation.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Transition {
    /// A confirmation flag was written; the other party is still pending.
    Recorded,
    /// The second confirmation landed and the transaction is now closed.
    Settled,
    EvidenceAttached,
}

/// A two-party settlement record.
///
/// Confirmation flags and `state` are only written through the confirmation
/// operations below, each of which validates fully before mutating and then
/// hands over to `settle`, so `state` never drifts from the flags. Loading a
/// stored record recomputes `state` from the flags as well.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(try_from = "StoredTransaction")]
pub struct Transaction {
    id: TransactionId,
    /// The work agreement this transaction settles.
    agreement: AgreementId,
    mode: PaymentMode,
    employer: PartyId,
    worker: PartyId,
    state: TransactionState,
    confirmed_by_employer: bool,
    confirmed_by_worker: bool,
    evidence_reference: Option<String>,
}

/// Persisted shape of a `Transaction`. Any stored `state` is ignored.
#[derive(Deserialize)]
struct StoredTransaction {
    id: TransactionId,
    agreement: AgreementId,
    mode: PaymentMode,
    employer: PartyId,
    worker: PartyId,
    confirmed_by_employer: bool,
    confirmed_by_worker: bool,
    evidence_reference: Option<String>,
}

impl TryFrom<StoredTransaction> for Transaction {
    type Error = String;

    fn try_from(stored: StoredTransaction) -> Result<Self, Self::Error> {
        if stored.mode == PaymentMode::Money
            && stored.confirmed_by_worker
            && !stored.confirmed_by_employer
        {
            return Err(format!(
                "transaction {} records payment receipt without payment sent",
                stored.id
            ));
        }

        let mut tx = Transaction::open(
            stored.id,
            stored.agreement,
            stored.mode,
            stored.employer,
            stored.worker,
        );
        tx.confirmed_by_employer = stored.confirmed_by_employer;
        tx.confirmed_by_worker = stored.confirmed_by_worker;
        tx.evidence_reference = stored.evidence_reference;
        tx.settle();
        Ok(tx)
    }
}

impl Transaction {
    pub fn open(
        id: TransactionId,
        agreement: AgreementId,
        mode: PaymentMode,
        employer: PartyId,
        worker: PartyId,
    ) -> Self {
        Self {
            id,
            agreement,
            mode,
            employer,
            worker,
            state: TransactionState::Open,
            confirmed_by_employer: false,
            confirmed_by_worker: false,
            evidence_reference: None,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn agreement(&self) -> AgreementId {
        self.agreement
    }

    pub fn mode(&self) -> PaymentMode {
        self.mode
    }

    pub fn employer(&self) -> PartyId {
        self.employer
    }

    pub fn worker(&self) -> PartyId {
        self.worker
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn confirmed_by_employer(&self) -> bool {
        self.confirmed_by_employer
    }

    pub fn confirmed_by_worker(&self) -> bool {
        self.confirmed_by_worker
    }

    pub fn evidence_reference(&self) -> Option<&str> {
        self.evidence_reference.as_deref()
    }

    pub fn is_completed(&self) -> bool {
        self.state == TransactionState::Completed
    }

    /// Resolves the caller against the persisted parties.
    pub fn role_of(&self, caller: PartyId) -> Result<Role, Violation> {
        if caller == self.employer {
            Ok(Role::Employer)
        } else if caller == self.worker {
            Ok(Role::Worker)
        } else {
            Err(Violation::Unauthorized)
        }
    }

    /// Employer attests that the money payment was sent.
    pub fn confirm_payment_sent(&mut self, caller: PartyId) -> Result<Transition, Violation> {
        let role = self.role_of(caller)?;
        self.expect_mode(PaymentMode::Money)?;
        self.ensure_open()?;
        if role != Role::Employer {
            return Err(Violation::WrongRole(Role::Employer));
        }
        if self.confirmed_by_employer {
            return Err(Violation::AlreadyConfirmed);
        }

        self.confirmed_by_employer = true;
        Ok(self.settle())
    }

    /// Worker attests that the money payment was received.
    pub fn confirm_payment_received(&mut self, caller: PartyId) -> Result<Transition, Violation> {
        let role = self.role_of(caller)?;
        self.expect_mode(PaymentMode::Money)?;
        self.ensure_open()?;
        if role != Role::Worker {
            return Err(Violation::WrongRole(Role::Worker));
        }
        if self.confirmed_by_worker {
            return Err(Violation::AlreadyConfirmed);
        }
        // Receipt is downstream of sending.
        if !self.confirmed_by_employer {
            return Err(Violation::PrematureConfirmation);
        }

        self.confirmed_by_worker = true;
        Ok(self.settle())
    }

    /// Either party attests that the reciprocal exchange took place.
    pub fn confirm_exchange(&mut self, caller: PartyId) -> Result<Transition, Violation> {
        let role = self.role_of(caller)?;
        self.expect_mode(PaymentMode::Barter)?;
        self.ensure_open()?;

        let flag = match role {
            Role::Employer => &mut self.confirmed_by_employer,
            Role::Worker => &mut self.confirmed_by_worker,
        };
        if *flag {
            return Err(Violation::AlreadyConfirmed);
        }

        *flag = true;
        Ok(self.settle())
    }

    /// Routes a generic "confirm" intent to the rule set matching the
    /// caller's role and the payment mode.
    pub fn confirm(&mut self, caller: PartyId) -> Result<Transition, Violation> {
        match (self.mode, self.role_of(caller)?) {
            (PaymentMode::Money, Role::Employer) => self.confirm_payment_sent(caller),
            (PaymentMode::Money, Role::Worker) => self.confirm_payment_received(caller),
            (PaymentMode::Barter, _) => self.confirm_exchange(caller),
        }
    }

    /// Stores a trimmed evidence reference. Flags and state are untouched.
    pub fn attach_evidence(
        &mut self,
        caller: PartyId,
        reference: &str,
        policy: EvidencePolicy,
    ) -> Result<Transition, Violation> {
        self.role_of(caller)?;
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(Violation::InvalidEvidence);
        }
        if policy == EvidencePolicy::FrozenOnCompletion && self.is_completed() {
            return Err(Violation::EvidenceLocked);
        }

        self.evidence_reference = Some(reference.to_string());
        Ok(Transition::EvidenceAttached)
    }

    fn expect_mode(&self, mode: PaymentMode) -> Result<(), Violation> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(Violation::WrongPaymentMode(self.mode))
        }
    }

    fn ensure_open(&self) -> Result<(), Violation> {
        if self.is_completed() {
            Err(Violation::AlreadyCompleted)
        } else {
            Ok(())
        }
    }

    /// Recomputes `state` from the flags. Must run right after every flag
    /// write, inside the same operation.
    fn settle(&mut self) -> Transition {
        self.state = match (self.confirmed_by_employer, self.confirmed_by_worker) {
            (true, true) => TransactionState::Completed,
            (false, false) => TransactionState::Open,
            _ => TransactionState::PartiallyConfirmed,
        };

        if self.is_completed() {
            Transition::Settled
        } else {
            Transition::Recorded
        }
    }
}
