use crate::application::command::Command;
use crate::domain::transaction::{AgreementId, PartyId, PaymentMode, TransactionId};
use crate::error::{Result, SettlementError};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
enum Operation {
    Open,
    Confirm,
    ConfirmSent,
    ConfirmReceived,
    ConfirmExchange,
    AttachEvidence,
}

/// One CSV row. Columns that an operation does not use are left empty.
#[derive(Debug, Deserialize)]
struct CommandRecord {
    op: Operation,
    tx: TransactionId,
    caller: Option<PartyId>,
    mode: Option<PaymentMode>,
    employer: Option<PartyId>,
    worker: Option<PartyId>,
    agreement: Option<AgreementId>,
    reference: Option<String>,
}

fn missing(column: &str, op: Operation, tx: TransactionId) -> SettlementError {
    SettlementError::MalformedCommand(format!("{op:?} on tx {tx} requires `{column}`"))
}

impl CommandRecord {
    fn caller(&self) -> Result<PartyId> {
        self.caller.ok_or_else(|| missing("caller", self.op, self.tx))
    }

    fn into_command(self) -> Result<Command> {
        let tx = self.tx;
        let command = match self.op {
            Operation::Open => Command::Open {
                tx,
                agreement: self.agreement.unwrap_or(tx),
                mode: self.mode.ok_or_else(|| missing("mode", self.op, tx))?,
                employer: self
                    .employer
                    .ok_or_else(|| missing("employer", self.op, tx))?,
                worker: self
                    .worker
                    .ok_or_else(|| missing("worker", self.op, tx))?,
            },
            Operation::Confirm => Command::Confirm {
                tx,
                caller: self.caller()?,
            },
            Operation::ConfirmSent => Command::ConfirmPaymentSent {
                tx,
                caller: self.caller()?,
            },
            Operation::ConfirmReceived => Command::ConfirmPaymentReceived {
                tx,
                caller: self.caller()?,
            },
            Operation::ConfirmExchange => Command::ConfirmExchange {
                tx,
                caller: self.caller()?,
            },
            // An empty reference is passed through so the engine reports it
            // as invalid evidence against the transaction.
            Operation::AttachEvidence => Command::AttachEvidence {
                tx,
                caller: self.caller()?,
                reference: self.reference.unwrap_or_default(),
            },
        };
        Ok(command)
    }
}

/// Reads settlement commands from a CSV source.
///
/// Expected header: `op, tx, caller, mode, employer, worker, agreement, reference`.
/// Whitespace is trimmed and short records are accepted, so trailing empty
/// columns may be omitted.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and converts commands.
    ///
    /// A bad row yields an error for that row only; iteration continues.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader.into_deserialize().map(|result| {
            let record: CommandRecord = result?;
            record.into_command()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "op, tx, caller, mode, employer, worker, agreement, reference\n";

    fn read(rows: &str) -> Vec<Result<Command>> {
        let data = format!("{HEADER}{rows}");
        CommandReader::new(data.as_bytes()).commands().collect()
    }

    #[test]
    fn test_reader_valid_stream() {
        let results = read(
            "open, 1, , money, 10, 20, 100,\n\
             confirm-sent, 1, 10\n\
             attach-evidence, 1, 20, , , , , https://example.com/receipt.png\n",
        );

        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().unwrap(),
            &Command::Open {
                tx: 1,
                agreement: 100,
                mode: PaymentMode::Money,
                employer: 10,
                worker: 20,
            }
        );
        assert_eq!(
            results[1].as_ref().unwrap(),
            &Command::ConfirmPaymentSent { tx: 1, caller: 10 }
        );
        assert_eq!(
            results[2].as_ref().unwrap(),
            &Command::AttachEvidence {
                tx: 1,
                caller: 20,
                reference: "https://example.com/receipt.png".to_string(),
            }
        );
    }

    #[test]
    fn test_open_defaults_agreement_to_tx() {
        let results = read("open, 4, , barter, 1, 2\n");
        assert!(matches!(
            results[0],
            Ok(Command::Open { agreement: 4, mode: PaymentMode::Barter, .. })
        ));
    }

    #[test]
    fn test_empty_evidence_passes_through() {
        let results = read("attach-evidence, 1, 20\n");
        assert!(matches!(
            &results[0],
            Ok(Command::AttachEvidence { reference, .. }) if reference.is_empty()
        ));
    }

    #[test]
    fn test_reader_malformed_lines() {
        let results = read(
            "settle, 1, 10\n\
             confirm, 1\n\
             open, 2, , money, 10\n\
             confirm, x, 10\n\
             confirm-exchange, 3, 20\n",
        );

        assert_eq!(results.len(), 5);
        assert!(matches!(results[0], Err(SettlementError::CsvError(_))));
        assert!(matches!(results[1], Err(SettlementError::MalformedCommand(_))));
        assert!(matches!(results[2], Err(SettlementError::MalformedCommand(_))));
        assert!(matches!(results[3], Err(SettlementError::CsvError(_))));
        assert!(matches!(
            results[4],
            Ok(Command::ConfirmExchange { tx: 3, caller: 20 })
        ));
    }
}
