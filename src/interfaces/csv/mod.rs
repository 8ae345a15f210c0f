//! CSV adapters: a command stream in, transaction snapshots out.

pub mod command_reader;
pub mod transaction_writer;
