//! Application layer containing the settlement orchestration.
//!
//! This module defines the `SettlementEngine`, the entry point for every
//! confirmation and evidence operation. It serializes writers per transaction
//! with `tokio` mutexes so read-check-write sequences never interleave.

pub mod command;
pub mod engine;
