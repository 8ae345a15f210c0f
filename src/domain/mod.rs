//! Domain layer: the transaction entity, its transition rules and the ports
//! the engine depends on.

pub mod ports;
pub mod transaction;
