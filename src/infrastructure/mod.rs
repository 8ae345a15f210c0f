pub mod in_memory;
pub mod listener;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
