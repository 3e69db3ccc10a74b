//! Session-validation throttling: partition key derivation and the
//! cache-backed failure store.

pub mod context;
pub mod store;

pub use context::PartitionKeyBuilder;
pub use store::CacheThrottlingStore;
