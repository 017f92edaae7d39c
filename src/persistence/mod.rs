//! The `persistence` module carries messages from the ingestion side into
//! durable storage and reports the outcome back.
//!
//! The queued path ([`PersistenceService`]) hands every message to a storage
//! worker running in its own execution context, so a slow or crashing storage
//! backend never stalls ingestion. The direct path ([`DirectService`]) writes
//! in the caller's context and exists for tests and embedded use; both paths
//! satisfy the same [`PersistencePort`] contract.
//!
//! Durable storage itself is `sled`, an embedded key-value store, behind the
//! [`StorageBackend`] trait so tests can substitute an in-memory store.

pub mod backend;
pub mod direct;
pub mod failure;
pub mod port;
pub mod service;
pub mod sled_store;
pub mod worker;

pub use backend::{MemoryStore, StorageBackend};
pub use direct::DirectService;
pub use failure::DelayedFailure;
pub use port::PersistencePort;
pub use service::PersistenceService;
pub use sled_store::SledStore;
pub use worker::WorkItem;

#[cfg(test)]
mod tests;
