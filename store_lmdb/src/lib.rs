//! LMDB storage backend for the Agora reputation core.
//!
//! Implements all storage traits from `agora-store` using the `heed` LMDB
//! bindings. Each logical store maps to one or more LMDB databases within a
//! single environment; the concurrency-critical operations
//! (`insert_if_absent`, `mark_voted`, `merge_bucket`) each run inside one
//! write transaction, which LMDB serialises, closing the race window at the
//! storage layer.

pub mod environment;
pub mod error;
pub mod store;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use store::LmdbStore;
