//! Receipt registry and peer vote engine.
//!
//! Turns each unique decoded payment into exactly one immutable, voteable
//! receipt, and lets the two transacting parties cast a single weighted
//! quality vote against it within a bounded window.

pub mod error;
pub mod receipt;
pub mod vote;
pub mod weight;

pub use error::RegistryError;
pub use receipt::{derive_receipt_id, ReceiptRegistry};
pub use vote::{RecalcSink, VoteEngine, VoteRequest};
pub use weight::weight_for_amount;
