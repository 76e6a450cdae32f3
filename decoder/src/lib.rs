//! Transaction decoder — extracts verifiable payment facts from raw signed
//! ledger transactions.
//!
//! The decoder is pure: given the same byte buffer and lookup tables it
//! always produces the same fact, touches no shared state, and never
//! suspends. Callers impose their own timeouts.

pub mod error;
pub mod fact;
pub mod message;
pub mod wire;

pub use error::DecodeError;
pub use fact::{decode_transaction, TransactionFact};
pub use message::{Instruction, TableLookup, TransactionEnvelope};
