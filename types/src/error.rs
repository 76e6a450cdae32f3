//! Shared parse errors for identifier types.

use thiserror::Error;

/// Failure to parse a text-form identifier.
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid base58 string: {0}")]
    InvalidBase58(String),

    #[error("decoded key has wrong length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
