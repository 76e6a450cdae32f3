use thiserror::Error;

/// Why a raw transaction could not be decoded into a payment fact.
///
/// Each variant is a stable identifier surfaced to callers; a transaction
/// that fails here is rejected outright and never partially persisted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer is not a parseable signed transaction, or carries no
    /// signature.
    #[error("malformed transaction: {reason}")]
    MalformedTransaction { reason: String },

    /// The message references an address-lookup table that was not supplied,
    /// or an index past the end of a supplied table.
    #[error("unresolvable accounts: {reason}")]
    UnresolvableAccounts { reason: String },

    /// No transfer-with-amount-check instruction owned by a known token
    /// program — a transaction without a recognizable value transfer cannot
    /// back a vote.
    #[error("no recognizable transfer instruction")]
    NoTransferInstruction,
}

impl DecodeError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedTransaction {
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolvable(reason: impl Into<String>) -> Self {
        Self::UnresolvableAccounts {
            reason: reason.into(),
        }
    }
}
