use agora_store::StoreError;
use thiserror::Error;

/// Typed rejections from the receipt registry and vote engine.
///
/// Every variant is a stable identifier: downstream services branch on the
/// kind, not the message.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Receipt creator is neither the payer nor the recipient.
    #[error("creator must be either payer or recipient of the transaction")]
    UnauthorizedCreator,

    /// Payer and recipient are the same account.
    #[error("cannot create a receipt for a transaction with yourself")]
    SelfTransaction,

    /// No receipt exists at the given identity.
    #[error("transaction receipt not found")]
    ReceiptNotFound,

    /// A vote has already been cast using this receipt.
    #[error("a vote has already been cast using this receipt")]
    ReceiptAlreadyUsed,

    /// Voter is not a party to the receipt, or the voted agent is not the
    /// counterparty.
    #[error("voter and voted agent must be the two parties of the receipt")]
    UnauthorizedVoter,

    /// The eligibility window measured from receipt creation has passed.
    #[error("voting window has expired")]
    VotingWindowExpired,

    /// A quality sub-score is outside 0–100.
    #[error("quality scores must be between 0 and 100")]
    InvalidQualityScore,

    #[error(transparent)]
    Store(#[from] StoreError),
}
