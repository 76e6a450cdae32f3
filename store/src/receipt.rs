//! Transaction receipt storage trait.

use crate::StoreError;
use agora_types::{AgentId, ContentType, ReceiptId, SignatureHash, Timestamp};
use serde::{Deserialize, Serialize};

/// Immutable proof that a specific payment occurred between two parties.
///
/// Identity is derived from `(payer, recipient, signature_hash)`; exactly
/// one receipt may ever exist per identity. `vote_cast` flips to true at
/// most once and never back. Receipts are never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub payer: AgentId,
    pub recipient: AgentId,
    pub signature_hash: SignatureHash,
    /// Payment amount in the smallest currency unit.
    pub amount: u64,
    pub content_type: ContentType,
    pub created_at: Timestamp,
    /// Whether a vote has been cast using this receipt.
    pub vote_cast: bool,
}

/// Outcome of the atomic compare-and-set on `vote_cast`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkVotedOutcome {
    /// This caller won the flip; the receipt is now consumed.
    Marked,
    /// The flag was already set — some earlier caller consumed the receipt.
    AlreadyVoted,
}

/// All-time payment totals for a recipient, read by the economic score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptStats {
    pub count: u64,
    pub volume: u128,
}

/// Trait for receipt storage operations.
pub trait ReceiptStore {
    /// Atomically insert the receipt unless one already exists at `id`.
    ///
    /// Returns `true` if this call materialized the receipt, `false` if an
    /// earlier call already had. Must be race-free under concurrent callers:
    /// at most one receipt is ever stored per id regardless of interleaving.
    fn insert_if_absent(
        &self,
        id: &ReceiptId,
        receipt: &TransactionReceipt,
    ) -> Result<bool, StoreError>;

    fn get_receipt(&self, id: &ReceiptId) -> Result<Option<TransactionReceipt>, StoreError>;

    fn receipt_exists(&self, id: &ReceiptId) -> Result<bool, StoreError>;

    /// Atomic compare-and-set on `vote_cast`. Exactly one of any set of
    /// concurrent callers observes `Marked`; the rest observe `AlreadyVoted`.
    /// `NotFound` if no receipt exists at `id`.
    fn mark_voted(&self, id: &ReceiptId) -> Result<MarkVotedOutcome, StoreError>;

    fn receipt_count(&self) -> Result<u64, StoreError>;

    /// All-time count and volume of payments received by `recipient`.
    fn stats_for_recipient(&self, recipient: &AgentId) -> Result<ReceiptStats, StoreError>;
}
