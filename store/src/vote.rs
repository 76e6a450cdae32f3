//! Peer vote storage trait.

use crate::StoreError;
use agora_types::{AgentId, QualityScores, ReceiptId, Timestamp, VoteType};
use serde::{Deserialize, Serialize};

/// A quality rating cast by one transacting party about the other.
///
/// At most one vote exists per receipt — the registry enforces this via the
/// receipt's `vote_cast` flag, and the store keys votes by receipt id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerVote {
    pub voter: AgentId,
    pub voted_agent: AgentId,
    pub vote_type: VoteType,
    pub quality_scores: QualityScores,
    /// Digest of the free-text comment; the text itself lives off-core.
    pub comment_hash: [u8; 32],
    /// Vote weight in centi-x (100 = 1.0×), derived from the payment amount.
    pub vote_weight: u16,
    pub cast_at: Timestamp,
    /// The receipt this vote consumed.
    pub receipt: ReceiptId,
}

/// Trait for vote storage operations.
pub trait VoteStore {
    /// Persist a vote, keyed by its receipt id.
    fn insert_vote(&self, vote: &PeerVote) -> Result<(), StoreError>;

    fn get_vote(&self, receipt: &ReceiptId) -> Result<Option<PeerVote>, StoreError>;

    /// All votes cast about `agent`.
    fn votes_for_agent(&self, agent: &AgentId) -> Result<Vec<PeerVote>, StoreError>;

    /// All votes cast by `voter`.
    fn votes_by_voter(&self, voter: &AgentId) -> Result<Vec<PeerVote>, StoreError>;

    fn vote_count(&self) -> Result<u64, StoreError>;
}
