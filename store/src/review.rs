//! Merchant review storage trait.

use crate::StoreError;
use agora_types::{AgentId, Timestamp};
use serde::{Deserialize, Serialize};

/// A merchant-side review of a subject.
///
/// Ratings use tenth-of-star precision on a 0–5 star scale, stored 0–50.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantReview {
    pub reviewer: AgentId,
    pub subject: AgentId,
    /// 0–50 (tenths of a star).
    pub rating: u8,
    pub comment_hash: [u8; 32],
    pub reviewed_at: Timestamp,
}

/// Trait for review storage. One review per (subject, reviewer); a new
/// review from the same reviewer replaces the old one.
pub trait ReviewStore {
    fn put_review(&self, review: &MerchantReview) -> Result<(), StoreError>;

    fn reviews_for(&self, subject: &AgentId) -> Result<Vec<MerchantReview>, StoreError>;
}
