//! Merchant review collector.

use std::sync::Arc;

use agora_store::{MerchantReview, ReviewStore, StoreError};
use agora_types::AgentId;

/// Aggregated review facts for one subject.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReviewStats {
    pub count: u32,
    /// Mean rating in tenths of a star, 0–50. Zero when no reviews exist.
    pub avg_rating: u8,
}

pub struct ReviewCollector<S> {
    store: Arc<S>,
}

impl<S: ReviewStore> ReviewCollector<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record a review. A reviewer's newer review replaces their older one.
    pub fn record(&self, review: &MerchantReview) -> Result<(), StoreError> {
        self.store.put_review(review)
    }

    pub fn stats_for(&self, subject: &AgentId) -> Result<ReviewStats, StoreError> {
        let reviews = self.store.reviews_for(subject)?;
        if reviews.is_empty() {
            return Ok(ReviewStats::default());
        }
        let sum: u32 = reviews.iter().map(|r| r.rating as u32).sum();
        Ok(ReviewStats {
            count: reviews.len() as u32,
            avg_rating: (sum / reviews.len() as u32) as u8,
        })
    }
}
