//! Reputation score storage trait.

use crate::StoreError;
use agora_types::{AgentId, Timestamp, Trend};
use serde::{Deserialize, Serialize};

/// The six weighted component scores, each 0–100.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub trust: u8,
    pub quality: u8,
    pub reliability: u8,
    pub economic: u8,
    pub social: u8,
    pub staking: u8,
}

/// Vote and review tallies captured at calculation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteStats {
    pub total_votes: u32,
    pub positive_votes: u32,
    pub negative_votes: u32,
    pub total_reviews: u32,
    /// Mean merchant-review rating, tenths of a star (0–50).
    pub avg_review_rating: u8,
}

/// One retained (time, overall) point, used for the 7d/30d deltas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub at: Timestamp,
    pub overall: u16,
}

/// A subject's materialized reputation.
///
/// Always a deterministic function of the signal stores at calculation
/// time — recalculation overwrites it wholesale; nothing mutates it
/// field-by-field from outside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationScore {
    pub subject: AgentId,
    pub components: ComponentScores,
    /// Weighted component sum × 10, range 0–1000.
    pub overall: u16,
    pub trend: Trend,
    pub score_change_7d: i32,
    pub score_change_30d: i32,
    pub stats: VoteStats,
    /// Overall score before inactivity decay.
    pub base_score: u16,
    /// Last qualifying event (vote, payment, attestation, stake change).
    pub last_activity: Timestamp,
    pub last_calculated_at: Timestamp,
    pub next_calculation_at: Timestamp,
    /// Bounded ring of past (time, overall) points, oldest first.
    pub history: Vec<ScoreSnapshot>,
}

/// Trait for score storage operations.
pub trait ScoreStore {
    fn get_score(&self, subject: &AgentId) -> Result<Option<ReputationScore>, StoreError>;

    /// Upsert keyed by subject. Idempotent: writing the same record twice
    /// leaves the store in the same state.
    fn put_score(&self, score: &ReputationScore) -> Result<(), StoreError>;

    fn iter_scores(&self) -> Result<Vec<ReputationScore>, StoreError>;

    fn score_count(&self) -> Result<u64, StoreError>;

    /// The `limit` highest-scored subjects, best first.
    fn top_subjects(&self, limit: usize) -> Result<Vec<ReputationScore>, StoreError> {
        let mut all = self.iter_scores()?;
        all.sort_by(|a, b| b.overall.cmp(&a.overall));
        all.truncate(limit);
        Ok(all)
    }
}
