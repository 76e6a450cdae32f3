//! Score aggregation — the materialized-view recomputation.
//!
//! `recalculate` always re-derives the full record from current signal
//! state, so redundant or reordered triggers converge to the same value.

use std::sync::Arc;

use agora_signals::{
    AttestationCollector, ReviewCollector, StakingCollector, TelemetryCollector,
};
use agora_store::{
    AttestationStore, ComponentScores, ReceiptStore, ReputationScore, ReviewStore, ScoreSnapshot,
    ScoreStore, StakeStore, TelemetryStore, VoteStore,
};
use agora_types::{AgentId, ReputationParams, Timestamp, Trend};

use crate::error::ReputationError;

const SECS_PER_DAY: u64 = 86_400;

/// The aggregator over a backend implementing every signal-store trait.
pub struct Aggregator<S> {
    store: Arc<S>,
    attestations: AttestationCollector<S>,
    staking: StakingCollector<S>,
    telemetry: TelemetryCollector<S>,
    reviews: ReviewCollector<S>,
    params: ReputationParams,
}

impl<S> Aggregator<S>
where
    S: VoteStore
        + ReceiptStore
        + AttestationStore
        + StakeStore
        + TelemetryStore
        + ReviewStore
        + ScoreStore,
{
    pub fn new(store: Arc<S>, params: ReputationParams) -> Self {
        Self {
            attestations: AttestationCollector::new(store.clone()),
            staking: StakingCollector::new(store.clone()),
            telemetry: TelemetryCollector::new(store.clone()),
            reviews: ReviewCollector::new(store.clone()),
            store,
            params,
        }
    }

    /// Recalculate at the current wall-clock time.
    pub fn recalculate(&self, subject: &AgentId) -> Result<ReputationScore, ReputationError> {
        self.recalculate_at(subject, Timestamp::now())
    }

    /// Recalculate against an explicit `now` (deterministic; used by tests
    /// and the sweep).
    pub fn recalculate_at(
        &self,
        subject: &AgentId,
        now: Timestamp,
    ) -> Result<ReputationScore, ReputationError> {
        let votes = self.store.votes_for_agent(subject)?;
        let attest = self.attestations.stats_for(subject, now)?;
        let stake = self.staking.stats_for(subject)?;
        let tele = self
            .telemetry
            .stats_for(subject, now, self.params.signal_window_hours)?;
        let reviews = self.reviews.stats_for(subject)?;
        let receipts = self.store.stats_for_recipient(subject)?;
        let previous = self.store.get_score(subject)?;

        let total_votes = votes.len() as u32;
        let positive_votes = votes.iter().filter(|v| v.vote_type.is_positive()).count() as u32;
        let negative_votes = total_votes - positive_votes;

        // ── Components ──────────────────────────────────────────────────
        let trust = {
            let base = if total_votes > 0 {
                positive_votes as f64 / total_votes as f64 * 100.0
            } else {
                50.0
            };
            let with_attest = (base
                + attest.active as f64 * self.params.attestation_trust_bonus as f64)
                .min(100.0);
            (with_attest + (stake.trust_bonus as f64 / 10.0).min(10.0)).min(100.0)
        };

        let quality = tele.uptime_pct * 0.40
            + (100.0 - tele.error_rate_pct) * 0.30
            + tele.success_ratio_pct * 0.30;

        let reliability = tele.uptime_pct * 0.60 + tele.success_ratio_pct * 0.40;

        let economic = {
            let volume_term = (log2(receipts.volume + 1) * 2.5).min(40.0);
            let count_term = ((receipts.count as f64).sqrt() * 4.0).min(40.0);
            let stake_bonus = (log2(stake.total_staked + 1) * 3.0).min(20.0);
            (volume_term + count_term + stake_bonus).min(100.0)
        };

        let social = {
            let base = (total_votes as f64 * 5.0
                + attest.active as f64 * 4.0
                + attest.endorsements as f64 * 3.0)
                .min(80.0);
            let diversity = (stake.unique_stakers as f64 * 2.0).min(20.0);
            (base + diversity).min(100.0)
        };

        let staking_component = stake.trust_bonus as f64;

        let components = ComponentScores {
            trust: trust.round() as u8,
            quality: quality.round() as u8,
            reliability: reliability.round() as u8,
            economic: economic.round() as u8,
            social: social.round() as u8,
            staking: staking_component.round() as u8,
        };

        // ── Overall + trend ─────────────────────────────────────────────
        let weights = &self.params.component_weights_bps;
        let weighted = [
            components.trust,
            components.quality,
            components.reliability,
            components.economic,
            components.social,
            components.staking,
        ]
        .iter()
        .zip(weights.iter())
        .map(|(score, bps)| *score as f64 * *bps as f64 / 10_000.0)
        .sum::<f64>();
        let overall = (weighted * 10.0).round().clamp(0.0, 1000.0) as u16;

        let prev_overall = previous.as_ref().map(|p| p.overall);
        let score_change_7d = match prev_overall {
            Some(old) => overall as i32 - old as i32,
            None => 0,
        };
        let trend = match score_change_7d {
            change if change > self.params.trend_threshold => Trend::Rising,
            change if change < -self.params.trend_threshold => Trend::Falling,
            _ => Trend::Stable,
        };

        let mut history = previous
            .as_ref()
            .map(|p| p.history.clone())
            .unwrap_or_default();
        let score_change_30d = {
            let cutoff = Timestamp::new(now.as_secs().saturating_sub(30 * SECS_PER_DAY));
            let anchor = history
                .iter()
                .rev()
                .find(|s| s.at <= cutoff)
                .or_else(|| history.first());
            match anchor {
                Some(snapshot) => overall as i32 - snapshot.overall as i32,
                None => 0,
            }
        };
        // One snapshot per calculation instant — a redundant recalculation
        // at the same second must reproduce the record byte for byte.
        match history.last_mut() {
            Some(last) if last.at == now => last.overall = overall,
            _ => history.push(ScoreSnapshot { at: now, overall }),
        }
        if history.len() > self.params.score_history_len {
            let drop = history.len() - self.params.score_history_len;
            history.drain(..drop);
        }

        // Activity resets the decay clock; otherwise it carries forward.
        let last_vote = votes.iter().map(|v| v.cast_at).max();
        let mut last_activity = previous
            .as_ref()
            .map(|p| p.last_activity)
            .unwrap_or(Timestamp::EPOCH);
        if let Some(at) = last_vote {
            last_activity = last_activity.max(at);
        }
        if tele.window_calls > 0 {
            last_activity = last_activity.max(now);
        }

        let score = ReputationScore {
            subject: *subject,
            components,
            overall,
            trend,
            score_change_7d,
            score_change_30d,
            stats: agora_store::VoteStats {
                total_votes,
                positive_votes,
                negative_votes,
                total_reviews: reviews.count,
                avg_review_rating: reviews.avg_rating,
            },
            base_score: overall,
            last_activity,
            last_calculated_at: now,
            next_calculation_at: now.plus(self.params.recalc_sweep_secs),
            history,
        };

        self.store.put_score(&score)?;
        tracing::debug!(subject = %subject, overall, trend = ?score.trend, "reputation recalculated");
        Ok(score)
    }

    /// Read the stored score, if any.
    pub fn get_score(&self, subject: &AgentId) -> Result<Option<ReputationScore>, ReputationError> {
        Ok(self.store.get_score(subject)?)
    }

    /// The `limit` best subjects by overall score.
    pub fn top_subjects(&self, limit: usize) -> Result<Vec<ReputationScore>, ReputationError> {
        Ok(self.store.top_subjects(limit)?)
    }

    /// Every subject with a stored score (the periodic sweep's work list).
    pub fn known_subjects(&self) -> Result<Vec<AgentId>, ReputationError> {
        Ok(self
            .store
            .iter_scores()?
            .into_iter()
            .map(|s| s.subject)
            .collect())
    }

    /// Recalculate every known subject (the periodic sweep).
    pub fn sweep(&self, now: Timestamp) -> Result<usize, ReputationError> {
        let subjects = self.known_subjects()?;
        let count = subjects.len();
        for subject in subjects {
            self.recalculate_at(&subject, now)?;
        }
        Ok(count)
    }
}

/// log2(x + 1)-style helper over wide integers.
fn log2(value: u128) -> f64 {
    (value as f64).log2().max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_store::{
        Attestation, AttestationKind, MemoryStore, PeerVote, StakeCategory, StakePosition,
        TransactionReceipt,
    };
    use agora_types::{ContentType, QualityScores, ReceiptId, SignatureHash, VoteType};

    fn test_agent(n: u8) -> AgentId {
        AgentId::new([n; 32])
    }

    fn aggregator() -> (Arc<MemoryStore>, Aggregator<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let agg = Aggregator::new(store.clone(), ReputationParams::standard());
        (store, agg)
    }

    fn put_vote(store: &MemoryStore, receipt_tag: u8, voted: u8, vote_type: VoteType) {
        let vote = PeerVote {
            voter: test_agent(1),
            voted_agent: test_agent(voted),
            vote_type,
            quality_scores: QualityScores::default(),
            comment_hash: [0u8; 32],
            vote_weight: 100,
            cast_at: Timestamp::new(5_000),
            receipt: ReceiptId::new([receipt_tag; 32]),
        };
        store.insert_vote(&vote).unwrap();
    }

    fn put_receipt(store: &MemoryStore, tag: u8, recipient: u8, amount: u64) {
        let receipt = TransactionReceipt {
            payer: test_agent(1),
            recipient: test_agent(recipient),
            signature_hash: SignatureHash::new([tag; 32]),
            amount,
            content_type: ContentType::Chat,
            created_at: Timestamp::new(1_000),
            vote_cast: false,
        };
        store
            .insert_if_absent(&ReceiptId::new([tag; 32]), &receipt)
            .unwrap();
    }

    #[test]
    fn test_zero_signal_subject_gets_baseline() {
        let (_, agg) = aggregator();
        let score = agg
            .recalculate_at(&test_agent(9), Timestamp::new(10_000))
            .unwrap();

        assert_eq!(score.components.trust, 50);
        assert_eq!(score.components.quality, 50);
        assert_eq!(score.components.reliability, 50);
        assert_eq!(score.components.economic, 0);
        assert_eq!(score.components.social, 0);
        assert_eq!(score.components.staking, 0);
        // (50·0.20 + 50·0.20 + 50·0.15) × 10
        assert_eq!(score.overall, 275);
        assert_eq!(score.stats.total_votes, 0);
        assert_eq!(score.trend, Trend::Stable);
    }

    #[test]
    fn test_recalculation_is_deterministic() {
        let (store, agg) = aggregator();
        let subject = test_agent(9);
        put_receipt(&store, 1, 9, 100_000);
        put_vote(&store, 1, 9, VoteType::Upvote);

        let now = Timestamp::new(10_000);
        let first = agg.recalculate_at(&subject, now).unwrap();
        let second = agg.recalculate_at(&subject, now).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_votes_move_trust() {
        let (store, agg) = aggregator();
        let subject = test_agent(9);
        put_receipt(&store, 1, 9, 100_000);
        put_vote(&store, 1, 9, VoteType::Upvote);

        let score = agg.recalculate_at(&subject, Timestamp::new(10_000)).unwrap();
        assert!(score.components.trust > 50);
        assert_eq!(score.stats.total_votes, 1);
        assert_eq!(score.stats.positive_votes, 1);

        put_vote(&store, 2, 9, VoteType::Downvote);
        put_vote(&store, 3, 9, VoteType::Downvote);
        let score = agg.recalculate_at(&subject, Timestamp::new(10_100)).unwrap();
        // 1 of 3 positive → trust well below baseline.
        assert!(score.components.trust < 50);
        assert_eq!(score.stats.negative_votes, 2);
    }

    #[test]
    fn test_attestations_add_trust_bonus() {
        let (store, agg) = aggregator();
        let subject = test_agent(9);
        for issuer in 1..=3u8 {
            store
                .put_attestation(&Attestation {
                    issuer: test_agent(issuer),
                    subject,
                    kind: AttestationKind::ValidationStamp,
                    issued_at: Timestamp::new(100),
                    expires_at: None,
                    revoked: false,
                })
                .unwrap();
        }

        let score = agg.recalculate_at(&subject, Timestamp::new(10_000)).unwrap();
        // Baseline 50 + 2 per active attestation.
        assert_eq!(score.components.trust, 56);
    }

    #[test]
    fn test_staking_feeds_components() {
        let (store, agg) = aggregator();
        let subject = test_agent(9);
        for staker in 1..=4u8 {
            store
                .put_stake(&StakePosition {
                    staker: test_agent(staker),
                    subject,
                    amount: 1 << 20,
                    category: StakeCategory::General,
                    staked_at: Timestamp::new(100),
                    locked_until: Timestamp::new(1_000_000),
                    active: true,
                    slashed: false,
                })
                .unwrap();
        }

        let score = agg.recalculate_at(&subject, Timestamp::new(10_000)).unwrap();
        assert!(score.components.staking > 0);
        assert!(score.components.economic > 0);
        assert!(score.components.social > 0);
    }

    #[test]
    fn test_trend_detection() {
        let (store, agg) = aggregator();
        let subject = test_agent(9);

        let first = agg.recalculate_at(&subject, Timestamp::new(10_000)).unwrap();
        assert_eq!(first.trend, Trend::Stable);

        // A burst of upvotes lifts the overall by more than the threshold.
        for tag in 1..=6u8 {
            put_receipt(&store, tag, 9, 1_000_000);
            put_vote(&store, tag, 9, VoteType::Upvote);
        }
        let second = agg.recalculate_at(&subject, Timestamp::new(20_000)).unwrap();
        assert!(second.score_change_7d > 10);
        assert_eq!(second.trend, Trend::Rising);
    }

    #[test]
    fn test_example_scenario() {
        // Payment of 100_000 micro-units A → B, A upvotes within the window.
        let (store, agg) = aggregator();
        put_receipt(&store, 1, 2, 100_000);
        let vote = PeerVote {
            voter: test_agent(1),
            voted_agent: test_agent(2),
            vote_type: VoteType::Upvote,
            quality_scores: QualityScores {
                response_quality: 95,
                response_speed: 88,
                accuracy: 92,
                professionalism: 90,
            },
            comment_hash: [0u8; 32],
            vote_weight: 100,
            cast_at: Timestamp::new(5_000),
            receipt: ReceiptId::new([1u8; 32]),
        };
        store.insert_vote(&vote).unwrap();

        let score = agg
            .recalculate_at(&test_agent(2), Timestamp::new(10_000))
            .unwrap();
        assert!(score.components.trust > 50);
        assert_eq!(score.stats.total_votes, 1);
    }

    #[test]
    fn test_top_subjects_orders_by_overall() {
        let (store, agg) = aggregator();
        // Subject 2 has positive votes, subject 3 has none.
        put_receipt(&store, 1, 2, 100_000);
        put_vote(&store, 1, 2, VoteType::Upvote);
        agg.recalculate_at(&test_agent(2), Timestamp::new(10_000)).unwrap();
        agg.recalculate_at(&test_agent(3), Timestamp::new(10_000)).unwrap();

        let top = agg.top_subjects(2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].subject, test_agent(2));
        assert!(top[0].overall >= top[1].overall);
    }
}
