//! Reputation policy parameters — every tunable constant in one place.
//!
//! Monotonicity of the vote-weight curve and its upper cap are binding
//! invariants; the specific coefficients here are operator policy.

use serde::{Deserialize, Serialize};

/// All policy parameters read by the registry, aggregator, and scorer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReputationParams {
    // ── Voting ───────────────────────────────────────────────────────────
    /// Window after receipt creation during which a vote may be cast.
    /// Default: 30 days.
    pub voting_window_secs: u64,

    /// Minimum vote weight in centi-x (100 = 1.0×). A minimal qualifying
    /// payment always carries at least this weight.
    pub vote_weight_floor: u16,

    /// Maximum vote weight in centi-x. Bounds whale influence.
    pub vote_weight_cap: u16,

    /// Payment amount (smallest currency unit) treated as the 1.0× baseline.
    /// Each doubling above this adds `vote_weight_step` centi-x.
    pub vote_weight_base_amount: u64,

    /// Centi-x added per doubling of the payment amount above the baseline.
    pub vote_weight_step: u16,

    // ── Aggregation ──────────────────────────────────────────────────────
    /// Signal lookback window for rate-style inputs, in hours. Default: 30 days.
    pub signal_window_hours: u64,

    /// Component weights in basis points; must sum to 10_000.
    /// Order: trust, quality, reliability, economic, social, staking.
    pub component_weights_bps: [u32; 6],

    /// Overall-score delta beyond which the trend flips to Rising/Falling.
    pub trend_threshold: i32,

    /// Trust bonus added per active attestation (points, capped at 100 total).
    pub attestation_trust_bonus: u8,

    /// Number of (timestamp, overall) history snapshots retained per subject
    /// for the 7d/30d deltas.
    pub score_history_len: usize,

    /// Interval between periodic full recalculation sweeps, in seconds.
    pub recalc_sweep_secs: u64,

    // ── Decay ────────────────────────────────────────────────────────────
    /// Days of inactivity after which the score starts halving.
    pub decay_half_life_days: u64,

    /// Grace period before any decay applies, in days.
    pub decay_grace_days: u64,

    /// Score floor that decay never goes below (0–1000 scale).
    pub decay_floor: u16,

    // ── Endpoint tiers ───────────────────────────────────────────────────
    /// Minimum call volume per tier: Tested, Verified, Trusted, Certified.
    pub tier_min_calls: [u64; 4],

    /// Minimum success rate (percent) per tier, same order.
    pub tier_min_success_pct: [u8; 4],

    /// Minimum owner reputation (0–1000) for the Trusted and Certified tiers.
    pub tier_min_reputation: [u16; 2],
}

impl ReputationParams {
    /// Production defaults.
    pub fn standard() -> Self {
        Self {
            voting_window_secs: 30 * 24 * 3600,
            vote_weight_floor: 100,
            vote_weight_cap: 400,
            vote_weight_base_amount: 100_000,
            vote_weight_step: 25,

            signal_window_hours: 30 * 24,
            component_weights_bps: [2000, 2000, 1500, 1500, 1500, 1500],
            trend_threshold: 10,
            attestation_trust_bonus: 2,
            score_history_len: 120,
            recalc_sweep_secs: 3600,

            decay_half_life_days: 90,
            decay_grace_days: 30,
            decay_floor: 100,

            tier_min_calls: [10, 100, 500, 2000],
            tier_min_success_pct: [50, 80, 90, 95],
            tier_min_reputation: [500, 750],
        }
    }

    /// Fast timelines for integration tests and local development.
    pub fn dev_defaults() -> Self {
        Self {
            voting_window_secs: 3600,
            recalc_sweep_secs: 10,
            ..Self::standard()
        }
    }
}

impl Default for ReputationParams {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_weights_sum_to_one() {
        let params = ReputationParams::standard();
        let total: u32 = params.component_weights_bps.iter().sum();
        assert_eq!(total, 10_000);
    }

    #[test]
    fn test_weight_floor_below_cap() {
        let params = ReputationParams::standard();
        assert!(params.vote_weight_floor < params.vote_weight_cap);
    }
}
