//! Inactivity decay — stale reputations lose weight over time.
//!
//! Applied read-side: the stored `base_score` stays untouched and the
//! effective value is derived on demand, so decay needs no writes and no
//! scheduled mutation.

use agora_store::ReputationScore;
use agora_types::{ReputationParams, Timestamp};

const SECS_PER_DAY: u64 = 86_400;

/// The subject's overall score with inactivity decay applied.
///
/// No decay inside the grace period; afterwards the score halves once per
/// elapsed half-life, floored at `decay_floor` and capped at ten halvings.
pub fn effective_score(score: &ReputationScore, now: Timestamp, params: &ReputationParams) -> u16 {
    let days_inactive = score.last_activity.elapsed_since(now) / SECS_PER_DAY;
    if days_inactive <= params.decay_grace_days {
        return score.base_score;
    }
    let half_life = params.decay_half_life_days.max(1);
    let periods = (days_inactive - params.decay_grace_days) / half_life;

    let mut decayed = score.base_score as u32;
    for _ in 0..periods.min(10) {
        decayed /= 2;
    }
    (decayed as u16).max(params.decay_floor)
}
