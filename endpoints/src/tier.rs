//! Verification tier assignment.

use agora_types::{ReputationParams, VerificationTier};

/// Assign the tier for an endpoint from its volume, success rate, and the
/// owning agent's overall reputation (0–1000).
///
/// Thresholds are monotonically stricter at each tier; the top two tiers
/// additionally require a minimum owner reputation.
pub fn tier_for(
    total_calls: u64,
    success_rate_pct: f64,
    owner_reputation: u16,
    params: &ReputationParams,
) -> VerificationTier {
    let calls = &params.tier_min_calls;
    let success = &params.tier_min_success_pct;
    let reputation = &params.tier_min_reputation;

    if total_calls >= calls[3]
        && success_rate_pct >= success[3] as f64
        && owner_reputation >= reputation[1]
    {
        VerificationTier::Certified
    } else if total_calls >= calls[2]
        && success_rate_pct >= success[2] as f64
        && owner_reputation >= reputation[0]
    {
        VerificationTier::Trusted
    } else if total_calls >= calls[1] && success_rate_pct >= success[1] as f64 {
        VerificationTier::Verified
    } else if total_calls >= calls[0] && success_rate_pct >= success[0] as f64 {
        VerificationTier::Tested
    } else {
        VerificationTier::Unverified
    }
}
