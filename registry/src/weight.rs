//! Vote weight curve — payment size to vote weight, in centi-x.
//!
//! Policy: a minimal qualifying payment carries the floor weight (1.0×) and
//! each doubling of the amount above the baseline adds a fixed step, so
//! weight grows logarithmically and saturates at the cap. Monotonicity and
//! the cap are invariants; the coefficients are tunable.

use agora_types::ReputationParams;

/// Weight in centi-x (100 = 1.0×) for a payment of `amount` smallest units.
pub fn weight_for_amount(amount: u64, params: &ReputationParams) -> u16 {
    let base = params.vote_weight_base_amount.max(1);
    if amount <= base {
        return params.vote_weight_floor;
    }
    let doublings = (amount / base).ilog2() as u16;
    params
        .vote_weight_floor
        .saturating_add(doublings.saturating_mul(params.vote_weight_step))
        .min(params.vote_weight_cap)
}
