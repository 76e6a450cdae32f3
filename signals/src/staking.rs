//! Staking collector — economic commitment staked behind a subject.

use std::sync::Arc;

use agora_store::{StakePosition, StakeStore, StoreError};
use agora_types::AgentId;

/// Aggregated staking facts for one subject.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StakingStats {
    /// Sum of active, unslashed stake amounts.
    pub total_staked: u128,
    /// Distinct stakers with at least one counting position.
    pub unique_stakers: u32,
    /// Derived trust bonus 0–100, fed directly into the staking component.
    pub trust_bonus: u8,
}

pub struct StakingCollector<S> {
    store: Arc<S>,
}

impl<S: StakeStore> StakingCollector<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record (or replace) a staker's position behind a subject.
    pub fn record(&self, position: &StakePosition) -> Result<(), StoreError> {
        self.store.put_stake(position)
    }

    pub fn stats_for(&self, subject: &AgentId) -> Result<StakingStats, StoreError> {
        let positions = self.store.stakes_for(subject)?;
        let mut total: u128 = 0;
        let mut stakers = 0u32;
        for position in positions.iter().filter(|p| p.counts()) {
            total = total.saturating_add(position.amount as u128);
            stakers += 1;
        }
        Ok(StakingStats {
            total_staked: total,
            unique_stakers: stakers,
            trust_bonus: trust_bonus(total, stakers),
        })
    }
}

/// Staked value and staker diversity folded into a 0–100 bonus.
///
/// Diversity dominates: many independent stakers say more than one large
/// position. Both terms saturate so no single whale pins the bonus at 100.
fn trust_bonus(total_staked: u128, unique_stakers: u32) -> u8 {
    let diversity = (unique_stakers as u64).saturating_mul(10).min(60);
    let magnitude = if total_staked == 0 {
        0
    } else {
        (total_staked.ilog2() as u64).saturating_mul(2).min(40)
    };
    (diversity + magnitude).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_store::{MemoryStore, StakeCategory};
    use agora_types::Timestamp;

    fn test_agent(n: u8) -> AgentId {
        AgentId::new([n; 32])
    }

    fn position(staker: u8, subject: u8, amount: u64) -> StakePosition {
        StakePosition {
            staker: test_agent(staker),
            subject: test_agent(subject),
            amount,
            category: StakeCategory::General,
            staked_at: Timestamp::new(100),
            locked_until: Timestamp::new(10_000),
            active: true,
            slashed: false,
        }
    }

    #[test]
    fn test_stats_sum_active_positions() {
        let collector = StakingCollector::new(Arc::new(MemoryStore::new()));
        collector.record(&position(1, 9, 1_000)).unwrap();
        collector.record(&position(2, 9, 3_000)).unwrap();

        let stats = collector.stats_for(&test_agent(9)).unwrap();
        assert_eq!(stats.total_staked, 4_000);
        assert_eq!(stats.unique_stakers, 2);
        assert!(stats.trust_bonus > 0);
    }

    #[test]
    fn test_slashed_and_withdrawn_do_not_count() {
        let collector = StakingCollector::new(Arc::new(MemoryStore::new()));
        let mut slashed = position(1, 9, 1_000);
        slashed.slashed = true;
        let mut withdrawn = position(2, 9, 2_000);
        withdrawn.active = false;
        collector.record(&slashed).unwrap();
        collector.record(&withdrawn).unwrap();

        let stats = collector.stats_for(&test_agent(9)).unwrap();
        assert_eq!(stats.total_staked, 0);
        assert_eq!(stats.unique_stakers, 0);
        assert_eq!(stats.trust_bonus, 0);
    }

    #[test]
    fn test_bonus_is_capped_at_100() {
        assert!(trust_bonus(u128::MAX, u32::MAX) <= 100);
    }

    #[test]
    fn test_no_data_is_neutral() {
        let collector = StakingCollector::new(Arc::new(MemoryStore::new()));
        let stats = collector.stats_for(&test_agent(9)).unwrap();
        assert_eq!(stats, StakingStats::default());
    }
}
