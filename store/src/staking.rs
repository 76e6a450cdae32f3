//! Staking position storage trait.

use crate::StoreError;
use agora_types::{AgentId, Timestamp};
use serde::{Deserialize, Serialize};

/// What aspect of the subject a stake endorses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StakeCategory {
    #[default]
    General,
    Quality,
    Reliability,
    Capability,
    Security,
}

/// Tokens locked by a staker as an economic commitment to a subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    pub staker: AgentId,
    pub subject: AgentId,
    /// Amount staked, smallest currency unit.
    pub amount: u64,
    pub category: StakeCategory,
    pub staked_at: Timestamp,
    pub locked_until: Timestamp,
    /// False once withdrawn.
    pub active: bool,
    pub slashed: bool,
}

impl StakePosition {
    /// Whether this position currently counts toward the subject's backing.
    pub fn counts(&self) -> bool {
        self.active && !self.slashed
    }
}

/// Trait for stake storage. One position per (subject, staker); restaking
/// replaces the previous position.
pub trait StakeStore {
    fn put_stake(&self, position: &StakePosition) -> Result<(), StoreError>;

    fn stakes_for(&self, subject: &AgentId) -> Result<Vec<StakePosition>, StoreError>;
}
