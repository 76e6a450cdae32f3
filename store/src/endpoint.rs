//! Endpoint trust record storage trait.

use crate::StoreError;
use agora_types::{AgentId, EndpointId, Timestamp, VerificationTier};
use serde::{Deserialize, Serialize};

/// Rolling per-endpoint counters and the derived trust score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndpointTrustRecord {
    pub endpoint: EndpointId,
    /// The agent operating this endpoint.
    pub owner: AgentId,
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    /// Current run of failures; resets on any success.
    pub consecutive_failures: u64,
    /// Moving average response time in milliseconds.
    pub avg_response_time_ms: f64,
    /// Exponentially-smoothed latency consistency, 0–100.
    pub consistency_score: f64,
    /// Sum of per-call prices, smallest currency unit.
    pub total_price: u128,
    /// Derived 0–100 trust score.
    pub trust_score: f64,
    pub tier: VerificationTier,
    pub last_call_at: Timestamp,
}

impl EndpointTrustRecord {
    /// Fresh record for an endpoint with no calls yet.
    pub fn new(endpoint: EndpointId, owner: AgentId) -> Self {
        Self {
            endpoint,
            owner,
            total_calls: 0,
            successful_calls: 0,
            failed_calls: 0,
            consecutive_failures: 0,
            avg_response_time_ms: 0.0,
            consistency_score: 100.0,
            total_price: 0,
            trust_score: 0.0,
            tier: VerificationTier::Unverified,
            last_call_at: Timestamp::EPOCH,
        }
    }

    /// Success rate in percent; 0 when no calls have been made.
    pub fn success_rate_pct(&self) -> f64 {
        if self.total_calls == 0 {
            return 0.0;
        }
        self.successful_calls as f64 / self.total_calls as f64 * 100.0
    }

    /// Average price per call; `None` when no calls have been made.
    pub fn avg_price(&self) -> Option<f64> {
        if self.total_calls == 0 {
            return None;
        }
        Some(self.total_price as f64 / self.total_calls as f64)
    }
}

/// Trait for endpoint record storage.
pub trait EndpointStore {
    fn get_endpoint(&self, id: &EndpointId) -> Result<Option<EndpointTrustRecord>, StoreError>;

    fn put_endpoint(&self, record: &EndpointTrustRecord) -> Result<(), StoreError>;

    fn iter_endpoints(&self) -> Result<Vec<EndpointTrustRecord>, StoreError>;
}
