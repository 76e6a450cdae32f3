//! Rolling endpoint counters and the derived trust score.

use std::sync::Arc;

use agora_store::{EndpointStore, EndpointTrustRecord, ScoreStore};
use agora_types::{AgentId, EndpointId, ReputationParams, Timestamp};

use crate::error::EndpointError;
use crate::tier::tier_for;

/// EWMA factor for the latency consistency score.
const CONSISTENCY_KEEP: f64 = 0.95;

/// One observed call against an endpoint.
#[derive(Clone, Copy, Debug)]
pub struct CallOutcome {
    pub success: bool,
    pub latency_ms: u64,
    /// Price charged for this call, smallest currency unit.
    pub price: u64,
    pub at: Timestamp,
}

/// The endpoint scorer over endpoint and reputation storage.
pub struct EndpointScorer<S> {
    store: Arc<S>,
    params: ReputationParams,
}

impl<S: EndpointStore + ScoreStore> EndpointScorer<S> {
    pub fn new(store: Arc<S>, params: ReputationParams) -> Self {
        Self { store, params }
    }

    /// Fold one call outcome into the endpoint's record, recompute the
    /// trust score and tier, and persist.
    pub fn record_call(
        &self,
        endpoint: &EndpointId,
        owner: &AgentId,
        outcome: CallOutcome,
    ) -> Result<EndpointTrustRecord, EndpointError> {
        let mut record = self
            .store
            .get_endpoint(endpoint)?
            .unwrap_or_else(|| EndpointTrustRecord::new(endpoint.clone(), *owner));

        // Consistency reacts to deviation from the rolling average, so
        // update it before the average moves.
        if record.total_calls > 0 {
            let deviation = (outcome.latency_ms as f64 - record.avg_response_time_ms).abs();
            let sample = 100.0 - (deviation / 10.0).min(100.0);
            record.consistency_score =
                CONSISTENCY_KEEP * record.consistency_score + (1.0 - CONSISTENCY_KEEP) * sample;
        }

        record.total_calls += 1;
        if outcome.success {
            record.successful_calls += 1;
            record.consecutive_failures = 0;
        } else {
            record.failed_calls += 1;
            record.consecutive_failures += 1;
        }
        let n = record.total_calls as f64;
        record.avg_response_time_ms =
            record.avg_response_time_ms + (outcome.latency_ms as f64 - record.avg_response_time_ms) / n;
        record.total_price += outcome.price as u128;
        record.last_call_at = outcome.at;

        let owner_reputation = self.store.get_score(owner)?.map(|s| s.overall);
        let market_avg = self.market_average_price(endpoint)?;
        record.trust_score = self.trust_score(&record, owner_reputation, market_avg);
        record.tier = tier_for(
            record.total_calls,
            record.success_rate_pct(),
            owner_reputation.unwrap_or(0),
            &self.params,
        );

        self.store.put_endpoint(&record)?;
        tracing::debug!(
            endpoint = %endpoint,
            trust = record.trust_score,
            tier = record.tier.as_str(),
            "endpoint record updated"
        );
        Ok(record)
    }

    pub fn record_for(&self, endpoint: &EndpointId) -> Result<Option<EndpointTrustRecord>, EndpointError> {
        Ok(self.store.get_endpoint(endpoint)?)
    }

    /// Mean per-call price across all other endpoints with traffic.
    /// `None` when this endpoint is alone in the market.
    fn market_average_price(&self, this: &EndpointId) -> Result<Option<f64>, EndpointError> {
        let mut sum = 0.0;
        let mut count = 0u64;
        for record in self.store.iter_endpoints()? {
            if record.endpoint == *this {
                continue;
            }
            if let Some(price) = record.avg_price() {
                sum += price;
                count += 1;
            }
        }
        Ok((count > 0).then(|| sum / count as f64))
    }

    /// Performance 40% + consistency 30% + price fairness 20% +
    /// owner-reputation carry-over 10%.
    fn trust_score(
        &self,
        record: &EndpointTrustRecord,
        owner_reputation: Option<u16>,
        market_avg_price: Option<f64>,
    ) -> f64 {
        let success = record.success_rate_pct();
        let latency_term = 100.0 - (record.avg_response_time_ms / 20.0).min(100.0);
        let uptime_term = 100.0 - (record.consecutive_failures as f64 * 10.0).min(100.0);
        let performance = success * 0.5 + latency_term * 0.3 + uptime_term * 0.2;

        // Overpricing is penalized in proportion to the premium; pricing at
        // or below market carries no penalty.
        let fairness = match (record.avg_price(), market_avg_price) {
            (Some(price), Some(market)) if market > 0.0 && price > market => {
                100.0 - ((price - market) / market * 100.0).min(100.0)
            }
            _ => 100.0,
        };

        // A subject with no reputation record yet carries a neutral 50.
        let reputation_term = owner_reputation.map(|r| r as f64 / 10.0).unwrap_or(50.0);

        (performance * 0.40 + record.consistency_score * 0.30 + fairness * 0.20
            + reputation_term * 0.10)
            .clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_store::MemoryStore;
    use agora_types::VerificationTier;

    fn test_agent(n: u8) -> AgentId {
        AgentId::new([n; 32])
    }

    fn scorer() -> (Arc<MemoryStore>, EndpointScorer<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let scorer = EndpointScorer::new(store.clone(), ReputationParams::standard());
        (store, scorer)
    }

    fn ok_call(latency_ms: u64, price: u64) -> CallOutcome {
        CallOutcome {
            success: true,
            latency_ms,
            price,
            at: Timestamp::new(1_000),
        }
    }

    #[test]
    fn test_counters_accumulate() {
        let (_, scorer) = scorer();
        let endpoint = EndpointId::new("api.example/v1/chat");
        let owner = test_agent(1);

        scorer.record_call(&endpoint, &owner, ok_call(100, 10)).unwrap();
        scorer
            .record_call(
                &endpoint,
                &owner,
                CallOutcome {
                    success: false,
                    latency_ms: 300,
                    price: 10,
                    at: Timestamp::new(1_001),
                },
            )
            .unwrap();
        let record = scorer.record_for(&endpoint).unwrap().unwrap();

        assert_eq!(record.total_calls, 2);
        assert_eq!(record.successful_calls, 1);
        assert_eq!(record.failed_calls, 1);
        assert_eq!(record.consecutive_failures, 1);
        assert!((record.avg_response_time_ms - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_consistency_drops_on_jittery_latency() {
        let (_, scorer) = scorer();
        let endpoint = EndpointId::new("jittery");
        let owner = test_agent(1);

        scorer.record_call(&endpoint, &owner, ok_call(100, 1)).unwrap();
        let steady = scorer
            .record_call(&endpoint, &owner, ok_call(100, 1))
            .unwrap()
            .consistency_score;

        let endpoint2 = EndpointId::new("steady-then-spike");
        scorer.record_call(&endpoint2, &owner, ok_call(100, 1)).unwrap();
        let spiky = scorer
            .record_call(&endpoint2, &owner, ok_call(2_000, 1))
            .unwrap()
            .consistency_score;

        assert!(spiky < steady);
    }

    #[test]
    fn test_overpricing_lowers_trust() {
        let (_, scorer) = scorer();
        let owner = test_agent(1);
        let market = EndpointId::new("market");
        let fair = EndpointId::new("fair");
        let pricey = EndpointId::new("pricey");

        // Establish a market price of 100 per call.
        for _ in 0..10 {
            scorer.record_call(&market, &owner, ok_call(100, 100)).unwrap();
        }
        for _ in 0..10 {
            scorer.record_call(&fair, &owner, ok_call(100, 100)).unwrap();
        }
        for _ in 0..10 {
            scorer.record_call(&pricey, &owner, ok_call(100, 190)).unwrap();
        }

        let fair_score = scorer.record_for(&fair).unwrap().unwrap().trust_score;
        let pricey_score = scorer.record_for(&pricey).unwrap().unwrap().trust_score;
        assert!(pricey_score < fair_score);
    }

    #[test]
    fn test_underpricing_is_not_penalized() {
        let (_, scorer) = scorer();
        let owner = test_agent(1);
        let market = EndpointId::new("market");
        let cheap = EndpointId::new("cheap");

        for _ in 0..10 {
            scorer.record_call(&market, &owner, ok_call(100, 100)).unwrap();
        }
        for _ in 0..10 {
            scorer.record_call(&cheap, &owner, ok_call(100, 10)).unwrap();
        }
        let cheap_record = scorer.record_for(&cheap).unwrap().unwrap();
        let market_record = scorer.record_for(&market).unwrap().unwrap();

        assert!(cheap_record.trust_score >= market_record.trust_score - 1e-9);
    }

    #[test]
    fn test_tier_promotion_with_volume() {
        let (_, scorer) = scorer();
        let endpoint = EndpointId::new("busy");
        let owner = test_agent(1);

        for _ in 0..10 {
            scorer.record_call(&endpoint, &owner, ok_call(100, 1)).unwrap();
        }
        let record = scorer.record_for(&endpoint).unwrap().unwrap();
        assert_eq!(record.tier, VerificationTier::Tested);

        for _ in 0..90 {
            scorer.record_call(&endpoint, &owner, ok_call(100, 1)).unwrap();
        }
        let record = scorer.record_for(&endpoint).unwrap().unwrap();
        assert_eq!(record.tier, VerificationTier::Verified);
    }
}
