//! Thread-safe in-memory backend for testing.
//!
//! Each logical store is a mutexed map; holding the map's mutex for the
//! whole read-modify-write makes `insert_if_absent` and `mark_voted`
//! genuinely atomic, matching the LMDB backend's single-writer semantics.

use std::collections::HashMap;
use std::sync::Mutex;

use agora_types::{AgentId, EndpointId, ReceiptId};

use crate::attestation::{Attestation, AttestationStore};
use crate::endpoint::{EndpointStore, EndpointTrustRecord};
use crate::receipt::{MarkVotedOutcome, ReceiptStats, ReceiptStore, TransactionReceipt};
use crate::review::{MerchantReview, ReviewStore};
use crate::score::{ReputationScore, ScoreStore};
use crate::staking::{StakePosition, StakeStore};
use crate::telemetry::{CallStatsBucket, TelemetryStore};
use crate::vote::{PeerVote, VoteStore};
use crate::StoreError;

/// An in-memory implementation of every storage trait.
#[derive(Default)]
pub struct MemoryStore {
    receipts: Mutex<HashMap<[u8; 32], TransactionReceipt>>,
    votes: Mutex<HashMap<[u8; 32], PeerVote>>,
    scores: Mutex<HashMap<[u8; 32], ReputationScore>>,
    attestations: Mutex<HashMap<([u8; 32], [u8; 32], u8), Attestation>>,
    stakes: Mutex<HashMap<([u8; 32], [u8; 32]), StakePosition>>,
    telemetry: Mutex<HashMap<([u8; 32], u64), CallStatsBucket>>,
    reviews: Mutex<HashMap<([u8; 32], [u8; 32]), MerchantReview>>,
    endpoints: Mutex<HashMap<String, EndpointTrustRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn kind_tag(kind: crate::attestation::AttestationKind) -> u8 {
    match kind {
        crate::attestation::AttestationKind::ValidationStamp => 0,
        crate::attestation::AttestationKind::Endorsement => 1,
        crate::attestation::AttestationKind::Credential => 2,
    }
}

impl ReceiptStore for MemoryStore {
    fn insert_if_absent(
        &self,
        id: &ReceiptId,
        receipt: &TransactionReceipt,
    ) -> Result<bool, StoreError> {
        let mut map = self.receipts.lock().unwrap();
        if map.contains_key(id.as_bytes()) {
            return Ok(false);
        }
        map.insert(*id.as_bytes(), receipt.clone());
        Ok(true)
    }

    fn get_receipt(&self, id: &ReceiptId) -> Result<Option<TransactionReceipt>, StoreError> {
        Ok(self.receipts.lock().unwrap().get(id.as_bytes()).cloned())
    }

    fn receipt_exists(&self, id: &ReceiptId) -> Result<bool, StoreError> {
        Ok(self.receipts.lock().unwrap().contains_key(id.as_bytes()))
    }

    fn mark_voted(&self, id: &ReceiptId) -> Result<MarkVotedOutcome, StoreError> {
        let mut map = self.receipts.lock().unwrap();
        let receipt = map
            .get_mut(id.as_bytes())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if receipt.vote_cast {
            Ok(MarkVotedOutcome::AlreadyVoted)
        } else {
            receipt.vote_cast = true;
            Ok(MarkVotedOutcome::Marked)
        }
    }

    fn receipt_count(&self) -> Result<u64, StoreError> {
        Ok(self.receipts.lock().unwrap().len() as u64)
    }

    fn stats_for_recipient(&self, recipient: &AgentId) -> Result<ReceiptStats, StoreError> {
        let map = self.receipts.lock().unwrap();
        let mut stats = ReceiptStats::default();
        for receipt in map.values() {
            if &receipt.recipient == recipient {
                stats.count += 1;
                stats.volume += receipt.amount as u128;
            }
        }
        Ok(stats)
    }
}

impl VoteStore for MemoryStore {
    fn insert_vote(&self, vote: &PeerVote) -> Result<(), StoreError> {
        self.votes
            .lock()
            .unwrap()
            .insert(*vote.receipt.as_bytes(), vote.clone());
        Ok(())
    }

    fn get_vote(&self, receipt: &ReceiptId) -> Result<Option<PeerVote>, StoreError> {
        Ok(self.votes.lock().unwrap().get(receipt.as_bytes()).cloned())
    }

    fn votes_for_agent(&self, agent: &AgentId) -> Result<Vec<PeerVote>, StoreError> {
        Ok(self
            .votes
            .lock()
            .unwrap()
            .values()
            .filter(|v| &v.voted_agent == agent)
            .cloned()
            .collect())
    }

    fn votes_by_voter(&self, voter: &AgentId) -> Result<Vec<PeerVote>, StoreError> {
        Ok(self
            .votes
            .lock()
            .unwrap()
            .values()
            .filter(|v| &v.voter == voter)
            .cloned()
            .collect())
    }

    fn vote_count(&self) -> Result<u64, StoreError> {
        Ok(self.votes.lock().unwrap().len() as u64)
    }
}

impl ScoreStore for MemoryStore {
    fn get_score(&self, subject: &AgentId) -> Result<Option<ReputationScore>, StoreError> {
        Ok(self.scores.lock().unwrap().get(subject.as_bytes()).cloned())
    }

    fn put_score(&self, score: &ReputationScore) -> Result<(), StoreError> {
        self.scores
            .lock()
            .unwrap()
            .insert(*score.subject.as_bytes(), score.clone());
        Ok(())
    }

    fn iter_scores(&self) -> Result<Vec<ReputationScore>, StoreError> {
        Ok(self.scores.lock().unwrap().values().cloned().collect())
    }

    fn score_count(&self) -> Result<u64, StoreError> {
        Ok(self.scores.lock().unwrap().len() as u64)
    }
}

impl AttestationStore for MemoryStore {
    fn put_attestation(&self, attestation: &Attestation) -> Result<(), StoreError> {
        let key = (
            *attestation.subject.as_bytes(),
            *attestation.issuer.as_bytes(),
            kind_tag(attestation.kind),
        );
        self.attestations
            .lock()
            .unwrap()
            .insert(key, attestation.clone());
        Ok(())
    }

    fn attestations_for(&self, subject: &AgentId) -> Result<Vec<Attestation>, StoreError> {
        Ok(self
            .attestations
            .lock()
            .unwrap()
            .values()
            .filter(|a| &a.subject == subject)
            .cloned()
            .collect())
    }
}

impl StakeStore for MemoryStore {
    fn put_stake(&self, position: &StakePosition) -> Result<(), StoreError> {
        let key = (*position.subject.as_bytes(), *position.staker.as_bytes());
        self.stakes.lock().unwrap().insert(key, position.clone());
        Ok(())
    }

    fn stakes_for(&self, subject: &AgentId) -> Result<Vec<StakePosition>, StoreError> {
        Ok(self
            .stakes
            .lock()
            .unwrap()
            .values()
            .filter(|s| &s.subject == subject)
            .cloned()
            .collect())
    }
}

impl TelemetryStore for MemoryStore {
    fn merge_bucket(
        &self,
        subject: &AgentId,
        hour: u64,
        delta: &CallStatsBucket,
    ) -> Result<(), StoreError> {
        let mut map = self.telemetry.lock().unwrap();
        map.entry((*subject.as_bytes(), hour))
            .or_default()
            .merge(delta);
        Ok(())
    }

    fn buckets_for(
        &self,
        subject: &AgentId,
        from_hour: u64,
        to_hour: u64,
    ) -> Result<Vec<CallStatsBucket>, StoreError> {
        let map = self.telemetry.lock().unwrap();
        Ok(map
            .iter()
            .filter(|((s, h), _)| s == subject.as_bytes() && *h >= from_hour && *h < to_hour)
            .map(|(_, bucket)| *bucket)
            .collect())
    }
}

impl ReviewStore for MemoryStore {
    fn put_review(&self, review: &MerchantReview) -> Result<(), StoreError> {
        let key = (*review.subject.as_bytes(), *review.reviewer.as_bytes());
        self.reviews.lock().unwrap().insert(key, review.clone());
        Ok(())
    }

    fn reviews_for(&self, subject: &AgentId) -> Result<Vec<MerchantReview>, StoreError> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .values()
            .filter(|r| &r.subject == subject)
            .cloned()
            .collect())
    }
}

impl EndpointStore for MemoryStore {
    fn get_endpoint(&self, id: &EndpointId) -> Result<Option<EndpointTrustRecord>, StoreError> {
        Ok(self.endpoints.lock().unwrap().get(id.as_str()).cloned())
    }

    fn put_endpoint(&self, record: &EndpointTrustRecord) -> Result<(), StoreError> {
        self.endpoints
            .lock()
            .unwrap()
            .insert(record.endpoint.as_str().to_string(), record.clone());
        Ok(())
    }

    fn iter_endpoints(&self) -> Result<Vec<EndpointTrustRecord>, StoreError> {
        Ok(self.endpoints.lock().unwrap().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::{ContentType, SignatureHash, Timestamp};

    fn test_agent(n: u8) -> AgentId {
        AgentId::new([n; 32])
    }

    fn test_receipt(payer: u8, recipient: u8) -> TransactionReceipt {
        TransactionReceipt {
            payer: test_agent(payer),
            recipient: test_agent(recipient),
            signature_hash: SignatureHash::new([3u8; 32]),
            amount: 100_000,
            content_type: ContentType::Chat,
            created_at: Timestamp::new(1000),
            vote_cast: false,
        }
    }

    #[test]
    fn test_insert_if_absent_is_idempotent() {
        let store = MemoryStore::new();
        let id = ReceiptId::new([1u8; 32]);
        let receipt = test_receipt(1, 2);

        assert!(store.insert_if_absent(&id, &receipt).unwrap());
        assert!(!store.insert_if_absent(&id, &receipt).unwrap());
        assert_eq!(store.receipt_count().unwrap(), 1);
    }

    #[test]
    fn test_mark_voted_cas() {
        let store = MemoryStore::new();
        let id = ReceiptId::new([1u8; 32]);
        store.insert_if_absent(&id, &test_receipt(1, 2)).unwrap();

        assert_eq!(store.mark_voted(&id).unwrap(), MarkVotedOutcome::Marked);
        assert_eq!(
            store.mark_voted(&id).unwrap(),
            MarkVotedOutcome::AlreadyVoted
        );
        assert!(store.get_receipt(&id).unwrap().unwrap().vote_cast);
    }

    #[test]
    fn test_mark_voted_missing_receipt() {
        let store = MemoryStore::new();
        let id = ReceiptId::new([9u8; 32]);
        assert!(matches!(
            store.mark_voted(&id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_recipient_stats_accumulate() {
        let store = MemoryStore::new();
        let mut r1 = test_receipt(1, 2);
        r1.amount = 500;
        let mut r2 = test_receipt(3, 2);
        r2.amount = 700;
        store
            .insert_if_absent(&ReceiptId::new([1u8; 32]), &r1)
            .unwrap();
        store
            .insert_if_absent(&ReceiptId::new([2u8; 32]), &r2)
            .unwrap();

        let stats = store.stats_for_recipient(&test_agent(2)).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.volume, 1200);
    }

    #[test]
    fn test_telemetry_bucket_merge() {
        let store = MemoryStore::new();
        let subject = test_agent(1);
        let delta = CallStatsBucket {
            calls: 1,
            successes: 1,
            errors: 0,
            total_latency_ms: 120,
            up_checks: 0,
            up_ok: 0,
        };
        store.merge_bucket(&subject, 10, &delta).unwrap();
        store.merge_bucket(&subject, 10, &delta).unwrap();

        let buckets = store.buckets_for(&subject, 0, 20).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].calls, 2);
        assert_eq!(buckets[0].total_latency_ms, 240);
    }
}
