//! LMDB implementation of every `agora-store` trait.
//!
//! Secondary-index layout follows the composite-key convention: fixed-width
//! key components concatenated so listing all entries for a prefix is a
//! range scan.

use std::ops::Bound;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use agora_store::{
    Attestation, AttestationKind, AttestationStore, CallStatsBucket, EndpointStore,
    EndpointTrustRecord, MarkVotedOutcome, MerchantReview, PeerVote, ReceiptStats, ReceiptStore,
    ReputationScore, ReviewStore, ScoreStore, StakePosition, StakeStore, StoreError,
    TelemetryStore, TransactionReceipt, VoteStore,
};
use agora_types::{AgentId, EndpointId, ReceiptId};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

/// The LMDB-backed store.
#[derive(Clone)]
pub struct LmdbStore {
    env: LmdbEnvironment,
}

impl LmdbStore {
    pub fn new(env: LmdbEnvironment) -> Self {
        Self { env }
    }

    fn raw_env(&self) -> &Env {
        &self.env.env
    }
}

/// Build a 64-byte composite key `prefix(32) ++ suffix(32)`.
fn composite_key(prefix: &[u8; 32], suffix: &[u8; 32]) -> [u8; 64] {
    let mut key = [0u8; 64];
    key[..32].copy_from_slice(prefix);
    key[32..].copy_from_slice(suffix);
    key
}

/// Treat the prefix as a big-endian integer and add one, for use as an
/// exclusive upper bound in range scans.
fn increment_prefix(prefix: &mut Vec<u8>) {
    for byte in prefix.iter_mut().rev() {
        if *byte < 0xff {
            *byte += 1;
            return;
        }
        *byte = 0;
    }
    // All bytes were 0xff — extend so the bound stays above every key.
    prefix.push(0x00);
}

/// Collect all values whose key starts with `prefix`.
fn range_scan_values(
    db: &Database<Bytes, Bytes>,
    rtxn: &RoTxn,
    prefix: &[u8],
) -> Result<Vec<Vec<u8>>, LmdbError> {
    let mut upper = prefix.to_vec();
    increment_prefix(&mut upper);
    let bounds = (Bound::Included(prefix), Bound::Excluded(upper.as_slice()));
    let iter = db.range(rtxn, &bounds)?;
    let mut results = Vec::new();
    for result in iter {
        let (_key, val) = result?;
        results.push(val.to_vec());
    }
    Ok(results)
}

fn decode_all<T: serde::de::DeserializeOwned>(raw: Vec<Vec<u8>>) -> Result<Vec<T>, LmdbError> {
    raw.iter()
        .map(|bytes| bincode::deserialize(bytes).map_err(LmdbError::from))
        .collect()
}

fn kind_tag(kind: AttestationKind) -> u8 {
    match kind {
        AttestationKind::ValidationStamp => 0,
        AttestationKind::Endorsement => 1,
        AttestationKind::Credential => 2,
    }
}

impl ReceiptStore for LmdbStore {
    fn insert_if_absent(
        &self,
        id: &ReceiptId,
        receipt: &TransactionReceipt,
    ) -> Result<bool, StoreError> {
        let mut wtxn = self.raw_env().write_txn().map_err(LmdbError::from)?;
        if self
            .env
            .receipts_db
            .get(&wtxn, id.as_bytes().as_slice())
            .map_err(LmdbError::from)?
            .is_some()
        {
            // Existing receipt wins; the transaction is dropped unchanged.
            return Ok(false);
        }
        let bytes = bincode::serialize(receipt).map_err(LmdbError::from)?;
        self.env
            .receipts_db
            .put(&mut wtxn, id.as_bytes().as_slice(), &bytes)
            .map_err(LmdbError::from)?;
        let index_key = composite_key(receipt.recipient.as_bytes(), id.as_bytes());
        self.env
            .receipt_recipient_db
            .put(&mut wtxn, &index_key[..], &receipt.amount.to_le_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }

    fn get_receipt(&self, id: &ReceiptId) -> Result<Option<TransactionReceipt>, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let val = self
            .env
            .receipts_db
            .get(&rtxn, id.as_bytes().as_slice())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(
                bincode::deserialize(bytes).map_err(LmdbError::from)?,
            )),
            None => Ok(None),
        }
    }

    fn receipt_exists(&self, id: &ReceiptId) -> Result<bool, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        Ok(self
            .env
            .receipts_db
            .get(&rtxn, id.as_bytes().as_slice())
            .map_err(LmdbError::from)?
            .is_some())
    }

    fn mark_voted(&self, id: &ReceiptId) -> Result<MarkVotedOutcome, StoreError> {
        // Read-check-write inside one write transaction; LMDB serialises
        // writers, so exactly one concurrent caller can win the flip.
        let mut wtxn = self.raw_env().write_txn().map_err(LmdbError::from)?;
        let bytes = self
            .env
            .receipts_db
            .get(&wtxn, id.as_bytes().as_slice())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("receipt {id}")))?;
        let mut receipt: TransactionReceipt =
            bincode::deserialize(bytes).map_err(LmdbError::from)?;
        if receipt.vote_cast {
            return Ok(MarkVotedOutcome::AlreadyVoted);
        }
        receipt.vote_cast = true;
        let updated = bincode::serialize(&receipt).map_err(LmdbError::from)?;
        self.env
            .receipts_db
            .put(&mut wtxn, id.as_bytes().as_slice(), &updated)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(MarkVotedOutcome::Marked)
    }

    fn receipt_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        Ok(self.env.receipts_db.len(&rtxn).map_err(LmdbError::from)?)
    }

    fn stats_for_recipient(&self, recipient: &AgentId) -> Result<ReceiptStats, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let amounts = range_scan_values(
            &self.env.receipt_recipient_db,
            &rtxn,
            recipient.as_bytes(),
        )
        .map_err(StoreError::from)?;
        let mut stats = ReceiptStats::default();
        for bytes in amounts {
            let arr: [u8; 8] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| StoreError::Corruption("receipt index amount width".into()))?;
            stats.count += 1;
            stats.volume += u64::from_le_bytes(arr) as u128;
        }
        Ok(stats)
    }
}

impl VoteStore for LmdbStore {
    fn insert_vote(&self, vote: &PeerVote) -> Result<(), StoreError> {
        let bytes = bincode::serialize(vote).map_err(LmdbError::from)?;
        let mut wtxn = self.raw_env().write_txn().map_err(LmdbError::from)?;
        self.env
            .votes_db
            .put(&mut wtxn, vote.receipt.as_bytes().as_slice(), &bytes)
            .map_err(LmdbError::from)?;
        let agent_key = composite_key(vote.voted_agent.as_bytes(), vote.receipt.as_bytes());
        self.env
            .votes_agent_db
            .put(&mut wtxn, &agent_key[..], &bytes)
            .map_err(LmdbError::from)?;
        let voter_key = composite_key(vote.voter.as_bytes(), vote.receipt.as_bytes());
        self.env
            .votes_voter_db
            .put(&mut wtxn, &voter_key[..], &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_vote(&self, receipt: &ReceiptId) -> Result<Option<PeerVote>, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let val = self
            .env
            .votes_db
            .get(&rtxn, receipt.as_bytes().as_slice())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(
                bincode::deserialize(bytes).map_err(LmdbError::from)?,
            )),
            None => Ok(None),
        }
    }

    fn votes_for_agent(&self, agent: &AgentId) -> Result<Vec<PeerVote>, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let raw = range_scan_values(&self.env.votes_agent_db, &rtxn, agent.as_bytes())
            .map_err(StoreError::from)?;
        Ok(decode_all(raw).map_err(StoreError::from)?)
    }

    fn votes_by_voter(&self, voter: &AgentId) -> Result<Vec<PeerVote>, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let raw = range_scan_values(&self.env.votes_voter_db, &rtxn, voter.as_bytes())
            .map_err(StoreError::from)?;
        Ok(decode_all(raw).map_err(StoreError::from)?)
    }

    fn vote_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        Ok(self.env.votes_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}

impl ScoreStore for LmdbStore {
    fn get_score(&self, subject: &AgentId) -> Result<Option<ReputationScore>, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let val = self
            .env
            .scores_db
            .get(&rtxn, subject.as_bytes().as_slice())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(
                bincode::deserialize(bytes).map_err(LmdbError::from)?,
            )),
            None => Ok(None),
        }
    }

    fn put_score(&self, score: &ReputationScore) -> Result<(), StoreError> {
        let bytes = bincode::serialize(score).map_err(LmdbError::from)?;
        let mut wtxn = self.raw_env().write_txn().map_err(LmdbError::from)?;
        self.env
            .scores_db
            .put(&mut wtxn, score.subject.as_bytes().as_slice(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_scores(&self) -> Result<Vec<ReputationScore>, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let iter = self.env.scores_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            results.push(bincode::deserialize(val).map_err(LmdbError::from)?);
        }
        Ok(results)
    }

    fn score_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        Ok(self.env.scores_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}

impl AttestationStore for LmdbStore {
    fn put_attestation(&self, attestation: &Attestation) -> Result<(), StoreError> {
        let mut key = Vec::with_capacity(65);
        key.extend_from_slice(attestation.subject.as_bytes());
        key.extend_from_slice(attestation.issuer.as_bytes());
        key.push(kind_tag(attestation.kind));
        let bytes = bincode::serialize(attestation).map_err(LmdbError::from)?;
        let mut wtxn = self.raw_env().write_txn().map_err(LmdbError::from)?;
        self.env
            .attestations_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn attestations_for(&self, subject: &AgentId) -> Result<Vec<Attestation>, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let raw = range_scan_values(&self.env.attestations_db, &rtxn, subject.as_bytes())
            .map_err(StoreError::from)?;
        Ok(decode_all(raw).map_err(StoreError::from)?)
    }
}

impl StakeStore for LmdbStore {
    fn put_stake(&self, position: &StakePosition) -> Result<(), StoreError> {
        let key = composite_key(position.subject.as_bytes(), position.staker.as_bytes());
        let bytes = bincode::serialize(position).map_err(LmdbError::from)?;
        let mut wtxn = self.raw_env().write_txn().map_err(LmdbError::from)?;
        self.env
            .stakes_db
            .put(&mut wtxn, &key[..], &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn stakes_for(&self, subject: &AgentId) -> Result<Vec<StakePosition>, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let raw = range_scan_values(&self.env.stakes_db, &rtxn, subject.as_bytes())
            .map_err(StoreError::from)?;
        Ok(decode_all(raw).map_err(StoreError::from)?)
    }
}

impl TelemetryStore for LmdbStore {
    fn merge_bucket(
        &self,
        subject: &AgentId,
        hour: u64,
        delta: &CallStatsBucket,
    ) -> Result<(), StoreError> {
        // Hours are big-endian so buckets sort chronologically per subject.
        let mut key = Vec::with_capacity(40);
        key.extend_from_slice(subject.as_bytes());
        key.extend_from_slice(&hour.to_be_bytes());

        let mut wtxn = self.raw_env().write_txn().map_err(LmdbError::from)?;
        let mut bucket: CallStatsBucket = match self
            .env
            .telemetry_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => bincode::deserialize(bytes).map_err(LmdbError::from)?,
            None => CallStatsBucket::default(),
        };
        bucket.merge(delta);
        let bytes = bincode::serialize(&bucket).map_err(LmdbError::from)?;
        self.env
            .telemetry_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn buckets_for(
        &self,
        subject: &AgentId,
        from_hour: u64,
        to_hour: u64,
    ) -> Result<Vec<CallStatsBucket>, StoreError> {
        let mut lower = Vec::with_capacity(40);
        lower.extend_from_slice(subject.as_bytes());
        lower.extend_from_slice(&from_hour.to_be_bytes());
        let mut upper = Vec::with_capacity(40);
        upper.extend_from_slice(subject.as_bytes());
        upper.extend_from_slice(&to_hour.to_be_bytes());

        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let bounds = (
            Bound::Included(lower.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );
        let iter = self
            .env
            .telemetry_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            results.push(bincode::deserialize(val).map_err(LmdbError::from)?);
        }
        Ok(results)
    }
}

impl ReviewStore for LmdbStore {
    fn put_review(&self, review: &MerchantReview) -> Result<(), StoreError> {
        let key = composite_key(review.subject.as_bytes(), review.reviewer.as_bytes());
        let bytes = bincode::serialize(review).map_err(LmdbError::from)?;
        let mut wtxn = self.raw_env().write_txn().map_err(LmdbError::from)?;
        self.env
            .reviews_db
            .put(&mut wtxn, &key[..], &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn reviews_for(&self, subject: &AgentId) -> Result<Vec<MerchantReview>, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let raw = range_scan_values(&self.env.reviews_db, &rtxn, subject.as_bytes())
            .map_err(StoreError::from)?;
        Ok(decode_all(raw).map_err(StoreError::from)?)
    }
}

impl EndpointStore for LmdbStore {
    fn get_endpoint(&self, id: &EndpointId) -> Result<Option<EndpointTrustRecord>, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let val = self
            .env
            .endpoints_db
            .get(&rtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(
                bincode::deserialize(bytes).map_err(LmdbError::from)?,
            )),
            None => Ok(None),
        }
    }

    fn put_endpoint(&self, record: &EndpointTrustRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        let mut wtxn = self.raw_env().write_txn().map_err(LmdbError::from)?;
        self.env
            .endpoints_db
            .put(&mut wtxn, record.endpoint.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_endpoints(&self) -> Result<Vec<EndpointTrustRecord>, StoreError> {
        let rtxn = self.raw_env().read_txn().map_err(LmdbError::from)?;
        let iter = self.env.endpoints_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            results.push(bincode::deserialize(val).map_err(LmdbError::from)?);
        }
        Ok(results)
    }
}
