//! Integration tests exercising the full payment-to-score pipeline:
//! raw transaction → decode → receipt → peer vote → recalculation →
//! LMDB persistence → readback.
//!
//! These tests wire together components that are normally only connected
//! inside the daemon, verifying the system works end-to-end — not just
//! in isolation.

use std::collections::HashMap;
use std::sync::Arc;

use agora_decoder::{decode_transaction, wire::write_compact_u16};
use agora_registry::{derive_receipt_id, ReceiptRegistry, RegistryError, VoteEngine, VoteRequest};
use agora_reputation::Aggregator;
use agora_store::{ReceiptStore, VoteStore};
use agora_store_lmdb::{LmdbEnvironment, LmdbStore};
use agora_types::{
    AgentId, ContentType, QualityScores, ReputationParams, Timestamp, TokenCatalog, VoteType,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn temp_store() -> (tempfile::TempDir, Arc<LmdbStore>) {
    let dir = tempfile::tempdir().expect("temp dir");
    let env = LmdbEnvironment::open(dir.path()).expect("open env");
    (dir, Arc::new(LmdbStore::new(env)))
}

fn agent(n: u8) -> AgentId {
    AgentId::new([n; 32])
}

/// Encode a legacy signed transaction carrying one transfer-checked
/// instruction of `amount` from `payer` to `recipient`.
fn encode_payment(payer: AgentId, recipient: AgentId, amount: u64, sig_seed: u8) -> Vec<u8> {
    let token_program = TokenCatalog::mainnet().token_programs[0];
    let keys = [payer, agent(200), recipient, token_program];

    let mut buf = Vec::new();
    write_compact_u16(&mut buf, 1);
    buf.extend_from_slice(&[sig_seed; 64]);
    buf.extend_from_slice(&[1, 0, 1]); // header
    write_compact_u16(&mut buf, keys.len() as u16);
    for key in &keys {
        buf.extend_from_slice(key.as_bytes());
    }
    buf.extend_from_slice(&[9u8; 32]); // blockhash
    write_compact_u16(&mut buf, 1); // one instruction
    buf.push(3); // program index
    write_compact_u16(&mut buf, 4);
    buf.extend_from_slice(&[0, 1, 2, 0]); // source, mint, destination, authority
    let mut data = vec![12u8];
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(6);
    write_compact_u16(&mut buf, data.len() as u16);
    buf.extend_from_slice(&data);
    buf
}

fn good_scores() -> QualityScores {
    QualityScores {
        response_quality: 95,
        response_speed: 88,
        accuracy: 92,
        professionalism: 90,
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[test]
fn full_pipeline_from_raw_transaction_to_score() {
    let (_dir, store) = temp_store();
    let catalog = TokenCatalog::mainnet();
    let params = ReputationParams::standard();

    // A pays B 100_000 micro-units.
    let payer = agent(1);
    let recipient = agent(2);
    let raw = encode_payment(payer, recipient, 100_000, 42);
    let fact =
        decode_transaction(&raw, &HashMap::new(), &catalog, Timestamp::new(1_000)).unwrap();
    assert_eq!(fact.payer, payer);
    assert_eq!(fact.recipient, recipient);
    assert_eq!(fact.amount, 100_000);

    // Either party may create the receipt; duplicate delivery is a no-op.
    let registry = ReceiptRegistry::new(store.clone());
    let id = registry
        .create_receipt(&fact, ContentType::Chat, &payer)
        .unwrap();
    let replay = registry
        .create_receipt(&fact, ContentType::Chat, &recipient)
        .unwrap();
    assert_eq!(id, replay);
    assert_eq!(store.receipt_count().unwrap(), 1);
    assert!(!registry.get(&id).unwrap().vote_cast);

    // A upvotes B within the window.
    let engine = VoteEngine::new(store.clone(), store.clone(), params.clone());
    let vote = engine
        .cast_vote(
            VoteRequest {
                receipt: id,
                voter: payer,
                voted_agent: recipient,
                vote_type: VoteType::Upvote,
                quality_scores: good_scores(),
                comment_hash: [7u8; 32],
            },
            Timestamp::new(5_000),
        )
        .unwrap();
    assert_eq!(vote.vote_weight, 100);
    assert!(registry.get(&id).unwrap().vote_cast);

    // B's attempt to reuse the receipt is rejected with a typed error.
    let err = engine
        .cast_vote(
            VoteRequest {
                receipt: id,
                voter: recipient,
                voted_agent: payer,
                vote_type: VoteType::Upvote,
                quality_scores: good_scores(),
                comment_hash: [0u8; 32],
            },
            Timestamp::new(5_100),
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::ReceiptAlreadyUsed));
    assert_eq!(store.vote_count().unwrap(), 1);

    // Recalculation sees the vote and the payment volume.
    let aggregator = Aggregator::new(store.clone(), params);
    let score = aggregator
        .recalculate_at(&recipient, Timestamp::new(10_000))
        .unwrap();
    assert!(score.components.trust > 50);
    assert_eq!(score.stats.total_votes, 1);
    assert_eq!(score.stats.positive_votes, 1);
    assert!(score.components.economic > 0);
}

#[test]
fn receipt_identity_is_stable_across_backends() {
    // The derived identity must not depend on which backend stores it.
    let (_dir, lmdb) = temp_store();
    let memory = Arc::new(agora_store::MemoryStore::new());
    let catalog = TokenCatalog::mainnet();

    let raw = encode_payment(agent(1), agent(2), 5_000, 9);
    let fact =
        decode_transaction(&raw, &HashMap::new(), &catalog, Timestamp::new(1_000)).unwrap();

    let id_lmdb = ReceiptRegistry::new(lmdb)
        .create_receipt(&fact, ContentType::Data, &agent(1))
        .unwrap();
    let id_memory = ReceiptRegistry::new(memory)
        .create_receipt(&fact, ContentType::Data, &agent(1))
        .unwrap();

    assert_eq!(id_lmdb, id_memory);
    assert_eq!(
        id_lmdb,
        derive_receipt_id(&fact.payer, &fact.recipient, &fact.signature_hash)
    );
}

#[test]
fn expired_window_rejects_vote_but_keeps_receipt() {
    let (_dir, store) = temp_store();
    let params = ReputationParams::standard();
    let catalog = TokenCatalog::mainnet();

    let raw = encode_payment(agent(1), agent(2), 1_000, 5);
    let created = Timestamp::new(1_000);
    let fact = decode_transaction(&raw, &HashMap::new(), &catalog, created).unwrap();
    let registry = ReceiptRegistry::new(store.clone());
    let id = registry
        .create_receipt(&fact, ContentType::Compute, &agent(2))
        .unwrap();

    let engine = VoteEngine::new(store.clone(), store.clone(), params.clone());
    let too_late = Timestamp::new(created.as_secs() + params.voting_window_secs + 1);
    let err = engine
        .cast_vote(
            VoteRequest {
                receipt: id,
                voter: agent(1),
                voted_agent: agent(2),
                vote_type: VoteType::Downvote,
                quality_scores: good_scores(),
                comment_hash: [0u8; 32],
            },
            too_late,
        )
        .unwrap_err();

    assert!(matches!(err, RegistryError::VotingWindowExpired));
    // The receipt survives unconsumed in the audit trail.
    assert!(!registry.get(&id).unwrap().vote_cast);
}

#[test]
fn bidirectional_trust_needs_two_payments() {
    let (_dir, store) = temp_store();
    let catalog = TokenCatalog::mainnet();
    let params = ReputationParams::standard();
    let registry = ReceiptRegistry::new(store.clone());
    let engine = VoteEngine::new(store.clone(), store.clone(), params);

    // A pays B, then B pays A — two distinct receipts.
    let fact_ab = decode_transaction(
        &encode_payment(agent(1), agent(2), 1_000, 1),
        &HashMap::new(),
        &catalog,
        Timestamp::new(1_000),
    )
    .unwrap();
    let fact_ba = decode_transaction(
        &encode_payment(agent(2), agent(1), 2_000, 2),
        &HashMap::new(),
        &catalog,
        Timestamp::new(1_010),
    )
    .unwrap();
    let id_ab = registry
        .create_receipt(&fact_ab, ContentType::Chat, &agent(1))
        .unwrap();
    let id_ba = registry
        .create_receipt(&fact_ba, ContentType::Chat, &agent(2))
        .unwrap();
    assert_ne!(id_ab, id_ba);

    // Each party votes once on their own receipt.
    engine
        .cast_vote(
            VoteRequest {
                receipt: id_ab,
                voter: agent(1),
                voted_agent: agent(2),
                vote_type: VoteType::Upvote,
                quality_scores: good_scores(),
                comment_hash: [0u8; 32],
            },
            Timestamp::new(2_000),
        )
        .unwrap();
    engine
        .cast_vote(
            VoteRequest {
                receipt: id_ba,
                voter: agent(2),
                voted_agent: agent(1),
                vote_type: VoteType::Upvote,
                quality_scores: good_scores(),
                comment_hash: [0u8; 32],
            },
            Timestamp::new(2_010),
        )
        .unwrap();

    assert_eq!(store.vote_count().unwrap(), 2);
    assert_eq!(store.votes_for_agent(&agent(1)).unwrap().len(), 1);
    assert_eq!(store.votes_for_agent(&agent(2)).unwrap().len(), 1);
}
