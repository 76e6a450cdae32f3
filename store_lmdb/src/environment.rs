//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

/// Default map size: 1 GiB. Receipts and votes are small records; this
/// leaves ample headroom before a resize is needed.
const DEFAULT_MAP_SIZE: usize = 1 << 30;

const MAX_DBS: u32 = 12;

/// Wraps the LMDB environment and all database handles.
#[derive(Clone)]
pub struct LmdbEnvironment {
    pub(crate) env: Arc<Env>,
    pub(crate) receipts_db: Database<Bytes, Bytes>,
    /// Index `recipient(32) ++ receipt_id(32)` → amount (8 bytes LE).
    pub(crate) receipt_recipient_db: Database<Bytes, Bytes>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
    /// Index `voted_agent(32) ++ receipt_id(32)` → vote bytes.
    pub(crate) votes_agent_db: Database<Bytes, Bytes>,
    /// Index `voter(32) ++ receipt_id(32)` → vote bytes.
    pub(crate) votes_voter_db: Database<Bytes, Bytes>,
    pub(crate) scores_db: Database<Bytes, Bytes>,
    pub(crate) attestations_db: Database<Bytes, Bytes>,
    pub(crate) stakes_db: Database<Bytes, Bytes>,
    pub(crate) telemetry_db: Database<Bytes, Bytes>,
    pub(crate) reviews_db: Database<Bytes, Bytes>,
    pub(crate) endpoints_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path with the
    /// default map size.
    pub fn open(path: &Path) -> Result<Self, LmdbError> {
        Self::open_with_map_size(path, DEFAULT_MAP_SIZE)
    }

    pub fn open_with_map_size(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("create data dir: {e}")))?;
        // SAFETY: the environment directory is owned by this process and
        // opened once; heed requires the caller to uphold LMDB's
        // single-environment-per-path rule.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let receipts_db = env.create_database(&mut wtxn, Some("receipts"))?;
        let receipt_recipient_db = env.create_database(&mut wtxn, Some("receipt_recipient"))?;
        let votes_db = env.create_database(&mut wtxn, Some("votes"))?;
        let votes_agent_db = env.create_database(&mut wtxn, Some("votes_agent"))?;
        let votes_voter_db = env.create_database(&mut wtxn, Some("votes_voter"))?;
        let scores_db = env.create_database(&mut wtxn, Some("scores"))?;
        let attestations_db = env.create_database(&mut wtxn, Some("attestations"))?;
        let stakes_db = env.create_database(&mut wtxn, Some("stakes"))?;
        let telemetry_db = env.create_database(&mut wtxn, Some("telemetry"))?;
        let reviews_db = env.create_database(&mut wtxn, Some("reviews"))?;
        let endpoints_db = env.create_database(&mut wtxn, Some("endpoints"))?;
        wtxn.commit()?;

        Ok(Self {
            env: Arc::new(env),
            receipts_db,
            receipt_recipient_db,
            votes_db,
            votes_agent_db,
            votes_voter_db,
            scores_db,
            attestations_db,
            stakes_db,
            telemetry_db,
            reviews_db,
            endpoints_db,
        })
    }
}
