use agora_store::StoreError;
use thiserror::Error;

/// Failures surfaced by the aggregator.
///
/// All of these are transient infrastructure errors: recalculation is a
/// pure re-derivation, so callers retry safely.
#[derive(Debug, Error)]
pub enum ReputationError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
