//! Reputation aggregator — folds votes, attestations, telemetry, reviews,
//! and staked commitment into one multi-dimensional trust score.

pub mod aggregator;
pub mod decay;
pub mod error;
pub mod queue;

pub use aggregator::Aggregator;
pub use decay::effective_score;
pub use error::ReputationError;
pub use queue::{recalc_channel, RecalcQueue, RecalcWorker};
