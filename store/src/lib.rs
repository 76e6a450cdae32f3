//! Abstract storage traits for the Agora reputation core.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.
//!
//! The two concurrency-critical primitives — atomic insert-if-absent for
//! receipts and compare-and-set for the `vote_cast` flag — are part of the
//! trait contract: implementations must close the race window internally,
//! never rely on caller-side check-then-act.

pub mod attestation;
pub mod endpoint;
pub mod error;
pub mod memory;
pub mod receipt;
pub mod review;
pub mod score;
pub mod staking;
pub mod telemetry;
pub mod vote;

pub use attestation::{Attestation, AttestationKind, AttestationStore};
pub use endpoint::{EndpointStore, EndpointTrustRecord};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use receipt::{MarkVotedOutcome, ReceiptStats, ReceiptStore, TransactionReceipt};
pub use review::{MerchantReview, ReviewStore};
pub use score::{ComponentScores, ReputationScore, ScoreSnapshot, ScoreStore, VoteStats};
pub use staking::{StakeCategory, StakePosition, StakeStore};
pub use telemetry::{CallStatsBucket, TelemetryStore};
pub use vote::{PeerVote, VoteStore};
