//! Signal collectors — bounded, timestamped fact stores the aggregator reads.
//!
//! Each collector exposes `stats_for(subject, …)`; absence of data yields a
//! neutral default, never an error. Collectors are append-mostly and safe
//! for concurrent readers.

pub mod attestation;
pub mod review;
pub mod staking;
pub mod telemetry;

pub use attestation::{AttestationCollector, AttestationStats};
pub use review::{ReviewCollector, ReviewStats};
pub use staking::{StakingCollector, StakingStats};
pub use telemetry::{TelemetryCollector, TelemetryStats};
