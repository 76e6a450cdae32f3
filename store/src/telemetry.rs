//! Performance telemetry storage trait.
//!
//! Telemetry is kept as per-subject hourly buckets rather than raw call
//! records, keeping the store bounded while the aggregator only ever needs
//! windowed rates.

use crate::StoreError;
use agora_types::AgentId;
use serde::{Deserialize, Serialize};

/// Rolled-up call and health-check counters for one subject-hour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStatsBucket {
    pub calls: u64,
    pub successes: u64,
    pub errors: u64,
    pub total_latency_ms: u64,
    /// Health-check probes observed this hour.
    pub up_checks: u64,
    /// Health-check probes that came back healthy.
    pub up_ok: u64,
}

impl CallStatsBucket {
    /// Fold another bucket's counters into this one.
    pub fn merge(&mut self, other: &CallStatsBucket) {
        self.calls = self.calls.saturating_add(other.calls);
        self.successes = self.successes.saturating_add(other.successes);
        self.errors = self.errors.saturating_add(other.errors);
        self.total_latency_ms = self.total_latency_ms.saturating_add(other.total_latency_ms);
        self.up_checks = self.up_checks.saturating_add(other.up_checks);
        self.up_ok = self.up_ok.saturating_add(other.up_ok);
    }
}

/// Trait for telemetry storage, keyed by (subject, hour-since-epoch).
pub trait TelemetryStore {
    /// Merge `delta` into the bucket at (subject, hour), creating it if
    /// absent. Must be atomic per bucket: concurrent merges never lose
    /// counts.
    fn merge_bucket(
        &self,
        subject: &AgentId,
        hour: u64,
        delta: &CallStatsBucket,
    ) -> Result<(), StoreError>;

    /// Buckets for `subject` with `from_hour <= hour < to_hour`.
    fn buckets_for(
        &self,
        subject: &AgentId,
        from_hour: u64,
        to_hour: u64,
    ) -> Result<Vec<CallStatsBucket>, StoreError>;
}
