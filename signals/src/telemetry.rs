//! Performance telemetry collector.
//!
//! Calls and health probes are rolled into per-subject hourly buckets at
//! write time; `stats_for` folds the buckets inside the lookback window
//! into the rates the aggregator consumes.

use std::sync::Arc;

use agora_store::{CallStatsBucket, StoreError, TelemetryStore};
use agora_types::{AgentId, Timestamp};

const SECS_PER_HOUR: u64 = 3600;

/// Neutral baseline for a ratio with no observations.
const NEUTRAL_PCT: f64 = 50.0;

/// Windowed rates for one subject. Ratios with no underlying observations
/// sit at the neutral baseline instead of failing or reading as zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TelemetryStats {
    /// Share of healthy health-check probes, percent.
    pub uptime_pct: f64,
    /// Share of calls that errored, percent.
    pub error_rate_pct: f64,
    /// Share of calls that succeeded, percent.
    pub success_ratio_pct: f64,
    /// Calls observed inside the window.
    pub window_calls: u64,
    /// Mean latency over the window, milliseconds.
    pub avg_latency_ms: f64,
}

impl Default for TelemetryStats {
    fn default() -> Self {
        Self {
            uptime_pct: NEUTRAL_PCT,
            error_rate_pct: NEUTRAL_PCT,
            success_ratio_pct: NEUTRAL_PCT,
            window_calls: 0,
            avg_latency_ms: 0.0,
        }
    }
}

pub struct TelemetryCollector<S> {
    store: Arc<S>,
}

impl<S: TelemetryStore> TelemetryCollector<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record one call outcome.
    pub fn record_call(
        &self,
        subject: &AgentId,
        at: Timestamp,
        success: bool,
        latency_ms: u64,
    ) -> Result<(), StoreError> {
        let delta = CallStatsBucket {
            calls: 1,
            successes: success as u64,
            errors: (!success) as u64,
            total_latency_ms: latency_ms,
            up_checks: 0,
            up_ok: 0,
        };
        self.store
            .merge_bucket(subject, at.as_secs() / SECS_PER_HOUR, &delta)
    }

    /// Record one health-check probe.
    pub fn record_heartbeat(
        &self,
        subject: &AgentId,
        at: Timestamp,
        healthy: bool,
    ) -> Result<(), StoreError> {
        let delta = CallStatsBucket {
            up_checks: 1,
            up_ok: healthy as u64,
            ..Default::default()
        };
        self.store
            .merge_bucket(subject, at.as_secs() / SECS_PER_HOUR, &delta)
    }

    pub fn stats_for(
        &self,
        subject: &AgentId,
        now: Timestamp,
        window_hours: u64,
    ) -> Result<TelemetryStats, StoreError> {
        let to_hour = now.as_secs() / SECS_PER_HOUR + 1;
        let from_hour = to_hour.saturating_sub(window_hours);
        let buckets = self.store.buckets_for(subject, from_hour, to_hour)?;

        let mut totals = CallStatsBucket::default();
        for bucket in &buckets {
            totals.merge(bucket);
        }

        let mut stats = TelemetryStats::default();
        if totals.up_checks > 0 {
            stats.uptime_pct = totals.up_ok as f64 / totals.up_checks as f64 * 100.0;
        }
        if totals.calls > 0 {
            stats.error_rate_pct = totals.errors as f64 / totals.calls as f64 * 100.0;
            stats.success_ratio_pct = totals.successes as f64 / totals.calls as f64 * 100.0;
            stats.avg_latency_ms = totals.total_latency_ms as f64 / totals.calls as f64;
            stats.window_calls = totals.calls;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_store::MemoryStore;

    fn test_agent(n: u8) -> AgentId {
        AgentId::new([n; 32])
    }

    #[test]
    fn test_rates_from_recorded_calls() {
        let collector = TelemetryCollector::new(Arc::new(MemoryStore::new()));
        let subject = test_agent(1);
        let now = Timestamp::new(100 * 3600);

        for i in 0..8 {
            collector.record_call(&subject, now, i < 6, 100).unwrap();
        }
        collector.record_heartbeat(&subject, now, true).unwrap();
        collector.record_heartbeat(&subject, now, false).unwrap();

        let stats = collector.stats_for(&subject, now, 24).unwrap();
        assert_eq!(stats.window_calls, 8);
        assert!((stats.success_ratio_pct - 75.0).abs() < 1e-9);
        assert!((stats.error_rate_pct - 25.0).abs() < 1e-9);
        assert!((stats.uptime_pct - 50.0).abs() < 1e-9);
        assert!((stats.avg_latency_ms - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_calls_outside_window_ignored() {
        let collector = TelemetryCollector::new(Arc::new(MemoryStore::new()));
        let subject = test_agent(1);
        let old = Timestamp::new(10 * 3600);
        let now = Timestamp::new(100 * 3600);

        collector.record_call(&subject, old, false, 100).unwrap();

        let stats = collector.stats_for(&subject, now, 24).unwrap();
        assert_eq!(stats.window_calls, 0);
        // No observations in window → neutral ratios.
        assert!((stats.success_ratio_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_data_is_neutral_baseline() {
        let collector = TelemetryCollector::new(Arc::new(MemoryStore::new()));
        let stats = collector
            .stats_for(&test_agent(1), Timestamp::new(3600), 24)
            .unwrap();
        assert_eq!(stats, TelemetryStats::default());
        assert!((stats.uptime_pct - 50.0).abs() < 1e-9);
    }
}
