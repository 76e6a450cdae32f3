//! Attestation collector.

use std::sync::Arc;

use agora_store::{Attestation, AttestationKind, AttestationStore, StoreError};
use agora_types::{AgentId, Timestamp};

/// Counts the aggregator reads from the attestation store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttestationStats {
    /// Attestations that are neither revoked nor expired.
    pub active: u32,
    /// Active attestations of kind `Endorsement` (feeds the social score).
    pub endorsements: u32,
    pub total: u32,
}

pub struct AttestationCollector<S> {
    store: Arc<S>,
}

impl<S: AttestationStore> AttestationCollector<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record (or re-issue) an attestation. One entry exists per
    /// (subject, issuer, kind); re-issuing replaces the previous one.
    pub fn record(&self, attestation: &Attestation) -> Result<(), StoreError> {
        self.store.put_attestation(attestation)
    }

    /// Revoke by re-recording with the revoked flag set.
    pub fn revoke(
        &self,
        subject: &AgentId,
        issuer: &AgentId,
        kind: AttestationKind,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let existing = self
            .store
            .attestations_for(subject)?
            .into_iter()
            .find(|a| &a.issuer == issuer && a.kind == kind);
        if let Some(mut attestation) = existing {
            attestation.revoked = true;
            attestation.issued_at = now;
            self.store.put_attestation(&attestation)?;
        }
        Ok(())
    }

    pub fn stats_for(&self, subject: &AgentId, now: Timestamp) -> Result<AttestationStats, StoreError> {
        let all = self.store.attestations_for(subject)?;
        let mut stats = AttestationStats {
            total: all.len() as u32,
            ..Default::default()
        };
        for attestation in &all {
            if attestation.is_active(now) {
                stats.active += 1;
                if attestation.kind == AttestationKind::Endorsement {
                    stats.endorsements += 1;
                }
            }
        }
        Ok(stats)
    }
}
