//! Attestation storage trait.

use crate::StoreError;
use agora_types::{AgentId, Timestamp};
use serde::{Deserialize, Serialize};

/// What an attestation vouches for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttestationKind {
    /// Third-party validation stamp over a subject's outputs.
    ValidationStamp,
    /// Another agent vouching for the subject.
    Endorsement,
    /// Issued credential (capability, compliance).
    Credential,
}

/// A timestamped third-party statement about a subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub issuer: AgentId,
    pub subject: AgentId,
    pub kind: AttestationKind,
    pub issued_at: Timestamp,
    /// `None` means the attestation does not expire on its own.
    pub expires_at: Option<Timestamp>,
    pub revoked: bool,
}

impl Attestation {
    /// Active = not revoked and not past its expiry.
    pub fn is_active(&self, now: Timestamp) -> bool {
        if self.revoked {
            return false;
        }
        match self.expires_at {
            Some(expiry) => now < expiry,
            None => true,
        }
    }
}

/// Trait for attestation storage. One entry per (subject, issuer, kind);
/// re-issuing replaces the previous entry.
pub trait AttestationStore {
    fn put_attestation(&self, attestation: &Attestation) -> Result<(), StoreError>;

    fn attestations_for(&self, subject: &AgentId) -> Result<Vec<Attestation>, StoreError>;
}
