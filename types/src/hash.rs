//! Fixed-width digest of a ledger transaction signature.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte SHA-256 digest of a transaction signature's text form.
///
/// Used instead of the raw signature as an identity component so receipt
/// identities have uniform fixed width regardless of signature encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignatureHash([u8; 32]);

impl SignatureHash {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Digest a signature's base58 text form.
    pub fn of_signature(signature: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(signature.as_bytes());
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SignatureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SignatureHash({:02x}{:02x}{:02x}{:02x}..)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl fmt::Display for SignatureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_signature_same_hash() {
        let a = SignatureHash::of_signature("5VERYshortSIG");
        let b = SignatureHash::of_signature("5VERYshortSIG");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_signatures_differ() {
        let a = SignatureHash::of_signature("sigA");
        let b = SignatureHash::of_signature("sigB");
        assert_ne!(a, b);
    }
}
