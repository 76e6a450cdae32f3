//! HMAC payload signature verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header prefixes different senders put in front of the hex digest.
const PREFIXES: [&str; 2] = ["sha256=", "v1="];

/// Why an inbound payload failed authentication.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// The header value is not a hex digest of the right width.
    #[error("malformed signature header")]
    MalformedSignature,

    /// The digest does not match the payload under the shared secret.
    #[error("signature mismatch")]
    SignatureMismatch,
}

/// Verify `header` against HMAC-SHA-256(`secret`, `payload`).
///
/// Accepts `sha256=`- and `v1=`-prefixed header values as well as a bare
/// hex digest; the comparison itself is timing-safe.
pub fn verify_signature(secret: &[u8], payload: &[u8], header: &str) -> Result<(), WebhookError> {
    let hex_digest = normalize(header.trim());

    let mut declared = [0u8; 32];
    hex::decode_to_slice(hex_digest, &mut declared)
        .map_err(|_| WebhookError::MalformedSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret).expect("hmac accepts any key length");
    mac.update(payload);
    mac.verify_slice(&declared)
        .map_err(|_| WebhookError::SignatureMismatch)
}

fn normalize(header: &str) -> &str {
    for prefix in PREFIXES {
        if let Some(rest) = header.strip_prefix(prefix) {
            return rest;
        }
    }
    header
}

/// Compute the `sha256=`-prefixed header value for a payload (used by
/// outbound tooling and tests).
pub fn sign_payload(secret: &[u8], payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("hmac accepts any key length");
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"top-secret";
    const PAYLOAD: &[u8] = br#"{"transaction":"...","network":"mainnet"}"#;

    #[test]
    fn test_valid_signature_verifies() {
        let header = sign_payload(SECRET, PAYLOAD);
        assert_eq!(verify_signature(SECRET, PAYLOAD, &header), Ok(()));
    }

    #[test]
    fn test_v1_prefix_accepted() {
        let header = sign_payload(SECRET, PAYLOAD).replace("sha256=", "v1=");
        assert_eq!(verify_signature(SECRET, PAYLOAD, &header), Ok(()));
    }

    #[test]
    fn test_bare_hex_accepted() {
        let header = sign_payload(SECRET, PAYLOAD).replace("sha256=", "");
        assert_eq!(verify_signature(SECRET, PAYLOAD, &header), Ok(()));
    }

    #[test]
    fn test_wrong_secret_is_mismatch() {
        let header = sign_payload(b"other-secret", PAYLOAD);
        assert_eq!(
            verify_signature(SECRET, PAYLOAD, &header),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_tampered_payload_is_mismatch() {
        let header = sign_payload(SECRET, PAYLOAD);
        assert_eq!(
            verify_signature(SECRET, b"tampered", &header),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_garbage_header_is_malformed() {
        for header in ["", "sha256=", "sha256=zz", "sha256=abcd", "not-hex-at-all"] {
            assert_eq!(
                verify_signature(SECRET, PAYLOAD, header),
                Err(WebhookError::MalformedSignature),
                "header {header:?}"
            );
        }
    }
}
