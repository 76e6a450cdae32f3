//! Inbound webhook signature verification.
//!
//! The HTTP framing lives with the boundary collaborator; this crate owns
//! only the authenticity contract: an HMAC-SHA-256 over the raw payload,
//! compared timing-safely against the declared header value. The decoder
//! and registry assume payloads handed to them have passed this check.

pub mod signature;

pub use signature::{verify_signature, WebhookError};
