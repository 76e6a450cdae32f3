//! Payment-fact extraction from a parsed transaction.

use std::collections::HashMap;

use agora_types::{AgentId, SignatureHash, Timestamp, TokenCatalog};

use crate::error::DecodeError;
use crate::message::TransactionEnvelope;

/// Discriminant of the transfer-with-amount-check token instruction.
const TRANSFER_CHECKED: u8 = 12;

/// Verifiable facts extracted from one confirmed payment transaction.
///
/// Ephemeral — consumed by the receipt registry, never persisted as its own
/// entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionFact {
    /// Base58 text form of the transaction's first signature.
    pub signature: String,
    /// Fixed-width digest of `signature`; the identity component used
    /// downstream.
    pub signature_hash: SignatureHash,
    /// Fee payer — the first resolved account.
    pub payer: AgentId,
    /// Destination of the token transfer.
    pub recipient: AgentId,
    /// Transfer amount in the smallest currency unit.
    pub amount: u64,
    /// Wall-clock capture time, supplied by the caller.
    pub observed_at: Timestamp,
}

/// Decode a raw signed transaction into a payment fact.
///
/// `tables` maps address-lookup-table accounts to their stored addresses;
/// referenced tables that are absent fail with `UnresolvableAccounts`.
pub fn decode_transaction(
    buf: &[u8],
    tables: &HashMap<AgentId, Vec<AgentId>>,
    catalog: &TokenCatalog,
    observed_at: Timestamp,
) -> Result<TransactionFact, DecodeError> {
    let envelope = TransactionEnvelope::parse(buf)?;
    let keys = envelope.resolve_keys(tables)?;

    let payer = keys[0];

    // First transfer-checked instruction owned by a catalog token program
    // carries the payment. Destination is the third account reference;
    // amount is the 8-byte little-endian integer at payload offset 1.
    let mut transfer = None;
    for ix in &envelope.instructions {
        let program = keys.get(ix.program_index as usize).ok_or_else(|| {
            DecodeError::malformed(format!("program index {} out of range", ix.program_index))
        })?;
        if !catalog.is_token_program(program) {
            continue;
        }
        if ix.data.len() < 9 || ix.data[0] != TRANSFER_CHECKED {
            continue;
        }
        let dest_index = *ix
            .account_indices
            .get(2)
            .ok_or_else(|| DecodeError::malformed("transfer instruction lacks destination"))?;
        let recipient = *keys.get(dest_index as usize).ok_or_else(|| {
            DecodeError::malformed(format!("destination index {dest_index} out of range"))
        })?;
        let mut amount_bytes = [0u8; 8];
        amount_bytes.copy_from_slice(&ix.data[1..9]);
        transfer = Some((recipient, u64::from_le_bytes(amount_bytes)));
        break;
    }

    let (recipient, amount) = transfer.ok_or(DecodeError::NoTransferInstruction)?;

    let signature = bs58::encode(&envelope.signatures[0]).into_string();
    let signature_hash = SignatureHash::of_signature(&signature);

    Ok(TransactionFact {
        signature,
        signature_hash,
        payer,
        recipient,
        amount,
        observed_at,
    })
}
