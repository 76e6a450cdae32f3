//! Receipt registry — at most one receipt per unique payment.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use agora_decoder::TransactionFact;
use agora_store::{ReceiptStore, TransactionReceipt};
use agora_types::{AgentId, ContentType, ReceiptId, SignatureHash};

use crate::error::RegistryError;

/// Domain-separation tag for receipt identity derivation. Shared with the
/// on-ledger program's seed tuple; must never change while existing
/// receipts remain.
const RECEIPT_DOMAIN: &[u8] = b"tx_receipt";

/// Deterministically derive a receipt identity from the payment triple.
///
/// Same inputs always yield the same identity, which is what makes
/// `create_receipt` idempotent without a prior existence check.
pub fn derive_receipt_id(
    payer: &AgentId,
    recipient: &AgentId,
    signature_hash: &SignatureHash,
) -> ReceiptId {
    let mut hasher = Sha256::new();
    hasher.update(RECEIPT_DOMAIN);
    hasher.update(payer.as_bytes());
    hasher.update(recipient.as_bytes());
    hasher.update(signature_hash.as_bytes());
    ReceiptId::new(hasher.finalize().into())
}

/// The receipt registry over some storage backend.
pub struct ReceiptRegistry<S> {
    store: Arc<S>,
}

impl<S: ReceiptStore> ReceiptRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a receipt for a decoded payment, idempotently.
    ///
    /// Fails with `UnauthorizedCreator` unless `creator` is one of the two
    /// transacting parties, and `SelfTransaction` if payer == recipient.
    /// If a receipt already exists at the derived identity this is a
    /// successful no-op returning the existing identity — duplicate
    /// delivery of the same payment notification is harmless.
    pub fn create_receipt(
        &self,
        fact: &TransactionFact,
        content_type: ContentType,
        creator: &AgentId,
    ) -> Result<ReceiptId, RegistryError> {
        if creator != &fact.payer && creator != &fact.recipient {
            return Err(RegistryError::UnauthorizedCreator);
        }
        if fact.payer == fact.recipient {
            return Err(RegistryError::SelfTransaction);
        }

        let id = derive_receipt_id(&fact.payer, &fact.recipient, &fact.signature_hash);
        let receipt = TransactionReceipt {
            payer: fact.payer,
            recipient: fact.recipient,
            signature_hash: fact.signature_hash,
            amount: fact.amount,
            content_type,
            created_at: fact.observed_at,
            vote_cast: false,
        };

        let inserted = self.store.insert_if_absent(&id, &receipt)?;
        if inserted {
            tracing::debug!(receipt = %id, payer = %fact.payer, recipient = %fact.recipient,
                amount = fact.amount, "receipt created");
        }
        Ok(id)
    }

    /// Atomically consume the receipt's one-shot vote flag.
    pub fn mark_voted(&self, id: &ReceiptId) -> Result<(), RegistryError> {
        use agora_store::MarkVotedOutcome;
        match self.store.mark_voted(id) {
            Ok(MarkVotedOutcome::Marked) => Ok(()),
            Ok(MarkVotedOutcome::AlreadyVoted) => Err(RegistryError::ReceiptAlreadyUsed),
            Err(agora_store::StoreError::NotFound(_)) => Err(RegistryError::ReceiptNotFound),
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self, id: &ReceiptId) -> Result<bool, RegistryError> {
        Ok(self.store.receipt_exists(id)?)
    }

    pub fn get(&self, id: &ReceiptId) -> Result<TransactionReceipt, RegistryError> {
        self.store
            .get_receipt(id)?
            .ok_or(RegistryError::ReceiptNotFound)
    }
}
