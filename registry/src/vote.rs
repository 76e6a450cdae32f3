//! Peer vote engine — one weighted quality vote per receipt.

use std::sync::Arc;

use agora_store::{PeerVote, ReceiptStore, VoteStore};
use agora_types::{AgentId, QualityScores, ReceiptId, ReputationParams, Timestamp, VoteType};

use crate::error::RegistryError;
use crate::receipt::ReceiptRegistry;
use crate::weight::weight_for_amount;

/// Downstream consumer of fire-and-forget recalculation triggers.
///
/// Implementations must tolerate redundant and reordered triggers: the
/// aggregator always recomputes from current signal state.
pub trait RecalcSink: Send + Sync {
    fn schedule_recalc(&self, subject: AgentId);
}

/// A vote submission, as received from the API boundary.
#[derive(Clone, Debug)]
pub struct VoteRequest {
    pub receipt: ReceiptId,
    pub voter: AgentId,
    pub voted_agent: AgentId,
    pub vote_type: VoteType,
    pub quality_scores: QualityScores,
    pub comment_hash: [u8; 32],
}

/// The vote engine over receipt and vote storage.
pub struct VoteEngine<RS, VS> {
    receipts: ReceiptRegistry<RS>,
    votes: Arc<VS>,
    params: ReputationParams,
    recalc: Option<Arc<dyn RecalcSink>>,
}

impl<RS: ReceiptStore, VS: VoteStore> VoteEngine<RS, VS> {
    pub fn new(receipts: Arc<RS>, votes: Arc<VS>, params: ReputationParams) -> Self {
        Self {
            receipts: ReceiptRegistry::new(receipts),
            votes,
            params,
            recalc: None,
        }
    }

    /// Attach a recalculation sink; votes then schedule a recalc for the
    /// voted agent after persisting.
    pub fn with_recalc_sink(mut self, sink: Arc<dyn RecalcSink>) -> Self {
        self.recalc = Some(sink);
        self
    }

    /// Cast the single vote a receipt supports.
    ///
    /// Validation is fail-fast with a distinct error per cause; all checks
    /// run before the atomic flip so an invalid request can never consume
    /// the receipt. Under concurrent casts exactly one caller wins the
    /// compare-and-set; losers receive `ReceiptAlreadyUsed`.
    pub fn cast_vote(&self, request: VoteRequest, now: Timestamp) -> Result<PeerVote, RegistryError> {
        let receipt = self.receipts.get(&request.receipt)?;

        if receipt.vote_cast {
            return Err(RegistryError::ReceiptAlreadyUsed);
        }

        // Voter must be exactly one party, voted agent the other.
        let counterparty = if request.voter == receipt.payer {
            receipt.recipient
        } else if request.voter == receipt.recipient {
            receipt.payer
        } else {
            return Err(RegistryError::UnauthorizedVoter);
        };
        if request.voted_agent != counterparty {
            return Err(RegistryError::UnauthorizedVoter);
        }

        if receipt
            .created_at
            .has_expired(self.params.voting_window_secs, now)
        {
            return Err(RegistryError::VotingWindowExpired);
        }

        if !request.quality_scores.is_valid() {
            return Err(RegistryError::InvalidQualityScore);
        }

        // The one-shot flip — the registry's CAS decides racing callers.
        self.receipts.mark_voted(&request.receipt)?;

        let vote = PeerVote {
            voter: request.voter,
            voted_agent: request.voted_agent,
            vote_type: request.vote_type,
            quality_scores: request.quality_scores,
            comment_hash: request.comment_hash,
            vote_weight: weight_for_amount(receipt.amount, &self.params),
            cast_at: now,
            receipt: request.receipt,
        };
        self.votes.insert_vote(&vote)?;

        tracing::info!(
            receipt = %request.receipt,
            voter = %request.voter,
            voted_agent = %request.voted_agent,
            vote_type = ?request.vote_type,
            weight = vote.vote_weight,
            "peer vote cast"
        );

        if let Some(sink) = &self.recalc {
            sink.schedule_recalc(request.voted_agent);
        }

        Ok(vote)
    }

    pub fn get_vote(&self, receipt: &ReceiptId) -> Result<Option<PeerVote>, RegistryError> {
        Ok(self.votes.get_vote(receipt)?)
    }
}
