//! Fire-and-forget recalculation queue.
//!
//! Producers enqueue subject ids; a single consumer re-derives scores.
//! Because recalculation is a pure function of current signal state,
//! redundant or reordered triggers are harmless — the queue only dedupes
//! while a subject is already waiting, to keep bursts cheap.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use agora_registry::RecalcSink;
use agora_store::{
    AttestationStore, ReceiptStore, ReviewStore, ScoreStore, StakeStore, TelemetryStore, VoteStore,
};
use agora_types::AgentId;

use crate::aggregator::Aggregator;

/// Producer half; cheap to clone via `Arc`, implements [`RecalcSink`].
pub struct RecalcQueue {
    tx: mpsc::UnboundedSender<AgentId>,
    waiting: Mutex<HashSet<[u8; 32]>>,
}

impl RecalcQueue {
    /// Enqueue unless the subject is already waiting.
    pub fn enqueue(&self, subject: AgentId) {
        let fresh = self.waiting.lock().unwrap().insert(*subject.as_bytes());
        if fresh {
            // Send can only fail after the worker is gone; at shutdown a
            // dropped trigger is fine — the periodic sweep converges.
            if self.tx.send(subject).is_err() {
                tracing::debug!(subject = %subject, "recalc worker gone, trigger dropped");
            }
        }
    }

    fn mark_dequeued(&self, subject: &AgentId) {
        self.waiting.lock().unwrap().remove(subject.as_bytes());
    }
}

impl RecalcSink for RecalcQueue {
    fn schedule_recalc(&self, subject: AgentId) {
        self.enqueue(subject);
    }
}

/// Consumer half — owns the receiver and the aggregator.
pub struct RecalcWorker<S> {
    rx: mpsc::UnboundedReceiver<AgentId>,
    queue: Arc<RecalcQueue>,
    aggregator: Arc<Aggregator<S>>,
}

impl<S> RecalcWorker<S>
where
    S: VoteStore
        + ReceiptStore
        + AttestationStore
        + StakeStore
        + TelemetryStore
        + ReviewStore
        + ScoreStore
        + Send
        + Sync
        + 'static,
{
    /// Drain triggers until every producer is dropped.
    pub async fn run(mut self) {
        while let Some(subject) = self.rx.recv().await {
            self.queue.mark_dequeued(&subject);
            // One immediate retry on transient storage failure; beyond that
            // the periodic sweep picks the subject up again.
            for attempt in 0..2 {
                match self.aggregator.recalculate(&subject) {
                    Ok(_) => break,
                    Err(e) if attempt == 0 => {
                        tracing::warn!(subject = %subject, error = %e, "recalculation failed, retrying");
                    }
                    Err(e) => {
                        tracing::error!(subject = %subject, error = %e, "recalculation failed after retry");
                    }
                }
            }
        }
    }
}

/// Build the connected producer/consumer pair.
pub fn recalc_channel<S>(aggregator: Arc<Aggregator<S>>) -> (Arc<RecalcQueue>, RecalcWorker<S>)
where
    S: VoteStore
        + ReceiptStore
        + AttestationStore
        + StakeStore
        + TelemetryStore
        + ReviewStore
        + ScoreStore
        + Send
        + Sync
        + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let queue = Arc::new(RecalcQueue {
        tx,
        waiting: Mutex::new(HashSet::new()),
    });
    let worker = RecalcWorker {
        rx,
        queue: queue.clone(),
        aggregator,
    };
    (queue, worker)
}
