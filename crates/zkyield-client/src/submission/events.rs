use crate::contracts::TxHash;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::trace;
use zkyield_crypto::{CircuitKind, FieldInt};
use zkyield_types::ZkYieldError;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Clone, Debug)]
pub enum SubmissionEvent {
    ProofGenerated {
        kind: CircuitKind,
        commitment: FieldInt,
    },
    ProofFailed {
        kind: CircuitKind,
        error: ZkYieldError,
    },
    Submitted {
        function: &'static str,
        tx_hash: TxHash,
    },
    Confirmed {
        function: &'static str,
        tx_hash: TxHash,
        block_number: Option<u64>,
        confirmed_at: DateTime<Utc>,
    },
    SubmissionFailed {
        function: &'static str,
        error: ZkYieldError,
    },
    Reset,
}

impl SubmissionEvent {
    /// Whether this event changes vault balances.
    pub fn touches_vault(&self) -> bool {
        matches!(
            self,
            Self::Confirmed { function, .. } if *function == "deposit" || *function == "withdraw"
        )
    }
}

/// Process-wide fan-out of submission lifecycle events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SubmissionEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SubmissionEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: SubmissionEvent) {
        // No subscribers is fine.
        if self.sender.send(event).is_err() {
            trace!("Event dropped, no subscribers");
        }
    }
}
