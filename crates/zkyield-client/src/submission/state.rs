use crate::contracts::TxHash;
use serde::Serialize;
use std::fmt;
use zkyield_crypto::{CircuitKind, ContractProof, FieldInt, GeneratedProof};
use zkyield_types::{TokenAmount, ZkYieldError, ZkYieldResult};

/// Where a verification or deposit attempt stands. Moves forward only;
/// `reset` is the single way back to `ProofPending`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    #[default]
    ProofPending,
    ProofReady,
    Submitted,
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProofPending => write!(f, "proof pending"),
            Self::ProofReady => write!(f, "proof ready"),
            Self::Submitted => write!(f, "submitted"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    Succeeded,
    Failed(ZkYieldError),
}

/// Progress of one long-running request. Proof generation and transaction
/// submission each carry their own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Settled(RequestOutcome),
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    pub fn settle<T>(result: &ZkYieldResult<T>) -> Self {
        match result {
            Ok(_) => Self::Settled(RequestOutcome::Succeeded),
            Err(e) => Self::Settled(RequestOutcome::Failed(e.clone())),
        }
    }

    pub fn error(&self) -> Option<&ZkYieldError> {
        match self {
            Self::Settled(RequestOutcome::Failed(e)) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::InFlight => write!(f, "in flight"),
            Self::Settled(RequestOutcome::Succeeded) => write!(f, "succeeded"),
            Self::Settled(RequestOutcome::Failed(e)) => write!(f, "failed: {}", e),
        }
    }
}

impl Serialize for RequestState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What `submit` should do with the ready proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionIntent {
    GrantCompliance,
    Deposit { value: TokenAmount },
}

impl SubmissionIntent {
    /// Circuit whose proof this intent consumes.
    pub fn circuit(&self) -> CircuitKind {
        match self {
            Self::GrantCompliance => CircuitKind::Kyc,
            Self::Deposit { .. } => CircuitKind::Balance,
        }
    }
}

#[derive(Default)]
pub(crate) struct SessionState {
    pub phase: SubmissionPhase,
    pub proof_request: RequestState,
    pub tx_request: RequestState,
    pub proof: Option<GeneratedProof>,
    pub contract_proof: Option<ContractProof>,
    pub last_tx: Option<TxHash>,
    pub epoch: u64,
}

impl SessionState {
    /// Fresh state that keeps counting epochs.
    pub fn next_epoch(&self) -> Self {
        Self {
            epoch: self.epoch + 1,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> SubmissionSnapshot {
        SubmissionSnapshot {
            phase: self.phase,
            proof_request: self.proof_request.clone(),
            tx_request: self.tx_request.clone(),
            commitment: self.proof.as_ref().map(|p| p.commitment.clone()),
            last_tx: self.last_tx,
        }
    }
}

/// Read-only view of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmissionSnapshot {
    pub phase: SubmissionPhase,
    pub proof_request: RequestState,
    pub tx_request: RequestState,
    pub commitment: Option<FieldInt>,
    pub last_tx: Option<TxHash>,
}
