use super::events::{EventBus, SubmissionEvent};
use super::state::{
    RequestOutcome, RequestState, SessionState, SubmissionIntent, SubmissionPhase,
    SubmissionSnapshot,
};
use crate::contracts::{ContractAddresses, ContractCall, TransactionLayer, TxReceipt};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;
use zkyield_crypto::{
    format_for_contract, CircuitKind, ContractProof, Credential, GeneratedProof, ProofGenerator,
};
use zkyield_types::{TokenAmount, ZkYieldError, ZkYieldResult};

/// Public parameter a proof is generated against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProofRequest {
    Kyc { allowed_jurisdiction: u64 },
    Balance { threshold: TokenAmount },
}

impl ProofRequest {
    pub fn kind(&self) -> CircuitKind {
        match self {
            Self::Kyc { .. } => CircuitKind::Kyc,
            Self::Balance { .. } => CircuitKind::Balance,
        }
    }
}

fn claim_proof_slot(state: &mut SessionState) -> ZkYieldResult<u64> {
    if state.proof_request.is_in_flight() {
        return Err(ZkYieldError::Busy(
            "Proof generation already in progress".into(),
        ));
    }
    if state.phase != SubmissionPhase::ProofPending {
        return Err(ZkYieldError::InputValidation(format!(
            "Session is {}; reset before generating another proof",
            state.phase
        )));
    }
    state.proof_request = RequestState::InFlight;
    Ok(state.epoch)
}

/// Drives one attempt through proof generation, formatting and
/// submission. Proof and transaction requests are tracked separately so a
/// failed transaction can be resent without proving again.
pub struct SubmissionOrchestrator {
    generator: ProofGenerator,
    transactions: Arc<dyn TransactionLayer>,
    addresses: ContractAddresses,
    events: EventBus,
    proof_timeout: Duration,
    state: RwLock<SessionState>,
}

impl SubmissionOrchestrator {
    pub fn new(
        generator: ProofGenerator,
        transactions: Arc<dyn TransactionLayer>,
        addresses: ContractAddresses,
        events: EventBus,
        proof_timeout: Duration,
    ) -> Self {
        Self {
            generator,
            transactions,
            addresses,
            events,
            proof_timeout,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn proof_timeout(&self) -> Duration {
        self.proof_timeout
    }

    pub async fn snapshot(&self) -> SubmissionSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn phase(&self) -> SubmissionPhase {
        self.state.read().await.phase
    }

    /// The retained proof and its contract layout, once generated.
    pub async fn ready_proof(&self) -> Option<(GeneratedProof, ContractProof)> {
        let state = self.state.read().await;
        match (&state.proof, &state.contract_proof) {
            (Some(proof), Some(formatted)) => Some((proof.clone(), formatted.clone())),
            _ => None,
        }
    }

    /// Claims the proof slot. Only one generation may run per session.
    async fn begin_generation(&self) -> ZkYieldResult<u64> {
        let mut state = self.state.write().await;
        claim_proof_slot(&mut state)
    }

    async fn run_prover(
        &self,
        credential: &Credential,
        request: &ProofRequest,
    ) -> ZkYieldResult<GeneratedProof> {
        match request {
            ProofRequest::Kyc { allowed_jurisdiction } => {
                self.generator
                    .generate_kyc_proof(credential, *allowed_jurisdiction)
                    .await
            }
            ProofRequest::Balance { threshold } => {
                self.generator
                    .generate_balance_proof(credential, threshold)
                    .await
            }
        }
    }

    pub async fn generate(
        &self,
        credential: &Credential,
        request: ProofRequest,
    ) -> ZkYieldResult<GeneratedProof> {
        let kind = request.kind();
        let epoch = self.begin_generation().await?;
        let attempt = Uuid::new_v4();
        info!(%attempt, circuit = %kind, "Generating proof");

        let result = match tokio::time::timeout(
            self.proof_timeout,
            self.run_prover(credential, &request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ZkYieldError::ProofTimeout(self.proof_timeout.as_secs())),
        };

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!(%attempt, "Session was reset during generation, discarding result");
            return Err(ZkYieldError::ProofGeneration(
                "Session was reset before the proof completed".into(),
            ));
        }

        state.proof_request = RequestState::settle(&result);
        match result {
            Ok(generated) => {
                state.phase = SubmissionPhase::ProofReady;
                state.contract_proof = Some(format_for_contract(&generated.proof));
                state.proof = Some(generated.clone());
                drop(state);

                info!(%attempt, commitment = %generated.commitment, "Proof ready");
                self.events.publish(SubmissionEvent::ProofGenerated {
                    kind,
                    commitment: generated.commitment.clone(),
                });
                Ok(generated)
            }
            Err(e) => {
                state.phase = SubmissionPhase::ProofPending;
                state.proof = None;
                state.contract_proof = None;
                drop(state);

                warn!(%attempt, circuit = %kind, "Proof generation failed: {}", e);
                self.events.publish(SubmissionEvent::ProofFailed {
                    kind,
                    error: e.clone(),
                });
                Err(e)
            }
        }
    }

    /// Installs a proof produced earlier, e.g. by a previous process.
    pub async fn load_proof(&self, generated: GeneratedProof) -> ZkYieldResult<()> {
        if generated.proof.commitment() != Some(&generated.commitment) {
            return Err(ZkYieldError::InputValidation(
                "Proof does not bind the given commitment".into(),
            ));
        }

        let mut state = self.state.write().await;
        claim_proof_slot(&mut state)?;
        state.contract_proof = Some(format_for_contract(&generated.proof));
        state.proof = Some(generated);
        state.phase = SubmissionPhase::ProofReady;
        state.proof_request = RequestState::Settled(RequestOutcome::Succeeded);
        debug!("Loaded existing proof into session");
        Ok(())
    }

    fn build_call(
        &self,
        intent: SubmissionIntent,
        generated: &GeneratedProof,
        formatted: &ContractProof,
    ) -> ContractCall {
        match intent {
            SubmissionIntent::GrantCompliance => ContractCall::grant_compliance(
                &self.addresses,
                formatted.clone(),
                generated.commitment.clone(),
            ),
            SubmissionIntent::Deposit { value } => ContractCall::deposit(
                &self.addresses,
                formatted.clone(),
                generated.commitment.clone(),
                value,
            ),
        }
    }

    /// Sends the ready proof. On failure the proof stays in place and the
    /// session stays `ProofReady`, so calling `submit` again retries the
    /// transaction alone.
    pub async fn submit(&self, intent: SubmissionIntent) -> ZkYieldResult<TxReceipt> {
        let call = {
            let mut state = self.state.write().await;
            if state.tx_request.is_in_flight() {
                return Err(ZkYieldError::Busy("Transaction already in flight".into()));
            }
            match state.phase {
                SubmissionPhase::ProofPending => {
                    return Err(ZkYieldError::InputValidation(
                        "No proof generated yet".into(),
                    ));
                }
                SubmissionPhase::Submitted => {
                    return Err(ZkYieldError::InputValidation(
                        "Proof already submitted; reset to start a new attempt".into(),
                    ));
                }
                SubmissionPhase::ProofReady => {}
            }

            let (generated, formatted) = match (&state.proof, &state.contract_proof) {
                (Some(g), Some(f)) => (g, f),
                _ => {
                    return Err(ZkYieldError::Internal(
                        "Session is ready but holds no proof".into(),
                    ));
                }
            };
            if generated.proof.kind != intent.circuit() {
                return Err(ZkYieldError::InputValidation(format!(
                    "A {} proof cannot be used for this submission",
                    generated.proof.kind
                )));
            }

            let call = self.build_call(intent, generated, formatted);
            state.tx_request = RequestState::InFlight;
            call
        };

        let function = call.function.name();
        let result = self.send_and_wait(call).await;

        let mut state = self.state.write().await;
        state.tx_request = RequestState::settle(&result);
        match &result {
            Ok(receipt) => {
                state.phase = SubmissionPhase::Submitted;
                state.last_tx = Some(receipt.tx_hash);
                drop(state);

                info!("{} confirmed: {}", function, receipt.tx_hash);
                self.events.publish(SubmissionEvent::Confirmed {
                    function,
                    tx_hash: receipt.tx_hash,
                    block_number: receipt.block_number,
                    confirmed_at: Utc::now(),
                });
            }
            Err(e) => {
                drop(state);
                warn!("{} failed, proof retained for retry: {}", function, e);
                self.events.publish(SubmissionEvent::SubmissionFailed {
                    function,
                    error: e.clone(),
                });
            }
        }
        result
    }

    async fn send_and_wait(&self, call: ContractCall) -> ZkYieldResult<TxReceipt> {
        let function = call.function.name();
        let tx_hash = self.transactions.submit(call).await?;
        self.state.write().await.last_tx = Some(tx_hash);
        self.events
            .publish(SubmissionEvent::Submitted { function, tx_hash });

        self.transactions.wait_for_receipt(&tx_hash).await
    }

    /// Back to `ProofPending` with no proof or commitment. A generation
    /// still running is abandoned and its result dropped.
    pub async fn reset(&self) -> ZkYieldResult<()> {
        let mut state = self.state.write().await;
        if state.tx_request.is_in_flight() {
            return Err(ZkYieldError::Busy(
                "Cannot reset while a transaction is in flight".into(),
            ));
        }
        if state.proof_request.is_in_flight() {
            debug!("Reset abandons the proof in progress");
        }
        *state = state.next_epoch();
        drop(state);

        info!("Submission session reset");
        self.events.publish(SubmissionEvent::Reset);
        Ok(())
    }
}
