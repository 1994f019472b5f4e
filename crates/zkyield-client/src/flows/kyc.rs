use crate::contracts::{TransactionLayer, TxReceipt};
use crate::submission::{ProofRequest, SubmissionIntent, SubmissionOrchestrator, SubmissionSnapshot};
use std::sync::Arc;
use tracing::{info, warn};
use zkyield_crypto::{Credential, GeneratedProof};
use zkyield_types::{Jurisdiction, ZkYieldResult};

/// Mock-credential KYC: issue, prove jurisdiction membership, grant compliance.
pub struct KycService {
    orchestrator: SubmissionOrchestrator,
    transactions: Arc<dyn TransactionLayer>,
    allowed_override: Option<Jurisdiction>,
}

impl KycService {
    pub fn new(
        orchestrator: SubmissionOrchestrator,
        transactions: Arc<dyn TransactionLayer>,
        allowed_override: Option<Jurisdiction>,
    ) -> Self {
        Self {
            orchestrator,
            transactions,
            allowed_override,
        }
    }

    pub fn orchestrator(&self) -> &SubmissionOrchestrator {
        &self.orchestrator
    }

    pub async fn allowed_jurisdiction(&self) -> ZkYieldResult<u64> {
        match self.allowed_override {
            Some(jurisdiction) => Ok(u64::from(jurisdiction.code())),
            None => self.transactions.allowed_jurisdiction().await,
        }
    }

    /// Issues a credential for `name` and proves it against the allowed
    /// jurisdiction. The name is checked before anything leaves the process.
    pub async fn prepare(
        &self,
        name: &str,
        jurisdiction: Jurisdiction,
    ) -> ZkYieldResult<GeneratedProof> {
        let credential = Credential::mock(name, jurisdiction)?;
        info!(jurisdiction = %jurisdiction, "Mock credential issued");

        let allowed = self.allowed_jurisdiction().await?;
        if allowed != u64::from(jurisdiction.code()) {
            warn!(
                claimed = jurisdiction.code(),
                allowed, "Claimed jurisdiction is not the allowed one; the circuit will reject it"
            );
        }

        self.orchestrator
            .generate(
                &credential,
                ProofRequest::Kyc {
                    allowed_jurisdiction: allowed,
                },
            )
            .await
    }

    pub async fn load(&self, generated: GeneratedProof) -> ZkYieldResult<()> {
        self.orchestrator.load_proof(generated).await
    }

    pub async fn submit(&self) -> ZkYieldResult<TxReceipt> {
        self.orchestrator
            .submit(SubmissionIntent::GrantCompliance)
            .await
    }

    pub async fn reset(&self) -> ZkYieldResult<()> {
        self.orchestrator.reset().await
    }

    pub async fn status(&self) -> SubmissionSnapshot {
        self.orchestrator.snapshot().await
    }

    pub async fn is_compliant(&self) -> ZkYieldResult<bool> {
        let account = self.transactions.account()?;
        self.transactions.is_compliant(&account).await
    }
}
