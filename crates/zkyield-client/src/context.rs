use crate::config::{ClientConfig, WALLET_KEY_ENV};
use crate::contracts::{EvmTransactionLayer, TransactionLayer};
use crate::flows::{KycService, VaultService};
use crate::submission::{EventBus, SubmissionOrchestrator};
use std::sync::Arc;
use tracing::{info, warn};
use zkyield_crypto::{Groth16Backend, ProofGenerator, ProvingBackend};
use zkyield_types::ZkYieldResult;

/// Process-wide state, built once in `main` and handed to each command.
pub struct AppContext {
    config: ClientConfig,
    events: EventBus,
    generator: ProofGenerator,
    transactions: Arc<dyn TransactionLayer>,
}

impl AppContext {
    pub fn new(
        config: ClientConfig,
        transactions: Arc<dyn TransactionLayer>,
        backend: Arc<dyn ProvingBackend>,
    ) -> Self {
        Self {
            config,
            events: EventBus::default(),
            generator: ProofGenerator::new(backend),
            transactions,
        }
    }

    /// Connects to the configured RPC endpoint and loads the signer from
    /// the environment when present.
    pub async fn connect(config: ClientConfig) -> ZkYieldResult<Self> {
        let mut layer = EvmTransactionLayer::new(
            &config.network.rpc_url,
            config.network.chain_id,
            config.contracts.addresses(),
        );
        layer.connect().await?;

        match std::env::var(WALLET_KEY_ENV) {
            Ok(key) => {
                let account = layer.set_wallet(key.trim())?;
                info!("Wallet loaded: {}", account.short());
            }
            Err(_) => warn!("{} not set, read-only mode", WALLET_KEY_ENV),
        }

        let backend = Arc::new(Groth16Backend::new(config.prover.artifact_source()));
        Ok(Self::new(config, Arc::new(layer), backend))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn generator(&self) -> &ProofGenerator {
        &self.generator
    }

    pub fn transactions(&self) -> &Arc<dyn TransactionLayer> {
        &self.transactions
    }

    fn orchestrator(&self) -> SubmissionOrchestrator {
        SubmissionOrchestrator::new(
            self.generator.clone(),
            self.transactions.clone(),
            self.config.contracts.addresses(),
            self.events.clone(),
            self.config.prover.proof_timeout(),
        )
    }

    pub fn kyc_service(&self) -> KycService {
        KycService::new(
            self.orchestrator(),
            self.transactions.clone(),
            self.config.kyc.allowed_jurisdiction,
        )
    }

    pub fn vault_service(&self) -> ZkYieldResult<VaultService> {
        Ok(VaultService::new(
            self.orchestrator(),
            self.transactions.clone(),
            self.config.contracts.addresses(),
            self.config.vault.min_deposit_amount()?,
        ))
    }
}
