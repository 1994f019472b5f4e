use crate::contracts::ContractAddresses;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use zkyield_crypto::ArtifactSource;
use zkyield_types::{
    EthAddress, Jurisdiction, TokenAmount, ZkYieldResult, DEFAULT_CHAIN_ID, DEFAULT_EXPLORER_URL,
    DEFAULT_MIN_DEPOSIT, DEFAULT_PROOF_TIMEOUT_SECS, DEFAULT_RPC_URL,
};

use super::constants::default_data_dir;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub explorer_url: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    pub compliance_manager: EthAddress,
    pub strategy_vault: EthAddress,
    pub kyc_verifier: EthAddress,
    pub balance_verifier: EthAddress,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        let deployed = ContractAddresses::base_sepolia();
        Self {
            compliance_manager: deployed.compliance_manager,
            strategy_vault: deployed.strategy_vault,
            kyc_verifier: deployed.kyc_verifier,
            balance_verifier: deployed.balance_verifier,
        }
    }
}

impl ContractsConfig {
    pub fn addresses(&self) -> ContractAddresses {
        ContractAddresses {
            compliance_manager: self.compliance_manager,
            strategy_vault: self.strategy_vault,
            kyc_verifier: self.kyc_verifier,
            balance_verifier: self.balance_verifier,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    /// Local directory holding `{circuit}.circuit.json`, `.pk.bin` and `.vk.json`.
    pub artifacts_dir: PathBuf,
    /// Static base URL for the same files. Takes precedence over the directory.
    pub artifacts_url: Option<String>,
    /// Generate throwaway keys in-process. Proofs made this way never verify on chain.
    pub ephemeral: bool,
    pub proof_timeout_secs: u64,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: default_data_dir().join("circuits"),
            artifacts_url: None,
            ephemeral: false,
            proof_timeout_secs: DEFAULT_PROOF_TIMEOUT_SECS,
        }
    }
}

impl ProverConfig {
    pub fn artifact_source(&self) -> ArtifactSource {
        if self.ephemeral {
            ArtifactSource::Ephemeral
        } else if let Some(url) = &self.artifacts_url {
            ArtifactSource::Remote(url.clone())
        } else {
            ArtifactSource::Directory(self.artifacts_dir.clone())
        }
    }

    pub fn proof_timeout(&self) -> Duration {
        Duration::from_secs(self.proof_timeout_secs)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Smallest deposit accepted, in ether. Also the balance-proof threshold.
    pub min_deposit: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            min_deposit: DEFAULT_MIN_DEPOSIT.to_string(),
        }
    }
}

impl VaultConfig {
    pub fn min_deposit_amount(&self) -> ZkYieldResult<TokenAmount> {
        TokenAmount::ether(&self.min_deposit)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KycConfig {
    /// Skips the `allowedJurisdiction()` read when set.
    pub allowed_jurisdiction: Option<Jurisdiction>,
}
