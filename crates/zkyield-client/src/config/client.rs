use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use zkyield_types::{ZkYieldError, ZkYieldResult, DEFAULT_CHAIN_ID};

use super::constants::MAX_PROOF_TIMEOUT_SECS;
use super::logging::LoggingConfig;
use super::sections::{ContractsConfig, KycConfig, NetworkConfig, ProverConfig, VaultConfig};
use super::types::{ConfigWarning, LogLevel, WarningSeverity};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub network: NetworkConfig,
    pub contracts: ContractsConfig,
    pub prover: ProverConfig,
    pub vault: VaultConfig,
    pub kyc: KycConfig,
    pub logging: LoggingConfig,
}

impl ClientConfig {
    pub fn load(path: impl AsRef<Path>) -> ZkYieldResult<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ZkYieldError::Config(format!("Failed to read config: {}", e)))?;

            toml::from_str(&contents)
                .map_err(|e| ZkYieldError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ZkYieldResult<()> {
        let contents = self.to_toml()?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ZkYieldError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path.as_ref(), contents)
            .map_err(|e| ZkYieldError::Config(format!("Failed to write config: {}", e)))?;

        info!("Configuration saved to {:?}", path.as_ref());
        Ok(())
    }

    pub fn to_toml(&self) -> ZkYieldResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ZkYieldError::Config(format!("Failed to serialize config: {}", e)))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Environment overrides, read through `lookup` so they can be exercised
    /// without touching the process environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rpc) = lookup("ZKYIELD_RPC_URL") {
            self.network.rpc_url = rpc;
        }

        if let Some(chain_id) = lookup("ZKYIELD_CHAIN_ID") {
            match chain_id.parse() {
                Ok(id) => self.network.chain_id = id,
                Err(_) => warn!("Ignoring invalid ZKYIELD_CHAIN_ID: {}", chain_id),
            }
        }

        if let Some(dir) = lookup("ZKYIELD_ARTIFACTS_DIR") {
            self.prover.artifacts_dir = dir.into();
        }

        if let Some(url) = lookup("ZKYIELD_ARTIFACTS_URL") {
            self.prover.artifacts_url = Some(url);
        }

        if let Some(secs) = lookup("ZKYIELD_PROOF_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(s) => self.prover.proof_timeout_secs = s,
                Err(_) => warn!("Ignoring invalid ZKYIELD_PROOF_TIMEOUT_SECS: {}", secs),
            }
        }

        if let Some(min) = lookup("ZKYIELD_MIN_DEPOSIT") {
            self.vault.min_deposit = min;
        }

        if let Some(level) = lookup("ZKYIELD_LOG_LEVEL") {
            self.logging.level = LogLevel::parse_lossy(&level);
        }

        if lookup("ZKYIELD_LOG_JSON").is_some() {
            self.logging.json = true;
        }
    }

    pub fn validate(&self) -> ZkYieldResult<()> {
        let rpc = &self.network.rpc_url;
        if !(rpc.starts_with("http://") || rpc.starts_with("https://")) {
            return Err(ZkYieldError::Config(format!(
                "RPC URL must be http(s): {}",
                rpc
            )));
        }

        if self.network.chain_id == 0 {
            return Err(ZkYieldError::Config("Chain ID cannot be 0".into()));
        }

        for (name, address) in self.contracts.addresses().entries() {
            if address.is_zero() {
                return Err(ZkYieldError::Config(format!(
                    "Contract address '{}' is not set",
                    name
                )));
            }
        }

        if self.prover.proof_timeout_secs == 0
            || self.prover.proof_timeout_secs > MAX_PROOF_TIMEOUT_SECS
        {
            return Err(ZkYieldError::Config(format!(
                "Proof timeout must be between 1 and {} seconds",
                MAX_PROOF_TIMEOUT_SECS
            )));
        }

        if let Some(url) = &self.prover.artifacts_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ZkYieldError::Config(format!(
                    "Artifacts URL must be http(s): {}",
                    url
                )));
            }
        }

        let min = self
            .vault
            .min_deposit_amount()
            .map_err(|e| ZkYieldError::Config(format!("Invalid min_deposit: {}", e)))?;
        if min.is_zero() {
            return Err(ZkYieldError::Config("Minimum deposit must be positive".into()));
        }

        Ok(())
    }

    pub fn check_warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.prover.ephemeral {
            warnings.push(ConfigWarning {
                severity: WarningSeverity::High,
                message: "Ephemeral proving keys are enabled. Proofs will not verify on chain.".into(),
                recommendation: "Set prover.ephemeral = false and point artifacts_dir at the deployed keys.".into(),
            });
        }

        if self.network.chain_id != DEFAULT_CHAIN_ID {
            warnings.push(ConfigWarning {
                severity: WarningSeverity::Medium,
                message: format!(
                    "Chain ID {} differs from the Base Sepolia deployment ({}).",
                    self.network.chain_id, DEFAULT_CHAIN_ID
                ),
                recommendation: "Override every contract address for the target chain.".into(),
            });
        }

        if self.kyc.allowed_jurisdiction.is_some() {
            warnings.push(ConfigWarning {
                severity: WarningSeverity::Low,
                message: "allowed_jurisdiction is pinned in config; the on-chain value is not read.".into(),
                recommendation: "Remove kyc.allowed_jurisdiction to follow the compliance manager.".into(),
            });
        }

        warnings
    }

    pub fn log_warnings(&self) {
        for warning in self.check_warnings() {
            match warning.severity {
                WarningSeverity::High => {
                    warn!("{}", warning.message);
                    warn!("  -> {}", warning.recommendation);
                }
                WarningSeverity::Medium => {
                    warn!("{}", warning.message);
                    info!("  -> {}", warning.recommendation);
                }
                WarningSeverity::Low => {
                    info!("Note: {}", warning.message);
                }
            }
        }
    }
}
