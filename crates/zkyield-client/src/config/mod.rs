mod client;
mod constants;
mod logging;
mod sections;
mod types;

pub use client::ClientConfig;
pub use constants::*;
pub use logging::LoggingConfig;
pub use sections::{ContractsConfig, KycConfig, NetworkConfig, ProverConfig, VaultConfig};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use zkyield_crypto::ArtifactSource;
    use zkyield_types::{EthAddress, Jurisdiction, TokenAmount};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_validation() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.network.chain_id, 84532);
        assert_eq!(config.prover.proof_timeout_secs, 60);
        assert_eq!(
            config.vault.min_deposit_amount().unwrap(),
            TokenAmount::ether("0.001").unwrap()
        );
    }

    #[test]
    fn test_deployed_addresses_parse() {
        let config = ClientConfig::default();
        assert_eq!(
            config.contracts.strategy_vault.to_hex(),
            "0xcf58a15e61ca885cbb158e8ea8c2224c59d8ba45"
        );
        for (_, address) in config.contracts.addresses().entries() {
            assert!(!address.is_zero());
        }
    }

    #[test]
    fn test_invalid_rpc_url() {
        let mut config = ClientConfig::default();
        config.network.rpc_url = "sepolia.base.org".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_contract_address_rejected() {
        let mut config = ClientConfig::default();
        config.contracts.compliance_manager = EthAddress::zero();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_proof_timeout_bounds() {
        let mut config = ClientConfig::default();
        config.prover.proof_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.prover.proof_timeout_secs = MAX_PROOF_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());
        config.prover.proof_timeout_secs = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_min_deposit_must_parse_and_be_positive() {
        let mut config = ClientConfig::default();
        config.vault.min_deposit = "abc".into();
        assert!(config.validate().is_err());
        config.vault.min_deposit = "0".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ClientConfig::default();
        config.apply_overrides(lookup(&[
            ("ZKYIELD_RPC_URL", "http://localhost:8545"),
            ("ZKYIELD_CHAIN_ID", "31337"),
            ("ZKYIELD_PROOF_TIMEOUT_SECS", "90"),
            ("ZKYIELD_MIN_DEPOSIT", "0.01"),
            ("ZKYIELD_LOG_LEVEL", "DEBUG"),
            ("ZKYIELD_LOG_JSON", "1"),
        ]));
        assert_eq!(config.network.rpc_url, "http://localhost:8545");
        assert_eq!(config.network.chain_id, 31337);
        assert_eq!(config.prover.proof_timeout_secs, 90);
        assert_eq!(config.vault.min_deposit, "0.01");
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = ClientConfig::default();
        config.apply_overrides(lookup(&[
            ("ZKYIELD_CHAIN_ID", "base"),
            ("ZKYIELD_PROOF_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(config.network.chain_id, 84532);
        assert_eq!(config.prover.proof_timeout_secs, 60);
    }

    #[test]
    fn test_artifact_source_precedence() {
        let mut prover = ProverConfig::default();
        assert!(matches!(prover.artifact_source(), ArtifactSource::Directory(_)));

        prover.artifacts_url = Some("https://zkyield.finance/circuits".into());
        assert!(matches!(prover.artifact_source(), ArtifactSource::Remote(_)));

        prover.ephemeral = true;
        assert!(matches!(prover.artifact_source(), ArtifactSource::Ephemeral));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ClientConfig::default();
        config.kyc.allowed_jurisdiction = Some(Jurisdiction::Singapore);
        config.vault.min_deposit = "0.002".into();
        config.save(&path).unwrap();

        let loaded: ClientConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.kyc.allowed_jurisdiction, Some(Jurisdiction::Singapore));
        assert_eq!(loaded.vault.min_deposit, "0.002");
        assert_eq!(loaded.contracts.kyc_verifier, config.contracts.kyc_verifier);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [vault]
            min_deposit = "0.5"
            "#,
        )
        .unwrap();
        assert_eq!(config.vault.min_deposit, "0.5");
        assert_eq!(config.network.chain_id, 84532);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_warnings() {
        let mut config = ClientConfig::default();
        assert!(config.check_warnings().is_empty());

        config.prover.ephemeral = true;
        config.kyc.allowed_jurisdiction = Some(Jurisdiction::Us);
        let warnings = config.check_warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].severity, WarningSeverity::High);
    }
}
