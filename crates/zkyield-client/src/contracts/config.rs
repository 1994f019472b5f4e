use zkyield_types::{EthAddress, DEFAULT_EXPLORER_URL};

pub const NETWORK_NAME: &str = "Base Sepolia";

pub const COMPLIANCE_MANAGER_SEPOLIA: &str = "0xb7f565874DcB0F4B5718490D25f9A7Ebc8240A86";

pub const STRATEGY_VAULT_SEPOLIA: &str = "0xcF58A15E61CA885cbb158e8Ea8c2224C59D8BA45";

pub const KYC_VERIFIER_SEPOLIA: &str = "0x75aB70aB18665FAf84171952d84A2E122cE12e24";

pub const BALANCE_VERIFIER_SEPOLIA: &str = "0x6B52359bF7Cd14FbCcAcdb4fb1a4F8DEaF147BcA";

pub const DEPLOYMENT_BLOCK: u64 = 34594949;

pub const DEPLOYMENT_DATE: &str = "2025-12-05";

pub const DEPLOYER: &str = "0x1F74796415c43b67230f4FE52549f600D6988A0e";

/// Parses one of the constants above. They are checked by tests, so a
/// zero address here only appears if a constant is edited badly, and
/// `ClientConfig::validate` refuses it.
pub(crate) fn deployed(hex: &str) -> EthAddress {
    EthAddress::from_hex(hex).unwrap_or_default()
}

/// The four deployed contracts the client talks to or links to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractAddresses {
    pub compliance_manager: EthAddress,
    pub strategy_vault: EthAddress,
    pub kyc_verifier: EthAddress,
    pub balance_verifier: EthAddress,
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self::base_sepolia()
    }
}

impl ContractAddresses {
    pub fn base_sepolia() -> Self {
        Self {
            compliance_manager: deployed(COMPLIANCE_MANAGER_SEPOLIA),
            strategy_vault: deployed(STRATEGY_VAULT_SEPOLIA),
            kyc_verifier: deployed(KYC_VERIFIER_SEPOLIA),
            balance_verifier: deployed(BALANCE_VERIFIER_SEPOLIA),
        }
    }

    pub fn entries(&self) -> [(&'static str, EthAddress); 4] {
        [
            ("compliance_manager", self.compliance_manager),
            ("strategy_vault", self.strategy_vault),
            ("kyc_verifier", self.kyc_verifier),
            ("balance_verifier", self.balance_verifier),
        ]
    }
}

pub fn explorer_address_link(explorer: &str, address: &EthAddress) -> String {
    format!("{}/address/{}", explorer.trim_end_matches('/'), address.to_hex())
}

pub fn explorer_tx_link(explorer: &str, tx_hash: &str) -> String {
    format!("{}/tx/{}", explorer.trim_end_matches('/'), tx_hash)
}

pub fn default_explorer() -> &'static str {
    DEFAULT_EXPLORER_URL
}
