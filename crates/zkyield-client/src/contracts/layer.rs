use super::config::ContractAddresses;
use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::fmt;
use zkyield_crypto::{ContractProof, FieldInt};
use zkyield_types::{EthAddress, TokenAmount, ZkYieldError, ZkYieldResult};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> ZkYieldResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)
            .map_err(|e| ZkYieldError::InputValidation(format!("Invalid tx hash: {}", e)))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ZkYieldError::InputValidation("Tx hash must be 32 bytes".into()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.to_hex())
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: Option<u128>,
}

/// Vault reads needed to price a position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VaultSnapshot {
    pub shares: u128,
    pub total_shares: u128,
    pub tvl: TokenAmount,
}

/// The three state-changing calls the client makes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractFunction {
    GrantCompliance {
        proof: ContractProof,
        commitment: FieldInt,
    },
    Deposit {
        proof: ContractProof,
        commitment: FieldInt,
    },
    Withdraw {
        shares: u128,
    },
}

impl ContractFunction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GrantCompliance { .. } => "grantCompliance",
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
        }
    }

    pub fn signature(&self) -> &'static str {
        match self {
            Self::GrantCompliance { .. } => {
                "grantCompliance(uint256[2],uint256[2][2],uint256[2],uint256)"
            }
            Self::Deposit { .. } => "deposit(uint256[2],uint256[2][2],uint256[2],uint256)",
            Self::Withdraw { .. } => "withdraw(uint256)",
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        ethers::utils::id(self.signature())
    }
}

/// `{address, function, args, value}` handed to the transaction layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCall {
    pub to: EthAddress,
    pub function: ContractFunction,
    pub value: TokenAmount,
}

impl ContractCall {
    pub fn grant_compliance(
        addresses: &ContractAddresses,
        proof: ContractProof,
        commitment: FieldInt,
    ) -> Self {
        Self {
            to: addresses.compliance_manager,
            function: ContractFunction::GrantCompliance { proof, commitment },
            value: TokenAmount::default(),
        }
    }

    pub fn deposit(
        addresses: &ContractAddresses,
        proof: ContractProof,
        commitment: FieldInt,
        value: TokenAmount,
    ) -> Self {
        Self {
            to: addresses.strategy_vault,
            function: ContractFunction::Deposit { proof, commitment },
            value,
        }
    }

    pub fn withdraw(addresses: &ContractAddresses, shares: u128) -> Self {
        Self {
            to: addresses.strategy_vault,
            function: ContractFunction::Withdraw { shares },
            value: TokenAmount::default(),
        }
    }
}

/// The wallet and chain collaborator. Submissions return as soon as the
/// transaction is accepted; `wait_for_receipt` resolves once it is mined.
#[async_trait]
pub trait TransactionLayer: Send + Sync {
    /// Signing account. Fails when no wallet is configured.
    fn account(&self) -> ZkYieldResult<EthAddress>;

    async fn native_balance(&self, account: &EthAddress) -> ZkYieldResult<TokenAmount>;

    async fn submit(&self, call: ContractCall) -> ZkYieldResult<TxHash>;

    /// A reverted transaction is an error, not a receipt.
    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> ZkYieldResult<TxReceipt>;

    async fn allowed_jurisdiction(&self) -> ZkYieldResult<u64>;

    async fn is_compliant(&self, account: &EthAddress) -> ZkYieldResult<bool>;

    async fn vault_snapshot(&self, account: &EthAddress) -> ZkYieldResult<VaultSnapshot>;
}
