mod bindings;
mod client;
mod config;
mod layer;

pub use bindings::{ComplianceManager, StrategyVault};
pub use client::EvmTransactionLayer;
pub use config::{
    default_explorer, explorer_address_link, explorer_tx_link, ContractAddresses,
    BALANCE_VERIFIER_SEPOLIA, COMPLIANCE_MANAGER_SEPOLIA, DEPLOYER, DEPLOYMENT_BLOCK,
    DEPLOYMENT_DATE, KYC_VERIFIER_SEPOLIA, NETWORK_NAME, STRATEGY_VAULT_SEPOLIA,
};
pub use layer::{
    ContractCall, ContractFunction, TransactionLayer, TxHash, TxReceipt, VaultSnapshot,
};

#[cfg(test)]
mod tests;
