use super::bindings::{ComplianceManager, StrategyVault};
use super::config::ContractAddresses;
use super::layer::{ContractCall, ContractFunction, TransactionLayer, TxHash, TxReceipt, VaultSnapshot};
use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, PendingTransaction, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, H256, U256},
};
use num_bigint::BigUint;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use zkyield_crypto::{ContractProof, FieldInt};
use zkyield_types::{EthAddress, TokenAmount, ZkYieldError, ZkYieldResult};

const RECEIPT_TIMEOUT: Duration = Duration::from_secs(180);

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

fn biguint_to_u256(value: &BigUint) -> ZkYieldResult<U256> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(ZkYieldError::Serialization(
            "Value does not fit in a uint256".into(),
        ));
    }
    Ok(U256::from_big_endian(&bytes))
}

pub(crate) fn u256_to_u128(value: U256, what: &str) -> ZkYieldResult<u128> {
    if value > U256::from(u128::MAX) {
        return Err(ZkYieldError::Chain(format!("{} overflows u128", what)));
    }
    Ok(value.as_u128())
}

/// `(a, b, c)` as ABI words.
pub(crate) type ProofWords = ([U256; 2], [[U256; 2]; 2], [U256; 2]);

pub(crate) fn proof_words(proof: &ContractProof) -> ZkYieldResult<ProofWords> {
    let pair = |p: &[BigUint; 2]| -> ZkYieldResult<[U256; 2]> {
        Ok([biguint_to_u256(&p[0])?, biguint_to_u256(&p[1])?])
    };
    Ok((
        pair(&proof.a)?,
        [pair(&proof.b[0])?, pair(&proof.b[1])?],
        pair(&proof.c)?,
    ))
}

pub(crate) fn field_word(value: &FieldInt) -> U256 {
    U256::from_big_endian(&value.to_bytes_be())
}

fn to_address(address: &EthAddress) -> Address {
    Address::from_slice(address.as_bytes())
}

/// `TransactionLayer` over an HTTP JSON-RPC provider and a local signer.
pub struct EvmTransactionLayer {
    provider_url: String,
    provider: Option<Arc<Provider<Http>>>,
    signer: Option<Arc<SignerClient>>,
    addresses: ContractAddresses,
    chain_id: u64,
}

impl EvmTransactionLayer {
    pub fn new(provider_url: impl Into<String>, chain_id: u64, addresses: ContractAddresses) -> Self {
        Self {
            provider_url: provider_url.into(),
            provider: None,
            signer: None,
            addresses,
            chain_id,
        }
    }

    pub async fn connect(&mut self) -> ZkYieldResult<()> {
        info!("Connecting to RPC: {}", self.provider_url);

        let provider = Provider::<Http>::try_from(self.provider_url.as_str())
            .map_err(|e| ZkYieldError::Chain(format!("Failed to create provider: {}", e)))?;

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| ZkYieldError::Chain(format!("Failed to get chain ID: {}", e)))?;

        if chain_id.as_u64() != self.chain_id {
            return Err(ZkYieldError::Chain(format!(
                "Chain ID mismatch: expected {}, got {}",
                self.chain_id,
                chain_id.as_u64()
            )));
        }

        self.provider = Some(Arc::new(provider));
        info!("Connected to chain {}", self.chain_id);
        Ok(())
    }

    pub fn set_wallet(&mut self, private_key: &str) -> ZkYieldResult<EthAddress> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| ZkYieldError::Chain("Not connected".into()))?
            .clone();

        let wallet: LocalWallet = private_key
            .trim()
            .parse()
            .map_err(|e| ZkYieldError::Config(format!("Invalid private key: {}", e)))?;

        let wallet = wallet.with_chain_id(self.chain_id);
        let address = EthAddress::from_bytes(wallet.address().0);

        let client = SignerMiddleware::new((*provider).clone(), wallet);
        self.signer = Some(Arc::new(client));

        info!("Wallet set: {}", address);
        Ok(address)
    }

    pub fn is_connected(&self) -> bool {
        self.provider.is_some()
    }

    pub fn addresses(&self) -> &ContractAddresses {
        &self.addresses
    }

    fn provider(&self) -> ZkYieldResult<&Arc<Provider<Http>>> {
        self.provider
            .as_ref()
            .ok_or_else(|| ZkYieldError::Chain("Not connected".into()))
    }

    fn signer(&self) -> ZkYieldResult<&Arc<SignerClient>> {
        self.signer.as_ref().ok_or_else(|| {
            ZkYieldError::Transaction("No wallet configured. Set ZKYIELD_WALLET_KEY.".into())
        })
    }
}

#[async_trait]
impl TransactionLayer for EvmTransactionLayer {
    fn account(&self) -> ZkYieldResult<EthAddress> {
        let signer = self.signer()?;
        Ok(EthAddress::from_bytes(signer.address().0))
    }

    async fn native_balance(&self, account: &EthAddress) -> ZkYieldResult<TokenAmount> {
        let provider = self.provider()?;
        let balance = provider
            .get_balance(to_address(account), None)
            .await
            .map_err(|e| ZkYieldError::Chain(format!("Failed to get balance: {}", e)))?;
        Ok(TokenAmount::wei(u256_to_u128(balance, "Balance")?))
    }

    async fn submit(&self, call: ContractCall) -> ZkYieldResult<TxHash> {
        let signer = self.signer()?;
        let to = to_address(&call.to);
        let function = call.function.name();
        debug!(
            to = %call.to,
            function,
            selector = %hex::encode(call.function.selector()),
            value = %call.value,
            "Submitting contract call"
        );

        let tx_hash: H256 = match call.function {
            ContractFunction::GrantCompliance { proof, commitment } => {
                let (a, b, c) = proof_words(&proof)?;
                let manager = ComplianceManager::new(to, signer.clone());
                let tx = manager.grant_compliance(a, b, c, field_word(&commitment));
                let pending = tx
                    .send()
                    .await
                    .map_err(|e| ZkYieldError::Transaction(format!("grantCompliance rejected: {}", e)))?;
                *pending
            }
            ContractFunction::Deposit { proof, commitment } => {
                let (a, b, c) = proof_words(&proof)?;
                let vault = StrategyVault::new(to, signer.clone());
                let tx = vault
                    .deposit(a, b, c, field_word(&commitment))
                    .value(U256::from(call.value.raw));
                let pending = tx
                    .send()
                    .await
                    .map_err(|e| ZkYieldError::Transaction(format!("deposit rejected: {}", e)))?;
                *pending
            }
            ContractFunction::Withdraw { shares } => {
                let vault = StrategyVault::new(to, signer.clone());
                let tx = vault.withdraw(U256::from(shares));
                let pending = tx
                    .send()
                    .await
                    .map_err(|e| ZkYieldError::Transaction(format!("withdraw rejected: {}", e)))?;
                *pending
            }
        };

        let tx_hash = TxHash(tx_hash.0);
        info!("{} submitted: {}", function, tx_hash);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> ZkYieldResult<TxReceipt> {
        let provider = self.provider()?;
        let pending = PendingTransaction::new(H256::from(tx_hash.0), &**provider);

        let receipt = tokio::time::timeout(RECEIPT_TIMEOUT, pending)
            .await
            .map_err(|_| {
                ZkYieldError::Transaction(format!(
                    "Timed out after {}s waiting for {}",
                    RECEIPT_TIMEOUT.as_secs(),
                    tx_hash
                ))
            })?
            .map_err(|e| ZkYieldError::Transaction(format!("Failed to get receipt: {}", e)))?
            .ok_or_else(|| ZkYieldError::Transaction(format!("Transaction dropped: {}", tx_hash)))?;

        if receipt.status.map(|s| s.as_u64()) == Some(0) {
            warn!("Transaction reverted: {}", tx_hash);
            return Err(ZkYieldError::Transaction(format!(
                "Transaction reverted: {}",
                tx_hash
            )));
        }

        let block_number = receipt.block_number.map(|b| b.as_u64());
        info!("Transaction confirmed in block {:?}: {}", block_number, tx_hash);

        Ok(TxReceipt {
            tx_hash: *tx_hash,
            block_number,
            gas_used: receipt.gas_used.and_then(|g| u256_to_u128(g, "Gas").ok()),
        })
    }

    async fn allowed_jurisdiction(&self) -> ZkYieldResult<u64> {
        let provider = self.provider()?;
        let manager = ComplianceManager::new(to_address(&self.addresses.compliance_manager), provider.clone());

        let code = manager
            .allowed_jurisdiction()
            .call()
            .await
            .map_err(|e| ZkYieldError::Chain(format!("Failed to read allowed jurisdiction: {}", e)))?;

        if code > U256::from(u64::MAX) {
            return Err(ZkYieldError::Chain(format!(
                "Allowed jurisdiction out of range: {}",
                code
            )));
        }
        Ok(code.as_u64())
    }

    async fn is_compliant(&self, account: &EthAddress) -> ZkYieldResult<bool> {
        let provider = self.provider()?;
        let manager = ComplianceManager::new(to_address(&self.addresses.compliance_manager), provider.clone());

        manager
            .is_compliant(to_address(account))
            .call()
            .await
            .map_err(|e| ZkYieldError::Chain(format!("Failed to read compliance: {}", e)))
    }

    async fn vault_snapshot(&self, account: &EthAddress) -> ZkYieldResult<VaultSnapshot> {
        let provider = self.provider()?;
        let vault = StrategyVault::new(to_address(&self.addresses.strategy_vault), provider.clone());

        let shares = vault
            .shares(to_address(account))
            .call()
            .await
            .map_err(|e| ZkYieldError::Chain(format!("Failed to read shares: {}", e)))?;
        let total_shares = vault
            .total_shares()
            .call()
            .await
            .map_err(|e| ZkYieldError::Chain(format!("Failed to read total shares: {}", e)))?;
        let tvl = vault
            .total_value_locked()
            .call()
            .await
            .map_err(|e| ZkYieldError::Chain(format!("Failed to read TVL: {}", e)))?;

        Ok(VaultSnapshot {
            shares: u256_to_u128(shares, "Shares")?,
            total_shares: u256_to_u128(total_shares, "Total shares")?,
            tvl: TokenAmount::wei(u256_to_u128(tvl, "TVL")?),
        })
    }
}
