//! In-memory doubles for the prover and the chain.

use crate::contracts::{
    ContractCall, ContractFunction, TransactionLayer, TxHash, TxReceipt, VaultSnapshot,
};
use async_trait::async_trait;
use num_bigint::BigUint;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zkyield_crypto::{CircuitInputs, CircuitKind, FieldInt, Proof, ProofGenerator, ProvingBackend};
use zkyield_types::{EthAddress, TokenAmount, ZkYieldError, ZkYieldResult};

/// Checks the same predicates as the real circuits and returns a dummy proof.
pub struct MockBackend {
    pub calls: AtomicUsize,
    delay: Duration,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn generator(backend: &Arc<MockBackend>) -> ProofGenerator {
    ProofGenerator::new(backend.clone())
}

#[async_trait]
impl ProvingBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn prove(&self, inputs: CircuitInputs) -> ZkYieldResult<Proof> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let satisfied = match inputs.kind {
            CircuitKind::Kyc => {
                inputs.jurisdiction_code != 0
                    && FieldInt::from_u64(inputs.jurisdiction_code) == inputs.public_param
            }
            CircuitKind::Balance => inputs.credential_hash >= inputs.public_param,
        };
        if !satisfied {
            return Err(ZkYieldError::ProofGeneration(format!(
                "Inputs violate the {} circuit constraints",
                inputs.kind
            )));
        }

        let n = |v: u32| BigUint::from(v);
        Ok(Proof {
            kind: inputs.kind,
            a: [n(1), n(2)],
            b: [[n(3), n(4)], [n(5), n(6)]],
            c: [n(7), n(8)],
            public_signals: inputs.public_signals(),
        })
    }

    async fn verify(&self, proof: &Proof) -> ZkYieldResult<bool> {
        Ok(proof.public_signals.len() == proof.kind.num_public_inputs())
    }
}

#[derive(Default)]
struct MockChain {
    balance: TokenAmount,
    allowed_jurisdiction: u64,
    compliant: bool,
    shares: u128,
    total_shares: u128,
    tvl: TokenAmount,
    reject_submits: usize,
    revert_receipts: usize,
    failed_balance_reads: usize,
    pending: HashMap<TxHash, ContractCall>,
    sent: Vec<ContractCall>,
    nonce: u8,
}

/// Chain double. Deposits mint shares one-to-one with wei.
pub struct MockTransactionLayer {
    account: Option<EthAddress>,
    tx_delay: Duration,
    chain: Mutex<MockChain>,
    pub submits: AtomicUsize,
    pub balance_reads: AtomicUsize,
    pub jurisdiction_reads: AtomicUsize,
    pub snapshot_reads: AtomicUsize,
}

impl MockTransactionLayer {
    pub fn new() -> Self {
        Self {
            account: Some(EthAddress::from_bytes([0x1f; 20])),
            tx_delay: Duration::ZERO,
            chain: Mutex::new(MockChain {
                balance: TokenAmount::ether("1").unwrap(),
                allowed_jurisdiction: 1,
                ..MockChain::default()
            }),
            submits: AtomicUsize::new(0),
            balance_reads: AtomicUsize::new(0),
            jurisdiction_reads: AtomicUsize::new(0),
            snapshot_reads: AtomicUsize::new(0),
        }
    }

    pub fn without_wallet(mut self) -> Self {
        self.account = None;
        self
    }

    pub fn with_tx_delay(mut self, delay: Duration) -> Self {
        self.tx_delay = delay;
        self
    }

    pub fn with_balance(self, balance: TokenAmount) -> Self {
        self.chain.lock().unwrap().balance = balance;
        self
    }

    pub fn with_allowed_jurisdiction(self, code: u64) -> Self {
        self.chain.lock().unwrap().allowed_jurisdiction = code;
        self
    }

    pub fn with_position(self, shares: u128, total_shares: u128, tvl: TokenAmount) -> Self {
        {
            let mut chain = self.chain.lock().unwrap();
            chain.shares = shares;
            chain.total_shares = total_shares;
            chain.tvl = tvl;
        }
        self
    }

    /// The next `n` submissions are rejected by the wallet.
    pub fn reject_next(&self, n: usize) {
        self.chain.lock().unwrap().reject_submits = n;
    }

    /// The next `n` balance reads fail at the RPC.
    pub fn fail_balance_reads(&self, n: usize) {
        self.chain.lock().unwrap().failed_balance_reads = n;
    }

    /// The next `n` mined transactions revert.
    pub fn revert_next(&self, n: usize) {
        self.chain.lock().unwrap().revert_receipts = n;
    }

    pub fn sent(&self) -> Vec<ContractCall> {
        self.chain.lock().unwrap().sent.clone()
    }

    pub fn external_calls(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
            + self.balance_reads.load(Ordering::SeqCst)
            + self.jurisdiction_reads.load(Ordering::SeqCst)
            + self.snapshot_reads.load(Ordering::SeqCst)
    }

    fn apply(chain: &mut MockChain, call: &ContractCall) {
        match &call.function {
            ContractFunction::GrantCompliance { .. } => chain.compliant = true,
            ContractFunction::Deposit { .. } => {
                chain.shares += call.value.raw;
                chain.total_shares += call.value.raw;
                chain.tvl.raw += call.value.raw;
                chain.balance.raw = chain.balance.raw.saturating_sub(call.value.raw);
            }
            ContractFunction::Withdraw { shares } => {
                let shares = *shares;
                let value = if chain.total_shares == 0 {
                    0
                } else {
                    shares * chain.tvl.raw / chain.total_shares
                };
                chain.shares -= shares;
                chain.total_shares -= shares;
                chain.tvl.raw -= value;
                chain.balance.raw += value;
            }
        }
    }
}

#[async_trait]
impl TransactionLayer for MockTransactionLayer {
    fn account(&self) -> ZkYieldResult<EthAddress> {
        self.account
            .ok_or_else(|| ZkYieldError::Transaction("No wallet configured".into()))
    }

    async fn native_balance(&self, _account: &EthAddress) -> ZkYieldResult<TokenAmount> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        let mut chain = self.chain.lock().unwrap();
        if chain.failed_balance_reads > 0 {
            chain.failed_balance_reads -= 1;
            return Err(ZkYieldError::Chain("eth_getBalance timed out".into()));
        }
        Ok(chain.balance)
    }

    async fn submit(&self, call: ContractCall) -> ZkYieldResult<TxHash> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        if !self.tx_delay.is_zero() {
            tokio::time::sleep(self.tx_delay).await;
        }
        let mut chain = self.chain.lock().unwrap();
        chain.sent.push(call.clone());
        if chain.reject_submits > 0 {
            chain.reject_submits -= 1;
            return Err(ZkYieldError::Transaction("User rejected the request".into()));
        }
        chain.nonce = chain.nonce.wrapping_add(1);
        let hash = TxHash([chain.nonce; 32]);
        chain.pending.insert(hash, call);
        Ok(hash)
    }

    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> ZkYieldResult<TxReceipt> {
        let mut chain = self.chain.lock().unwrap();
        let call = chain
            .pending
            .remove(tx_hash)
            .ok_or_else(|| ZkYieldError::Transaction(format!("Unknown transaction {}", tx_hash)))?;
        if chain.revert_receipts > 0 {
            chain.revert_receipts -= 1;
            return Err(ZkYieldError::Transaction(format!(
                "Transaction reverted: {}",
                tx_hash
            )));
        }
        Self::apply(&mut chain, &call);
        Ok(TxReceipt {
            tx_hash: *tx_hash,
            block_number: Some(34594949 + u64::from(chain.nonce)),
            gas_used: Some(210_000),
        })
    }

    async fn allowed_jurisdiction(&self) -> ZkYieldResult<u64> {
        self.jurisdiction_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain.lock().unwrap().allowed_jurisdiction)
    }

    async fn is_compliant(&self, _account: &EthAddress) -> ZkYieldResult<bool> {
        Ok(self.chain.lock().unwrap().compliant)
    }

    async fn vault_snapshot(&self, _account: &EthAddress) -> ZkYieldResult<VaultSnapshot> {
        self.snapshot_reads.fetch_add(1, Ordering::SeqCst);
        let chain = self.chain.lock().unwrap();
        Ok(VaultSnapshot {
            shares: chain.shares,
            total_shares: chain.total_shares,
            tvl: chain.tvl,
        })
    }
}
