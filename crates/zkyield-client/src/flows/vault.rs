use crate::contracts::{ContractAddresses, ContractCall, TransactionLayer, TxReceipt, VaultSnapshot};
use crate::submission::{
    EventBus, ProofRequest, SubmissionEvent, SubmissionIntent, SubmissionOrchestrator,
    SubmissionPhase,
};
use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};
use zkyield_crypto::Credential;
use zkyield_types::{EthAddress, TokenAmount, ZkYieldError, ZkYieldResult};

/// Share counts above this are shown in ether units.
const SHARE_DISPLAY_CUTOFF: u128 = 1_000_000_000_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Fresh,
    Stale,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VaultPosition {
    pub account: EthAddress,
    pub shares: u128,
    pub total_shares: u128,
    pub tvl: TokenAmount,
    pub freshness: Freshness,
    pub fetched_at: DateTime<Utc>,
}

impl VaultPosition {
    pub fn from_snapshot(account: EthAddress, snapshot: VaultSnapshot, fetched_at: DateTime<Utc>) -> Self {
        Self {
            account,
            shares: snapshot.shares,
            total_shares: snapshot.total_shares,
            tvl: snapshot.tvl,
            freshness: Freshness::Fresh,
            fetched_at,
        }
    }

    pub fn has_shares(&self) -> bool {
        self.shares > 0
    }

    /// `shares * tvl / total_shares`, zero when the vault has no shares.
    pub fn user_value(&self) -> TokenAmount {
        if self.shares == 0 || self.total_shares == 0 {
            return TokenAmount::zero(self.tvl.decimals);
        }
        let value =
            U256::from(self.shares) * U256::from(self.tvl.raw) / U256::from(self.total_shares);
        let raw = if value > U256::from(u128::MAX) {
            u128::MAX
        } else {
            value.as_u128()
        };
        TokenAmount::from_raw(raw, self.tvl.decimals)
    }

    pub fn display_shares(&self) -> String {
        if self.shares > SHARE_DISPLAY_CUTOFF {
            TokenAmount::wei(self.shares).to_fixed(4)
        } else {
            self.shares.to_string()
        }
    }
}

/// Cached position, invalidated only by confirmed deposit or withdraw
/// events from the bus.
struct PositionTracker {
    events: Mutex<broadcast::Receiver<SubmissionEvent>>,
    cached: RwLock<Option<VaultPosition>>,
}

impl PositionTracker {
    fn new(events: &EventBus) -> Self {
        Self {
            events: Mutex::new(events.subscribe()),
            cached: RwLock::new(None),
        }
    }

    async fn sync_events(&self) {
        let mut receiver = self.events.lock().await;
        let mut stale = false;
        loop {
            match receiver.try_recv() {
                Ok(event) => stale |= event.touches_vault(),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Position tracker skipped {} events", skipped);
                    stale = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        drop(receiver);

        if stale {
            if let Some(position) = self.cached.write().await.as_mut() {
                debug!("Vault position marked stale");
                position.freshness = Freshness::Stale;
            }
        }
    }
}

/// Balance-proof-gated deposits and share withdrawals.
pub struct VaultService {
    orchestrator: SubmissionOrchestrator,
    transactions: Arc<dyn TransactionLayer>,
    addresses: ContractAddresses,
    min_deposit: TokenAmount,
    events: EventBus,
    pending_deposit: RwLock<Option<TokenAmount>>,
    tracker: PositionTracker,
}

impl VaultService {
    pub fn new(
        orchestrator: SubmissionOrchestrator,
        transactions: Arc<dyn TransactionLayer>,
        addresses: ContractAddresses,
        min_deposit: TokenAmount,
    ) -> Self {
        let events = orchestrator.events().clone();
        let tracker = PositionTracker::new(&events);
        Self {
            orchestrator,
            transactions,
            addresses,
            min_deposit,
            events,
            pending_deposit: RwLock::new(None),
            tracker,
        }
    }

    pub fn orchestrator(&self) -> &SubmissionOrchestrator {
        &self.orchestrator
    }

    pub fn min_deposit(&self) -> TokenAmount {
        self.min_deposit
    }

    /// Parses an ether amount and enforces the minimum. Purely local.
    pub fn check_deposit(&self, amount: &str) -> ZkYieldResult<TokenAmount> {
        let amount = TokenAmount::ether(amount)?;
        if amount < self.min_deposit {
            return Err(ZkYieldError::InputValidation(format!(
                "Minimum: {} ETH",
                self.min_deposit.to_decimal()
            )));
        }
        Ok(amount)
    }

    /// Proves the wallet holds at least the minimum, then deposits `amount`
    /// with the proof attached.
    pub async fn deposit(&self, amount: &str) -> ZkYieldResult<TxReceipt> {
        let amount = self.check_deposit(amount)?;
        let account = self.transactions.account()?;

        if self.orchestrator.phase().await != SubmissionPhase::ProofPending {
            self.orchestrator.reset().await?;
        }
        *self.pending_deposit.write().await = None;

        let balance = self.transactions.native_balance(&account).await?;
        if balance < amount {
            return Err(ZkYieldError::InputValidation(format!(
                "Insufficient balance: {} ETH available",
                balance.to_fixed(4)
            )));
        }

        info!(amount = %amount, threshold = %self.min_deposit, "Generating balance proof");
        let credential = Credential::for_balance(&balance);
        self.orchestrator
            .generate(
                &credential,
                ProofRequest::Balance {
                    threshold: self.min_deposit,
                },
            )
            .await?;

        *self.pending_deposit.write().await = Some(amount);
        self.submit_deposit(amount).await
    }

    /// Resends the last deposit with its retained proof.
    pub async fn retry_deposit(&self) -> ZkYieldResult<TxReceipt> {
        let amount = self
            .pending_deposit
            .read()
            .await
            .ok_or_else(|| ZkYieldError::InputValidation("No deposit awaiting retry".into()))?;
        self.submit_deposit(amount).await
    }

    /// Resends the retained proof when one is waiting. Otherwise nothing
    /// was proven yet and the deposit starts over.
    pub async fn resume_deposit(&self, amount: &str) -> ZkYieldResult<TxReceipt> {
        let retained = self.pending_deposit.read().await.is_some()
            && self.orchestrator.phase().await == SubmissionPhase::ProofReady;
        if retained {
            self.retry_deposit().await
        } else {
            debug!("No retained deposit proof, starting over");
            self.deposit(amount).await
        }
    }

    async fn submit_deposit(&self, amount: TokenAmount) -> ZkYieldResult<TxReceipt> {
        let receipt = self
            .orchestrator
            .submit(SubmissionIntent::Deposit { value: amount })
            .await?;
        *self.pending_deposit.write().await = None;
        Ok(receipt)
    }

    /// Burns `shares`, or every share the account holds when `None`.
    pub async fn withdraw(&self, shares: Option<u128>) -> ZkYieldResult<TxReceipt> {
        if shares == Some(0) {
            return Err(ZkYieldError::InputValidation(
                "Shares to withdraw must be positive".into(),
            ));
        }
        self.transactions.account()?;

        let shares = match shares {
            Some(n) => n,
            None => self.position().await?.shares,
        };
        if shares == 0 {
            return Err(ZkYieldError::InputValidation("No shares to withdraw".into()));
        }

        let call = ContractCall::withdraw(&self.addresses, shares);
        let function = call.function.name();
        let tx_hash = self.transactions.submit(call).await?;
        self.events
            .publish(SubmissionEvent::Submitted { function, tx_hash });

        match self.transactions.wait_for_receipt(&tx_hash).await {
            Ok(receipt) => {
                info!(shares, "Withdrawal confirmed: {}", tx_hash);
                self.events.publish(SubmissionEvent::Confirmed {
                    function,
                    tx_hash,
                    block_number: receipt.block_number,
                    confirmed_at: Utc::now(),
                });
                Ok(receipt)
            }
            Err(e) => {
                warn!("Withdrawal failed: {}", e);
                self.events.publish(SubmissionEvent::SubmissionFailed {
                    function,
                    error: e.clone(),
                });
                Err(e)
            }
        }
    }

    /// Last known position after applying pending events. No chain reads.
    pub async fn cached_position(&self) -> Option<VaultPosition> {
        self.tracker.sync_events().await;
        self.tracker.cached.read().await.clone()
    }

    /// Cached position if still fresh, otherwise re-read from the vault.
    pub async fn position(&self) -> ZkYieldResult<VaultPosition> {
        if let Some(position) = self.cached_position().await {
            if position.freshness == Freshness::Fresh {
                return Ok(position);
            }
        }
        self.refresh_position().await
    }

    pub async fn refresh_position(&self) -> ZkYieldResult<VaultPosition> {
        let account = self.transactions.account()?;
        let snapshot = self.transactions.vault_snapshot(&account).await?;
        let position = VaultPosition::from_snapshot(account, snapshot, Utc::now());
        debug!(shares = position.shares, tvl = %position.tvl, "Vault position fetched");
        *self.tracker.cached.write().await = Some(position.clone());
        Ok(position)
    }
}
