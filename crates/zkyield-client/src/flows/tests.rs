use super::*;
use crate::contracts::{ContractAddresses, ContractFunction};
use crate::submission::{EventBus, SubmissionOrchestrator, SubmissionPhase};
use crate::testing::{generator, MockBackend, MockTransactionLayer};
use chrono::Utc;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use zkyield_types::{EthAddress, Jurisdiction, TokenAmount, ZkYieldError};

const ONE_ETH: u128 = 1_000_000_000_000_000_000;

fn orchestrator(backend: &Arc<MockBackend>, chain: &Arc<MockTransactionLayer>) -> SubmissionOrchestrator {
    SubmissionOrchestrator::new(
        generator(backend),
        chain.clone(),
        ContractAddresses::base_sepolia(),
        EventBus::default(),
        Duration::from_secs(5),
    )
}

fn vault_with(chain: MockTransactionLayer) -> (Arc<MockBackend>, Arc<MockTransactionLayer>, VaultService) {
    let backend = MockBackend::new();
    let chain = Arc::new(chain);
    let service = VaultService::new(
        orchestrator(&backend, &chain),
        chain.clone(),
        ContractAddresses::base_sepolia(),
        TokenAmount::ether("0.001").unwrap(),
    );
    (backend, chain, service)
}

fn kyc_with(
    chain: MockTransactionLayer,
    allowed_override: Option<Jurisdiction>,
) -> (Arc<MockBackend>, Arc<MockTransactionLayer>, KycService) {
    let backend = MockBackend::new();
    let chain = Arc::new(chain);
    let service = KycService::new(orchestrator(&backend, &chain), chain.clone(), allowed_override);
    (backend, chain, service)
}

fn position(shares: u128, total_shares: u128, tvl: u128) -> VaultPosition {
    VaultPosition {
        account: EthAddress::from_bytes([0x1f; 20]),
        shares,
        total_shares,
        tvl: TokenAmount::wei(tvl),
        freshness: Freshness::Fresh,
        fetched_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_deposit_below_minimum_stays_local() {
    let (backend, chain, vault) = vault_with(MockTransactionLayer::new());

    let err = vault.deposit("0.0005").await.unwrap_err();
    match err {
        ZkYieldError::InputValidation(msg) => assert_eq!(msg, "Minimum: 0.001 ETH"),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(chain.external_calls(), 0);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_deposit_rejects_malformed_amount() {
    let (backend, chain, vault) = vault_with(MockTransactionLayer::new());

    assert!(matches!(
        vault.deposit("1.2.3").await,
        Err(ZkYieldError::InputValidation(_))
    ));
    assert_eq!(chain.external_calls(), 0);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_deposit_attaches_value_and_balance_proof() {
    let (backend, chain, vault) = vault_with(MockTransactionLayer::new());

    let receipt = vault.deposit("0.01").await.unwrap();
    assert_eq!(backend.calls(), 1);
    assert_eq!(chain.balance_reads.load(Ordering::SeqCst), 1);

    let sent = chain.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, ContractAddresses::base_sepolia().strategy_vault);
    assert_eq!(sent[0].value, TokenAmount::ether("0.01").unwrap());
    assert!(matches!(sent[0].function, ContractFunction::Deposit { .. }));

    let snapshot = vault.orchestrator().snapshot().await;
    assert_eq!(snapshot.phase, SubmissionPhase::Submitted);
    assert_eq!(snapshot.last_tx, Some(receipt.tx_hash));
}

#[tokio::test]
async fn test_deposit_exceeding_balance_is_rejected_before_proving() {
    let chain = MockTransactionLayer::new().with_balance(TokenAmount::ether("0.002").unwrap());
    let (backend, chain, vault) = vault_with(chain);

    let err = vault.deposit("0.5").await.unwrap_err();
    assert!(matches!(err, ZkYieldError::InputValidation(_)));
    assert_eq!(backend.calls(), 0);
    assert_eq!(chain.submits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_second_deposit_starts_new_attempt() {
    let (backend, chain, vault) = vault_with(MockTransactionLayer::new());

    vault.deposit("0.01").await.unwrap();
    vault.deposit("0.02").await.unwrap();

    assert_eq!(backend.calls(), 2);
    let sent = chain.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].value, TokenAmount::ether("0.02").unwrap());
}

#[tokio::test]
async fn test_resume_after_balance_read_failure_starts_over() {
    let (backend, chain, vault) = vault_with(MockTransactionLayer::new());

    chain.fail_balance_reads(1);
    let err = vault.deposit("0.01").await.unwrap_err();
    assert!(matches!(err, ZkYieldError::Chain(_)));
    assert_eq!(backend.calls(), 0);

    vault.resume_deposit("0.01").await.unwrap();
    assert_eq!(backend.calls(), 1);
    assert_eq!(chain.balance_reads.load(Ordering::SeqCst), 2);
    assert_eq!(chain.sent().len(), 1);
}

#[tokio::test]
async fn test_resume_reuses_retained_proof() {
    let (backend, chain, vault) = vault_with(MockTransactionLayer::new());

    chain.reject_next(1);
    assert!(vault.deposit("0.01").await.is_err());
    vault.resume_deposit("0.01").await.unwrap();

    assert_eq!(backend.calls(), 1);
    assert_eq!(chain.balance_reads.load(Ordering::SeqCst), 1);
    assert_eq!(chain.sent().len(), 2);
}

#[tokio::test]
async fn test_retry_deposit_reuses_proof() {
    let (backend, chain, vault) = vault_with(MockTransactionLayer::new());

    assert!(matches!(
        vault.retry_deposit().await,
        Err(ZkYieldError::InputValidation(_))
    ));

    chain.reject_next(1);
    let err = vault.deposit("0.01").await.unwrap_err();
    assert!(matches!(err, ZkYieldError::Transaction(_)));
    assert_eq!(
        vault.orchestrator().phase().await,
        SubmissionPhase::ProofReady
    );

    vault.retry_deposit().await.unwrap();
    assert_eq!(backend.calls(), 1);

    let sent = chain.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].function, sent[1].function);
    assert_eq!(sent[1].value, TokenAmount::ether("0.01").unwrap());
}

#[tokio::test]
async fn test_withdraw_zero_shares_is_local() {
    let (_, chain, vault) = vault_with(MockTransactionLayer::new());

    assert!(matches!(
        vault.withdraw(Some(0)).await,
        Err(ZkYieldError::InputValidation(_))
    ));
    assert_eq!(chain.external_calls(), 0);
}

#[tokio::test]
async fn test_withdraw_all_without_shares() {
    let (_, chain, vault) = vault_with(MockTransactionLayer::new());

    let err = vault.withdraw(None).await.unwrap_err();
    assert_eq!(err, ZkYieldError::InputValidation("No shares to withdraw".into()));
    assert_eq!(chain.snapshot_reads.load(Ordering::SeqCst), 1);
    assert_eq!(chain.submits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_withdraw_all_burns_every_share() {
    let chain = MockTransactionLayer::new().with_position(
        ONE_ETH / 2,
        ONE_ETH,
        TokenAmount::wei(2 * ONE_ETH),
    );
    let (_, chain, vault) = vault_with(chain);

    vault.withdraw(None).await.unwrap();
    let sent = chain.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, ContractAddresses::base_sepolia().strategy_vault);
    assert_eq!(
        sent[0].function,
        ContractFunction::Withdraw { shares: ONE_ETH / 2 }
    );

    let after = vault.position().await.unwrap();
    assert_eq!(after.shares, 0);
    assert_eq!(after.freshness, Freshness::Fresh);
    assert_eq!(chain.snapshot_reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_withdraw_without_wallet() {
    let (_, chain, vault) = vault_with(MockTransactionLayer::new().without_wallet());

    assert!(matches!(
        vault.withdraw(Some(10)).await,
        Err(ZkYieldError::Transaction(_))
    ));
    assert_eq!(chain.external_calls(), 0);
}

#[tokio::test]
async fn test_position_refetched_only_after_confirmation() {
    let (_, chain, vault) = vault_with(MockTransactionLayer::new());
    let reads = || chain.snapshot_reads.load(Ordering::SeqCst);

    assert!(vault.cached_position().await.is_none());
    let before = vault.position().await.unwrap();
    assert_eq!(before.shares, 0);
    assert_eq!(reads(), 1);

    // Cached while nothing changes.
    vault.position().await.unwrap();
    assert_eq!(reads(), 1);

    chain.revert_next(1);
    assert!(vault.deposit("0.01").await.is_err());
    let cached = vault.cached_position().await.unwrap();
    assert_eq!(cached.freshness, Freshness::Fresh);
    vault.position().await.unwrap();
    assert_eq!(reads(), 1);

    vault.retry_deposit().await.unwrap();
    let cached = vault.cached_position().await.unwrap();
    assert_eq!(cached.freshness, Freshness::Stale);
    assert_eq!(reads(), 1);

    let after = vault.position().await.unwrap();
    assert_eq!(reads(), 2);
    assert_eq!(after.freshness, Freshness::Fresh);
    assert_eq!(after.shares, TokenAmount::ether("0.01").unwrap().raw);
}

#[test]
fn test_user_value() {
    let pos = position(ONE_ETH, 4 * ONE_ETH, 2 * ONE_ETH);
    assert_eq!(pos.user_value(), TokenAmount::ether("0.5").unwrap());

    let empty_vault = position(ONE_ETH, 0, 2 * ONE_ETH);
    assert!(empty_vault.user_value().is_zero());

    let no_shares = position(0, 4 * ONE_ETH, 2 * ONE_ETH);
    assert!(no_shares.user_value().is_zero());
    assert!(!no_shares.has_shares());

    let large = position(u128::MAX / 2, u128::MAX / 2, u128::MAX / 2);
    assert_eq!(large.user_value().raw, u128::MAX / 2);
}

#[test]
fn test_display_shares() {
    assert_eq!(position(1_000, ONE_ETH, ONE_ETH).display_shares(), "1000");
    assert_eq!(
        position(3 * ONE_ETH / 2, 2 * ONE_ETH, ONE_ETH).display_shares(),
        "1.5000"
    );
}

#[tokio::test]
async fn test_kyc_empty_name_makes_no_calls() {
    let (backend, chain, kyc) = kyc_with(MockTransactionLayer::new(), None);

    let err = kyc.prepare("   ", Jurisdiction::Us).await.unwrap_err();
    assert_eq!(err, ZkYieldError::InputValidation("Please enter your name".into()));
    assert_eq!(chain.external_calls(), 0);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_kyc_override_skips_chain_read() {
    let (_, chain, kyc) = kyc_with(MockTransactionLayer::new(), Some(Jurisdiction::Eu));

    kyc.prepare("Alice", Jurisdiction::Eu).await.unwrap();
    assert_eq!(chain.jurisdiction_reads.load(Ordering::SeqCst), 0);
    assert_eq!(kyc.status().await.phase, SubmissionPhase::ProofReady);
}

#[tokio::test]
async fn test_kyc_jurisdiction_mismatch_fails_proof() {
    let (backend, chain, kyc) =
        kyc_with(MockTransactionLayer::new().with_allowed_jurisdiction(2), None);

    let err = kyc.prepare("Alice", Jurisdiction::Us).await.unwrap_err();
    assert!(matches!(err, ZkYieldError::ProofGeneration(_)));
    assert_eq!(chain.jurisdiction_reads.load(Ordering::SeqCst), 1);
    assert_eq!(backend.calls(), 1);

    let status = kyc.status().await;
    assert_eq!(status.phase, SubmissionPhase::ProofPending);
    assert_eq!(status.commitment, None);
}

#[tokio::test]
async fn test_kyc_submit_grants_compliance() {
    let (_, chain, kyc) = kyc_with(MockTransactionLayer::new(), None);

    assert!(!kyc.is_compliant().await.unwrap());
    let generated = kyc.prepare("Alice", Jurisdiction::Us).await.unwrap();
    kyc.submit().await.unwrap();

    assert!(kyc.is_compliant().await.unwrap());
    let status = kyc.status().await;
    assert_eq!(status.phase, SubmissionPhase::Submitted);
    assert_eq!(status.commitment, Some(generated.commitment));
    assert_eq!(chain.submits.load(Ordering::SeqCst), 1);

    kyc.reset().await.unwrap();
    assert_eq!(kyc.status().await.phase, SubmissionPhase::ProofPending);
}

#[tokio::test]
async fn test_kyc_load_then_submit_in_new_session() {
    let (_, _, first) = kyc_with(MockTransactionLayer::new(), None);
    let generated = first.prepare("Alice", Jurisdiction::Us).await.unwrap();

    let (backend, chain, second) = kyc_with(MockTransactionLayer::new(), None);
    second.load(generated).await.unwrap();
    second.submit().await.unwrap();

    assert_eq!(backend.calls(), 0);
    assert_eq!(chain.jurisdiction_reads.load(Ordering::SeqCst), 0);
    assert!(second.is_compliant().await.unwrap());
}
