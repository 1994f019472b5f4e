use super::client::{field_word, proof_words, u256_to_u128};
use super::*;
use ethers::types::U256;
use num_bigint::BigUint;
use zkyield_crypto::{ContractProof, FieldInt};
use zkyield_types::{EthAddress, TokenAmount, ZkYieldError};

fn sample_proof() -> ContractProof {
    let n = |v: u64| BigUint::from(v);
    ContractProof {
        a: [n(1), n(2)],
        b: [[n(3), n(4)], [n(5), n(6)]],
        c: [n(7), n(8)],
    }
}

#[test]
fn test_deployed_addresses() {
    let addresses = ContractAddresses::base_sepolia();
    assert_eq!(
        hex::encode(addresses.compliance_manager.as_bytes()),
        "b7f565874dcb0f4b5718490d25f9a7ebc8240a86"
    );
    assert_eq!(
        addresses.balance_verifier.to_hex(),
        "0x6b52359bf7cd14fbccacdb4fb1a4f8deaf147bca"
    );
    assert!(EthAddress::from_hex(DEPLOYER).is_ok());
    assert_eq!(DEPLOYMENT_BLOCK, 34594949);
}

#[test]
fn test_explorer_links() {
    let addresses = ContractAddresses::base_sepolia();
    assert_eq!(
        explorer_address_link("https://sepolia.basescan.org/", &addresses.strategy_vault),
        "https://sepolia.basescan.org/address/0xcf58a15e61ca885cbb158e8ea8c2224c59d8ba45"
    );
    let tx = TxHash([0xab; 32]);
    assert!(explorer_tx_link(default_explorer(), &tx.to_hex()).ends_with(&"ab".repeat(32)));
}

#[test]
fn test_function_selectors() {
    let withdraw = ContractFunction::Withdraw { shares: 1 };
    assert_eq!(hex::encode(withdraw.selector()), "2e1a7d4d");

    let grant = ContractFunction::GrantCompliance {
        proof: sample_proof(),
        commitment: FieldInt::from_u64(1),
    };
    let deposit = ContractFunction::Deposit {
        proof: sample_proof(),
        commitment: FieldInt::from_u64(1),
    };
    assert_eq!(grant.name(), "grantCompliance");
    assert_ne!(grant.selector(), deposit.selector());
}

#[test]
fn test_call_builders_target_the_right_contract() {
    let addresses = ContractAddresses::base_sepolia();
    let value = TokenAmount::ether("0.01").unwrap();

    let grant = ContractCall::grant_compliance(&addresses, sample_proof(), FieldInt::from_u64(9));
    assert_eq!(grant.to, addresses.compliance_manager);
    assert!(grant.value.is_zero());

    let deposit = ContractCall::deposit(&addresses, sample_proof(), FieldInt::from_u64(9), value);
    assert_eq!(deposit.to, addresses.strategy_vault);
    assert_eq!(deposit.value, value);

    let withdraw = ContractCall::withdraw(&addresses, 42);
    assert_eq!(withdraw.function, ContractFunction::Withdraw { shares: 42 });
    assert!(withdraw.value.is_zero());
}

#[test]
fn test_proof_words_keep_layout() {
    let (a, b, c) = proof_words(&sample_proof()).unwrap();
    assert_eq!(a, [U256::from(1), U256::from(2)]);
    assert_eq!(b, [[U256::from(3), U256::from(4)], [U256::from(5), U256::from(6)]]);
    assert_eq!(c, [U256::from(7), U256::from(8)]);
}

#[test]
fn test_oversized_word_rejected() {
    let mut proof = sample_proof();
    proof.a[0] = BigUint::from(1u8) << 256;
    assert!(matches!(proof_words(&proof), Err(ZkYieldError::Serialization(_))));
}

#[test]
fn test_field_word() {
    assert_eq!(field_word(&FieldInt::from_u64(7275757275)), U256::from(7275757275u64));
}

#[test]
fn test_u256_narrowing() {
    assert_eq!(u256_to_u128(U256::from(5), "x").unwrap(), 5);
    assert!(u256_to_u128(U256::from(u128::MAX) + U256::one(), "x").is_err());
}

#[test]
fn test_tx_hash_hex() {
    let hash = TxHash([0x11; 32]);
    let parsed = TxHash::from_hex(&hash.to_hex()).unwrap();
    assert_eq!(parsed, hash);
    assert!(TxHash::from_hex("0x1234").is_err());
    assert_eq!(serde_json::to_string(&hash).unwrap(), format!("\"{}\"", hash.to_hex()));
}

#[tokio::test]
async fn test_layer_without_connection() {
    let layer = EvmTransactionLayer::new(
        "http://localhost:8545",
        84532,
        ContractAddresses::base_sepolia(),
    );
    assert!(!layer.is_connected());
    assert!(matches!(layer.account(), Err(ZkYieldError::Transaction(_))));
    assert!(matches!(
        layer.allowed_jurisdiction().await,
        Err(ZkYieldError::Chain(_))
    ));
}

#[test]
fn test_set_wallet_requires_connection() {
    let mut layer = EvmTransactionLayer::new(
        "http://localhost:8545",
        84532,
        ContractAddresses::base_sepolia(),
    );
    assert!(layer
        .set_wallet("0x0123456789012345678901234567890123456789012345678901234567890123")
        .is_err());
}
