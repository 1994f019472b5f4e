#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod address;
pub mod amount;
pub mod error;
pub mod jurisdiction;

pub use address::EthAddress;
pub use amount::TokenAmount;
pub use error::{ErrorCategory, ZkYieldError, ZkYieldResult};
pub use jurisdiction::Jurisdiction;

pub const ETH_ADDRESS_SIZE: usize = 20;

pub const ETH_DECIMALS: u8 = 18;

/// Every credential hash, salt and commitment is reduced below `2^253`.
pub const FIELD_BOUND_BITS: u32 = 253;

/// Multiplier of the credential-hash accumulator.
pub const CREDENTIAL_HASH_MULTIPLIER: u64 = 31;

pub const SALT_SIZE: usize = 32;

/// Base Sepolia.
pub const DEFAULT_CHAIN_ID: u64 = 84532;

pub const DEFAULT_RPC_URL: &str = "https://sepolia.base.org";

pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.basescan.org";

pub const DEFAULT_MIN_DEPOSIT: &str = "0.001";

pub const DEFAULT_PROOF_TIMEOUT_SECS: u64 = 60;
