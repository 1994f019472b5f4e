//! Demo credential issuance.
//!
//! The hash below is a polynomial accumulator, not a cryptographic hash.
//! Credentials built from it offer no identity protection; a production
//! deployment must replace it with a collision-resistant sponge over `Fr`.

use crate::commitment::compute_commitment;
use crate::field::FieldInt;
use num_bigint::BigUint;
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};
use zkyield_types::{
    Jurisdiction, TokenAmount, ZkYieldError, ZkYieldResult, CREDENTIAL_HASH_MULTIPLIER, SALT_SIZE,
};

/// `hash = (hash * 31 + unit) mod 2^253` over the UTF-16 code units of `data`.
pub fn hash_str(data: &str) -> FieldInt {
    let mut hash = BigUint::default();
    for unit in data.encode_utf16() {
        hash = FieldInt::new(hash * CREDENTIAL_HASH_MULTIPLIER + u32::from(unit)).into_biguint();
    }
    FieldInt::new(hash)
}

/// Hash of `"{name}-{country}-{timestamp}"`.
pub fn hash_credential(name: &str, country: &str, timestamp: u64) -> FieldInt {
    hash_str(&format!("{}-{}-{}", name, country, timestamp))
}

/// 32 random bytes reduced into the commitment domain.
pub fn generate_salt() -> FieldInt {
    let mut bytes = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut bytes);
    let salt = FieldInt::from_bytes_be(&bytes);
    bytes.zeroize();
    salt
}

/// An unverified identity claim. Created per attempt, never persisted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    credential_hash: [u8; 32],
    salt: [u8; 32],
    jurisdiction_code: u64,
}

impl Credential {
    pub fn new(credential_hash: &FieldInt, salt: &FieldInt, jurisdiction_code: u64) -> Self {
        Self {
            credential_hash: credential_hash.to_bytes_be(),
            salt: salt.to_bytes_be(),
            jurisdiction_code,
        }
    }

    /// Issues a demo credential for `name`, stamped with the current time.
    pub fn mock(name: &str, jurisdiction: Jurisdiction) -> ZkYieldResult<Self> {
        let timestamp = chrono::Utc::now().timestamp_millis().max(0) as u64;
        Self::mock_at(name, jurisdiction, timestamp)
    }

    pub fn mock_at(name: &str, jurisdiction: Jurisdiction, timestamp: u64) -> ZkYieldResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ZkYieldError::InputValidation("Please enter your name".into()));
        }
        let hash = hash_credential(name, jurisdiction.country_code(), timestamp);
        Ok(Self::new(&hash, &generate_salt(), u64::from(jurisdiction.code())))
    }

    /// Credential whose hash slot carries a native balance in wei.
    pub fn for_balance(balance: &TokenAmount) -> Self {
        Self::new(
            &FieldInt::from_u128(balance.raw),
            &generate_salt(),
            u64::from(Jurisdiction::Us.code()),
        )
    }

    pub fn credential_hash(&self) -> FieldInt {
        FieldInt::from_bytes_be(&self.credential_hash)
    }

    pub fn salt(&self) -> FieldInt {
        FieldInt::from_bytes_be(&self.salt)
    }

    pub fn jurisdiction_code(&self) -> u64 {
        self.jurisdiction_code
    }

    pub fn commitment(&self) -> FieldInt {
        compute_commitment(&self.credential_hash(), &self.salt())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("credential_hash", &"<redacted>")
            .field("salt", &"<redacted>")
            .field("jurisdiction_code", &self.jurisdiction_code)
            .finish()
    }
}
