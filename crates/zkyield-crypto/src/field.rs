//! Bounded integer arithmetic.
//!
//! Every credential hash, salt and commitment lives in `[0, 2^253)`. The
//! bound is a power of two, so reduction is a bit mask, and it sits below
//! the BN254 scalar modulus so every value embeds into `Fr` unchanged.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use zkyield_types::{ZkYieldError, ZkYieldResult, FIELD_BOUND_BITS};

static FIELD_MASK: OnceLock<BigUint> = OnceLock::new();

fn field_mask() -> &'static BigUint {
    FIELD_MASK.get_or_init(|| (BigUint::from(1u8) << FIELD_BOUND_BITS as usize) - 1u8)
}

/// The bound `M = 2^253`.
pub fn field_bound() -> BigUint {
    BigUint::from(1u8) << FIELD_BOUND_BITS as usize
}

/// Reduces an arbitrary integer modulo `2^253`.
pub fn reduce(value: &BigUint) -> BigUint {
    value & field_mask()
}

/// An integer known to be in `[0, 2^253)`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldInt(BigUint);

impl FieldInt {
    pub fn new(value: BigUint) -> Self {
        if value.bits() <= FIELD_BOUND_BITS as u64 {
            Self(value)
        } else {
            Self(reduce(&value))
        }
    }

    pub fn zero() -> Self {
        Self(BigUint::default())
    }

    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    pub fn from_u128(value: u128) -> Self {
        Self(BigUint::from(value))
    }

    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self::new(BigUint::from_bytes_be(bytes))
    }

    /// Like [`from_bytes_be`](Self::from_bytes_be), but values at or above
    /// the bound are an error.
    pub fn decode_be(bytes: &[u8]) -> ZkYieldResult<Self> {
        let value = BigUint::from_bytes_be(bytes);
        if value.bits() > FIELD_BOUND_BITS as u64 {
            return Err(ZkYieldError::Serialization(format!(
                "Encoded value exceeds {} bits",
                FIELD_BOUND_BITS
            )));
        }
        Ok(Self(value))
    }

    /// Fixed-width big-endian encoding.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let bytes = self.0.to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        out
    }

    /// Parses decimal text or `0x`-prefixed hex. Values at or above the
    /// bound are rejected rather than silently reduced.
    pub fn parse(s: &str) -> ZkYieldResult<Self> {
        let s = s.trim();
        let parsed = if let Some(hex_digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            BigUint::parse_bytes(hex_digits.as_bytes(), 16)
        } else {
            BigUint::parse_bytes(s.as_bytes(), 10)
        };
        let value = parsed.ok_or_else(|| {
            ZkYieldError::InputValidation(format!("Not an integer: {:?}", s))
        })?;
        if value.bits() > FIELD_BOUND_BITS as u64 {
            return Err(ZkYieldError::InputValidation(format!(
                "Value exceeds {} bits",
                FIELD_BOUND_BITS
            )));
        }
        Ok(Self(value))
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.bits() == 0
    }

    /// Lowest 64 bits.
    pub fn low_u64(&self) -> u64 {
        self.0.iter_u64_digits().next().unwrap_or(0)
    }

    pub fn add(&self, other: &Self) -> Self {
        Self::new(&self.0 + &other.0)
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self::new(&self.0 * &other.0)
    }

    /// Embeds the value into the BN254 scalar field. No reduction happens
    /// because `2^253 < r`.
    pub fn to_fr(&self) -> Fr {
        Fr::from_le_bytes_mod_order(&self.0.to_bytes_le())
    }

    /// Inverse of [`to_fr`](Self::to_fr). Scalars at or above the bound are
    /// rejected.
    pub fn from_fr(value: &Fr) -> ZkYieldResult<Self> {
        let raw = BigUint::from_bytes_le(&value.into_bigint().to_bytes_le());
        if raw.bits() > FIELD_BOUND_BITS as u64 {
            return Err(ZkYieldError::Serialization(
                "Scalar is outside the commitment domain".into(),
            ));
        }
        Ok(Self(raw))
    }
}

/// Sum and product of two integers, each reduced modulo `2^253`.
pub fn sum_and_product(a: &BigUint, b: &BigUint) -> (FieldInt, FieldInt) {
    (FieldInt::new(a + b), FieldInt::new(a * b))
}

impl From<u64> for FieldInt {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<BigUint> for FieldInt {
    fn from(value: BigUint) -> Self {
        Self::new(value)
    }
}

impl FromStr for FieldInt {
    type Err = ZkYieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for FieldInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldInt({})", self.0)
    }
}

impl Serialize for FieldInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for FieldInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sum_and_product_small() {
        let (sum, product) = sum_and_product(&BigUint::from(12345u32), &BigUint::from(67890u32));
        assert_eq!(sum, FieldInt::from_u64(80235));
        assert_eq!(product, FieldInt::from_u64(838102050));
    }

    #[test]
    fn test_sum_wraps_at_bound() {
        let max = field_bound() - 1u8;
        let (sum, product) = sum_and_product(&max, &BigUint::from(1u8));
        assert!(sum.is_zero());
        assert_eq!(product.as_biguint(), &max);
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(FieldInt::parse("255").unwrap(), FieldInt::from_u64(255));
        assert_eq!(FieldInt::parse("0xff").unwrap(), FieldInt::from_u64(255));
        assert!(FieldInt::parse("").is_err());
        assert!(FieldInt::parse("12a").is_err());

        let too_big = field_bound().to_string();
        assert!(FieldInt::parse(&too_big).is_err());
    }

    #[test]
    fn test_fr_roundtrip() {
        let value = FieldInt::new(field_bound() - 7u8);
        let fr = value.to_fr();
        assert_eq!(FieldInt::from_fr(&fr).unwrap(), value);
    }

    #[test]
    fn test_decode_rejects_oversized() {
        let max = FieldInt::new(field_bound() - 1u8);
        assert_eq!(FieldInt::decode_be(&max.to_bytes_be()).unwrap(), max);
        assert!(FieldInt::decode_be(&[0xff; 32]).is_err());
    }

    #[test]
    fn test_bytes_be_fixed_width() {
        let value = FieldInt::from_u64(0x0102);
        let bytes = value.to_bytes_be();
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
        assert_eq!(FieldInt::from_bytes_be(&bytes), value);
    }

    #[test]
    fn test_serde_decimal_string() {
        let value = FieldInt::from_u64(7275757275);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"7275757275\"");
        let back: FieldInt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    proptest! {
        #[test]
        fn prop_results_stay_bounded(
            a in proptest::collection::vec(any::<u8>(), 0..64),
            b in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let a = BigUint::from_bytes_be(&a);
            let b = BigUint::from_bytes_be(&b);
            let (sum, product) = sum_and_product(&a, &b);
            prop_assert!(sum.as_biguint() < &field_bound());
            prop_assert!(product.as_biguint() < &field_bound());
            prop_assert_eq!(sum.as_biguint(), &((&a + &b) % field_bound()));
            prop_assert_eq!(product.as_biguint(), &((&a * &b) % field_bound()));
        }
    }
}
