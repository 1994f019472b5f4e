use crate::circuit::CircuitKind;
use crate::field::FieldInt;
use ark_bn254::{Bn254, Fq, Fq2, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::{BigInteger, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use base64::Engine;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zkyield_types::{ZkYieldError, ZkYieldResult};

/// `[x, y]` of a G1 point.
pub type G1Coords = [BigUint; 2];

/// `[[x.c0, x.c1], [y.c0, y.c1]]` of a G2 point, in the prover's native
/// coefficient order.
pub type G2Coords = [[BigUint; 2]; 2];

const SIGNAL_SIZE: usize = 32;

/// A Groth16 proof with its public signals, coordinates held as integers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub kind: CircuitKind,
    #[serde(with = "coords_serde::g1")]
    pub a: G1Coords,
    #[serde(with = "coords_serde::g2")]
    pub b: G2Coords,
    #[serde(with = "coords_serde::g1")]
    pub c: G1Coords,
    pub public_signals: Vec<FieldInt>,
}

pub(crate) fn fq_to_biguint(value: &Fq) -> BigUint {
    BigUint::from_bytes_le(&value.into_bigint().to_bytes_le())
}

pub(crate) fn biguint_to_fq(value: &BigUint) -> ZkYieldResult<Fq> {
    let modulus = BigUint::from_bytes_le(&Fq::MODULUS.to_bytes_le());
    if value >= &modulus {
        return Err(ZkYieldError::Serialization(
            "Coordinate is not a base field element".into(),
        ));
    }
    Ok(Fq::from_le_bytes_mod_order(&value.to_bytes_le()))
}

pub(crate) fn g1_to_coords(point: &G1Affine) -> G1Coords {
    if point.is_zero() {
        return [BigUint::default(), BigUint::default()];
    }
    [fq_to_biguint(&point.x), fq_to_biguint(&point.y)]
}

pub(crate) fn g2_to_coords(point: &G2Affine) -> G2Coords {
    if point.is_zero() {
        return Default::default();
    }
    [
        [fq_to_biguint(&point.x.c0), fq_to_biguint(&point.x.c1)],
        [fq_to_biguint(&point.y.c0), fq_to_biguint(&point.y.c1)],
    ]
}

fn is_origin(coords: &[BigUint]) -> bool {
    coords.iter().all(|c| c.bits() == 0)
}

pub(crate) fn coords_to_g1(coords: &G1Coords) -> ZkYieldResult<G1Affine> {
    if is_origin(coords) {
        return Ok(G1Affine::zero());
    }
    let point = G1Affine::new_unchecked(biguint_to_fq(&coords[0])?, biguint_to_fq(&coords[1])?);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(ZkYieldError::Serialization("G1 point is not on the curve".into()));
    }
    Ok(point)
}

pub(crate) fn coords_to_g2(coords: &G2Coords) -> ZkYieldResult<G2Affine> {
    if coords.iter().all(|pair| is_origin(pair)) {
        return Ok(G2Affine::zero());
    }
    let x = Fq2::new(biguint_to_fq(&coords[0][0])?, biguint_to_fq(&coords[0][1])?);
    let y = Fq2::new(biguint_to_fq(&coords[1][0])?, biguint_to_fq(&coords[1][1])?);
    let point = G2Affine::new_unchecked(x, y);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(ZkYieldError::Serialization("G2 point is not on the curve".into()));
    }
    Ok(point)
}

impl Proof {
    pub fn from_ark(
        kind: CircuitKind,
        proof: &ark_groth16::Proof<Bn254>,
        public_signals: Vec<FieldInt>,
    ) -> Self {
        Self {
            kind,
            a: g1_to_coords(&proof.a),
            b: g2_to_coords(&proof.b),
            c: g1_to_coords(&proof.c),
            public_signals,
        }
    }

    /// Rebuilds the arkworks proof, rejecting points off the curve.
    pub fn to_ark(&self) -> ZkYieldResult<ark_groth16::Proof<Bn254>> {
        Ok(ark_groth16::Proof {
            a: coords_to_g1(&self.a)?,
            b: coords_to_g2(&self.b)?,
            c: coords_to_g1(&self.c)?,
        })
    }

    /// Public signal at `index`, if present.
    pub fn signal(&self, index: usize) -> Option<&FieldInt> {
        self.public_signals.get(index)
    }

    /// The commitment is the last public input of both circuits.
    pub fn commitment(&self) -> Option<&FieldInt> {
        self.public_signals.last()
    }

    /// Layout: kind tag, compressed proof, then each signal as 32
    /// big-endian bytes.
    pub fn to_bytes(&self) -> ZkYieldResult<Vec<u8>> {
        let mut bytes = vec![self.kind.tag()];
        self.to_ark()?
            .serialize_compressed(&mut bytes)
            .map_err(|e| ZkYieldError::Serialization(e.to_string()))?;
        for signal in &self.public_signals {
            bytes.extend_from_slice(&signal.to_bytes_be());
        }
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> ZkYieldResult<Self> {
        let (&tag, rest) = bytes
            .split_first()
            .ok_or_else(|| ZkYieldError::Serialization("Empty proof bytes".into()))?;
        let kind = CircuitKind::from_tag(tag)
            .ok_or_else(|| ZkYieldError::Serialization(format!("Unknown circuit tag {}", tag)))?;

        let signals_len = kind.num_public_inputs() * SIGNAL_SIZE;
        if rest.len() < signals_len {
            return Err(ZkYieldError::Serialization("Invalid proof bytes".into()));
        }
        let proof_len = rest.len() - signals_len;
        let proof = ark_groth16::Proof::<Bn254>::deserialize_compressed(&rest[..proof_len])
            .map_err(|e| ZkYieldError::Serialization(format!("Failed to deserialize proof: {}", e)))?;

        let public_signals = rest[proof_len..]
            .chunks(SIGNAL_SIZE)
            .map(FieldInt::decode_be)
            .collect::<ZkYieldResult<Vec<_>>>()?;

        Ok(Self::from_ark(kind, &proof, public_signals))
    }

    pub fn to_base64(&self) -> ZkYieldResult<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.to_bytes()?))
    }

    pub fn from_base64(s: &str) -> ZkYieldResult<Self> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(s.trim())
            .map_err(|e| ZkYieldError::Serialization(format!("Invalid base64: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

/// Decimal-string encoding for curve coordinates.
pub(crate) mod coords_serde {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn parse(s: &str) -> Result<BigUint, String> {
        BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| format!("invalid integer {:?}", s))
    }

    fn pair_from<E: serde::de::Error>(raw: &[String; 2]) -> Result<[BigUint; 2], E> {
        Ok([parse(&raw[0]).map_err(E::custom)?, parse(&raw[1]).map_err(E::custom)?])
    }

    pub mod g1 {
        use super::*;

        pub fn serialize<S: Serializer>(value: &[BigUint; 2], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(value.iter().map(|v| v.to_string()))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[BigUint; 2], D::Error> {
            let raw = <[String; 2]>::deserialize(deserializer)?;
            pair_from::<D::Error>(&raw)
        }
    }

    pub mod g2 {
        use super::*;

        pub fn serialize<S: Serializer>(value: &[[BigUint; 2]; 2], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(
                value
                    .iter()
                    .map(|pair| [pair[0].to_string(), pair[1].to_string()]),
            )
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<[[BigUint; 2]; 2], D::Error> {
            let raw = <[[String; 2]; 2]>::deserialize(deserializer)?;
            Ok([pair_from::<D::Error>(&raw[0])?, pair_from::<D::Error>(&raw[1])?])
        }
    }
}
