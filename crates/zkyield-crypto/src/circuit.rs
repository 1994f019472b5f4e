//! R1CS circuits for the KYC and balance-threshold proofs.
//!
//! Both circuits share the commitment gadget: the prover knows `h` and `s`
//! such that `((h + s)^2 + h*s) mod 2^253` equals the public commitment.
//! The reduction is checked with 85/85/83-bit limbs and explicit column
//! carries, so no intermediate value comes near the BN254 scalar modulus.

use crate::commitment::{CommitmentLimbs, CARRY_BITS, LIMB_BITS, TOP_LIMB_BITS};
use crate::field::FieldInt;
use ark_bn254::Fr;
use ark_ff::{Field, One};
use ark_r1cs_std::{
    alloc::AllocVar,
    boolean::Boolean,
    eq::EqGadget,
    fields::{fp::FpVar, FieldVar},
};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zkyield_types::{ZkYieldError, FIELD_BOUND_BITS};

/// Jurisdiction codes are proven to fit in one byte.
pub const JURISDICTION_BITS: usize = 8;

/// Thresholds and `balance - threshold` are proven to fit in 252 bits.
pub const THRESHOLD_BITS: usize = 252;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitKind {
    Kyc,
    Balance,
}

impl CircuitKind {
    pub const ALL: [CircuitKind; 2] = [Self::Kyc, Self::Balance];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kyc => "kyc",
            Self::Balance => "balance",
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            Self::Kyc => 1,
            Self::Balance => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Kyc),
            2 => Some(Self::Balance),
            _ => None,
        }
    }

    /// Names of the public inputs, in allocation order.
    pub fn public_input_names(&self) -> [&'static str; 2] {
        match self {
            Self::Kyc => ["allowed_jurisdiction", "commitment"],
            Self::Balance => ["threshold", "commitment"],
        }
    }

    pub fn num_public_inputs(&self) -> usize {
        self.public_input_names().len()
    }
}

impl fmt::Display for CircuitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CircuitKind {
    type Err = ZkYieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kyc" => Ok(Self::Kyc),
            "balance" => Ok(Self::Balance),
            other => Err(ZkYieldError::InputValidation(format!(
                "Unknown circuit: {}",
                other
            ))),
        }
    }
}

/// The private/public input record handed to a proving backend.
#[derive(Clone)]
pub struct CircuitInputs {
    pub kind: CircuitKind,
    pub credential_hash: FieldInt,
    pub salt: FieldInt,
    pub jurisdiction_code: u64,
    /// Allowed jurisdiction (KYC) or threshold (balance).
    pub public_param: FieldInt,
    pub commitment: FieldInt,
}

impl CircuitInputs {
    pub fn public_signals(&self) -> Vec<FieldInt> {
        vec![self.public_param.clone(), self.commitment.clone()]
    }

    pub fn into_circuit(self) -> AnyCircuit {
        match self.kind {
            CircuitKind::Kyc => AnyCircuit::Kyc(KycCircuit {
                credential_hash: Some(self.credential_hash),
                salt: Some(self.salt),
                jurisdiction_code: Some(self.jurisdiction_code),
                allowed_jurisdiction: Some(self.public_param),
                commitment: Some(self.commitment),
            }),
            CircuitKind::Balance => AnyCircuit::Balance(BalanceCircuit {
                balance: Some(self.credential_hash),
                salt: Some(self.salt),
                threshold: Some(self.public_param),
                commitment: Some(self.commitment),
            }),
        }
    }
}

impl fmt::Debug for CircuitInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitInputs")
            .field("kind", &self.kind)
            .field("public_param", &self.public_param)
            .field("commitment", &self.commitment)
            .finish_non_exhaustive()
    }
}

fn pow2(exp: usize) -> Fr {
    Fr::from(2u64).pow([exp as u64])
}

fn alloc_bits(
    cs: ConstraintSystemRef<Fr>,
    value: Option<&BigUint>,
    width: usize,
) -> Result<Vec<Boolean<Fr>>, SynthesisError> {
    let digits = value.map(|v| v.to_radix_le(2));
    (0..width)
        .map(|i| {
            Boolean::new_witness(cs.clone(), || {
                digits
                    .as_ref()
                    .map(|d| d.get(i).copied().unwrap_or(0) == 1)
                    .ok_or(SynthesisError::AssignmentMissing)
            })
        })
        .collect()
}

fn pack_bits(bits: &[Boolean<Fr>]) -> FpVar<Fr> {
    let mut acc = FpVar::<Fr>::zero();
    let mut coeff = Fr::one();
    for bit in bits {
        acc += FpVar::from(bit.clone()) * FpVar::constant(coeff);
        coeff.double_in_place();
    }
    acc
}

fn limbs_of(bits: &[Boolean<Fr>]) -> [FpVar<Fr>; 3] {
    [
        pack_bits(&bits[..LIMB_BITS]),
        pack_bits(&bits[LIMB_BITS..2 * LIMB_BITS]),
        pack_bits(&bits[2 * LIMB_BITS..2 * LIMB_BITS + TOP_LIMB_BITS]),
    ]
}

/// Enforces `commitment == ((h + s)^2 + h*s) mod 2^253` and returns the
/// bit decomposition of `h` for callers that constrain it further.
fn enforce_commitment(
    cs: ConstraintSystemRef<Fr>,
    credential_hash: Option<&FieldInt>,
    salt: Option<&FieldInt>,
    commitment: &FpVar<Fr>,
) -> Result<Vec<Boolean<Fr>>, SynthesisError> {
    let width = FIELD_BOUND_BITS as usize;
    let witness = match (credential_hash, salt) {
        (Some(h), Some(s)) => Some(CommitmentLimbs::decompose(h, s)),
        _ => None,
    };
    let result_value = witness.as_ref().map(|w| w.commitment().into_biguint());

    let hash_bits = alloc_bits(cs.clone(), credential_hash.map(FieldInt::as_biguint), width)?;
    let salt_bits = alloc_bits(cs.clone(), salt.map(FieldInt::as_biguint), width)?;
    let result_bits = alloc_bits(cs.clone(), result_value.as_ref(), width)?;

    let mut carries = Vec::with_capacity(CARRY_BITS.len());
    for (i, bits) in CARRY_BITS.iter().enumerate() {
        let carry = witness.as_ref().map(|w| &w.carries[i]);
        carries.push(pack_bits(&alloc_bits(cs.clone(), carry, *bits)?));
    }

    let [h0, h1, h2] = limbs_of(&hash_bits);
    let [s0, s1, s2] = limbs_of(&salt_bits);
    let [r0, r1, r2] = limbs_of(&result_bits);
    let t0 = &h0 + &s0;
    let t1 = &h1 + &s1;
    let t2 = &h2 + &s2;
    let two = FpVar::constant(Fr::from(2u64));

    let c0 = &t0 * &t0 + &h0 * &s0;
    let c1 = &two * &t0 * &t1 + &h0 * &s1 + &h1 * &s0;
    let c2 = &two * &t0 * &t2 + &t1 * &t1 + &h0 * &s2 + &h1 * &s1 + &h2 * &s0;

    let limb_base = FpVar::constant(pow2(LIMB_BITS));
    let top_base = FpVar::constant(pow2(TOP_LIMB_BITS));

    c0.enforce_equal(&(&r0 + &carries[0] * &limb_base))?;
    (&c1 + &carries[0]).enforce_equal(&(&r1 + &carries[1] * &limb_base))?;
    (&c2 + &carries[1]).enforce_equal(&(&r2 + &carries[2] * &top_base))?;

    pack_bits(&result_bits).enforce_equal(commitment)?;

    Ok(hash_bits)
}

/// Proves that a credential's jurisdiction equals the allowed one and that
/// the credential opens the public commitment.
///
/// Public inputs: `[allowed_jurisdiction, commitment]`.
#[derive(Clone, Default)]
pub struct KycCircuit {
    pub credential_hash: Option<FieldInt>,
    pub salt: Option<FieldInt>,
    pub jurisdiction_code: Option<u64>,
    pub allowed_jurisdiction: Option<FieldInt>,
    pub commitment: Option<FieldInt>,
}

impl KycCircuit {
    /// Dummy assignment used for parameter generation.
    pub fn setup() -> Self {
        Self {
            credential_hash: Some(FieldInt::zero()),
            salt: Some(FieldInt::zero()),
            jurisdiction_code: Some(0),
            allowed_jurisdiction: Some(FieldInt::zero()),
            commitment: Some(FieldInt::zero()),
        }
    }
}

impl ConstraintSynthesizer<Fr> for KycCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let allowed_var = FpVar::new_input(cs.clone(), || {
            self.allowed_jurisdiction
                .as_ref()
                .map(FieldInt::to_fr)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let commitment_var = FpVar::new_input(cs.clone(), || {
            self.commitment
                .as_ref()
                .map(FieldInt::to_fr)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let code_var = FpVar::new_witness(cs.clone(), || {
            self.jurisdiction_code
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        // Range: 1..=255, and equal to the allowed code.
        let code_value = self.jurisdiction_code.map(BigUint::from);
        let code_bits = alloc_bits(cs.clone(), code_value.as_ref(), JURISDICTION_BITS)?;
        pack_bits(&code_bits).enforce_equal(&code_var)?;
        Boolean::kary_or(&code_bits)?.enforce_equal(&Boolean::constant(true))?;
        code_var.enforce_equal(&allowed_var)?;

        enforce_commitment(
            cs,
            self.credential_hash.as_ref(),
            self.salt.as_ref(),
            &commitment_var,
        )?;

        Ok(())
    }
}

/// Proves `balance >= threshold` for the balance hidden behind the
/// commitment.
///
/// Public inputs: `[threshold, commitment]`.
#[derive(Clone, Default)]
pub struct BalanceCircuit {
    pub balance: Option<FieldInt>,
    pub salt: Option<FieldInt>,
    pub threshold: Option<FieldInt>,
    pub commitment: Option<FieldInt>,
}

impl BalanceCircuit {
    pub fn setup() -> Self {
        Self {
            balance: Some(FieldInt::zero()),
            salt: Some(FieldInt::zero()),
            threshold: Some(FieldInt::zero()),
            commitment: Some(FieldInt::zero()),
        }
    }
}

impl ConstraintSynthesizer<Fr> for BalanceCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let threshold_var = FpVar::new_input(cs.clone(), || {
            self.threshold
                .as_ref()
                .map(FieldInt::to_fr)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let commitment_var = FpVar::new_input(cs.clone(), || {
            self.commitment
                .as_ref()
                .map(FieldInt::to_fr)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let threshold_bits = alloc_bits(
            cs.clone(),
            self.threshold.as_ref().map(FieldInt::as_biguint),
            THRESHOLD_BITS,
        )?;
        pack_bits(&threshold_bits).enforce_equal(&threshold_var)?;

        let balance_bits = enforce_commitment(
            cs.clone(),
            self.balance.as_ref(),
            self.salt.as_ref(),
            &commitment_var,
        )?;
        let balance_var = pack_bits(&balance_bits);

        // A shortfall wraps to a value near the scalar modulus, which has no
        // 252-bit decomposition.
        let difference = match (&self.balance, &self.threshold) {
            (Some(b), Some(t)) if b >= t => Some(b.as_biguint() - t.as_biguint()),
            (Some(_), Some(_)) => Some(BigUint::default()),
            _ => None,
        };
        let difference_bits = alloc_bits(cs, difference.as_ref(), THRESHOLD_BITS)?;
        pack_bits(&difference_bits).enforce_equal(&(&balance_var - &threshold_var))?;

        Ok(())
    }
}

/// Either circuit, so callers can hold one synthesizer type.
#[derive(Clone)]
pub enum AnyCircuit {
    Kyc(KycCircuit),
    Balance(BalanceCircuit),
}

impl AnyCircuit {
    pub fn setup(kind: CircuitKind) -> Self {
        match kind {
            CircuitKind::Kyc => Self::Kyc(KycCircuit::setup()),
            CircuitKind::Balance => Self::Balance(BalanceCircuit::setup()),
        }
    }

    pub fn kind(&self) -> CircuitKind {
        match self {
            Self::Kyc(_) => CircuitKind::Kyc,
            Self::Balance(_) => CircuitKind::Balance,
        }
    }
}

impl ConstraintSynthesizer<Fr> for AnyCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        match self {
            Self::Kyc(circuit) => circuit.generate_constraints(cs),
            Self::Balance(circuit) => circuit.generate_constraints(cs),
        }
    }
}
