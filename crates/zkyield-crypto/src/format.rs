//! Reshapes a proof into the argument layout of the on-chain verifier.

use crate::proof::{coords_serde, G1Coords, G2Coords, Proof};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// `(a, b, c)` as the Solidity verifier takes them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractProof {
    #[serde(with = "coords_serde::g1")]
    pub a: G1Coords,
    #[serde(with = "coords_serde::g2")]
    pub b: G2Coords,
    #[serde(with = "coords_serde::g1")]
    pub c: G1Coords,
}

/// The verifier precompile reads each G2 coordinate as `(c1, c0)`, so the
/// inner pairs of `b` are reversed. `a` and `c` pass through unchanged.
pub fn format_for_contract(proof: &Proof) -> ContractProof {
    let swap = |pair: &[BigUint; 2]| [pair[1].clone(), pair[0].clone()];
    ContractProof {
        a: proof.a.clone(),
        b: [swap(&proof.b[0]), swap(&proof.b[1])],
        c: proof.c.clone(),
    }
}

impl ContractProof {
    /// Same shape as a Solidity call-data literal, with `0x`-hex words.
    pub fn to_calldata(&self) -> String {
        let word = |v: &BigUint| format!("\"0x{:064x}\"", v);
        let pair = |p: &[BigUint; 2]| format!("[{},{}]", word(&p[0]), word(&p[1]));
        format!(
            "{},[{},{}],{}",
            pair(&self.a),
            pair(&self.b[0]),
            pair(&self.b[1]),
            pair(&self.c)
        )
    }
}
