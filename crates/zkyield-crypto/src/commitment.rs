use crate::field::{sum_and_product, FieldInt};
use num_bigint::BigUint;

/// Width of the two low limbs used by the in-circuit commitment.
pub const LIMB_BITS: usize = 85;

/// Width of the top limb. `85 + 85 + 83 = 253`.
pub const TOP_LIMB_BITS: usize = 83;

/// Upper bounds on the three column carries.
pub const CARRY_BITS: [usize; 3] = [89, 90, 92];

/// `commitment = ((h + s)^2 + h*s) mod 2^253`.
///
/// Any party holding both inputs can recompute the value. It is not
/// collision resistant: whoever picks both inputs can solve for a
/// collision directly.
pub fn compute_commitment(credential_hash: &FieldInt, salt: &FieldInt) -> FieldInt {
    let (sum, product) = sum_and_product(credential_hash.as_biguint(), salt.as_biguint());
    let squared = sum.mul(&sum);
    squared.add(&product)
}

fn mask(bits: usize) -> BigUint {
    (BigUint::from(1u8) << bits) - 1u8
}

fn split(value: &BigUint) -> [BigUint; 3] {
    let low = mask(LIMB_BITS);
    [
        value & &low,
        (value >> LIMB_BITS) & &low,
        value >> (2 * LIMB_BITS),
    ]
}

/// Schoolbook decomposition of the commitment into limbs of width
/// 85/85/83, with the carries between columns made explicit. This is the
/// witness the circuit checks, column by column, so that the proved value
/// is exactly the `mod 2^253` result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentLimbs {
    pub hash: [BigUint; 3],
    pub salt: [BigUint; 3],
    pub carries: [BigUint; 3],
    pub result: [BigUint; 3],
}

impl CommitmentLimbs {
    pub fn decompose(credential_hash: &FieldInt, salt: &FieldInt) -> Self {
        let h = split(credential_hash.as_biguint());
        let s = split(salt.as_biguint());
        let columns = Self::columns(&h, &s);

        let low = mask(LIMB_BITS);
        let top = mask(TOP_LIMB_BITS);

        let r0 = &columns[0] & &low;
        let k0 = &columns[0] >> LIMB_BITS;
        let x1 = &columns[1] + &k0;
        let r1 = &x1 & &low;
        let k1 = &x1 >> LIMB_BITS;
        let x2 = &columns[2] + &k1;
        let r2 = &x2 & &top;
        let k2 = &x2 >> TOP_LIMB_BITS;

        Self {
            hash: h,
            salt: s,
            carries: [k0, k1, k2],
            result: [r0, r1, r2],
        }
    }

    /// Column sums of `t^2 + h*s` with `t = h + s`, truncated at `B^2`
    /// since `B^3` vanishes modulo `2^253`.
    pub fn columns(h: &[BigUint; 3], s: &[BigUint; 3]) -> [BigUint; 3] {
        let t: Vec<BigUint> = h.iter().zip(s.iter()).map(|(a, b)| a + b).collect();
        let c0 = &t[0] * &t[0] + &h[0] * &s[0];
        let c1 = BigUint::from(2u8) * &t[0] * &t[1] + &h[0] * &s[1] + &h[1] * &s[0];
        let c2 = BigUint::from(2u8) * &t[0] * &t[2]
            + &t[1] * &t[1]
            + &h[0] * &s[2]
            + &h[1] * &s[1]
            + &h[2] * &s[0];
        [c0, c1, c2]
    }

    pub fn commitment(&self) -> FieldInt {
        FieldInt::new(
            &self.result[0]
                + (&self.result[1] << LIMB_BITS)
                + (&self.result[2] << (2 * LIMB_BITS)),
        )
    }
}
