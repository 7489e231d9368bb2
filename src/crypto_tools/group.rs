//! The group G of signed residues: the quotient of (Z/NZ)* by {1, -1}.
//!
//! An element is held as its canonical lift, the representative in
//! [1, (N-1)/2]. Canonicalization happens in exactly one place,
//! [`Modulus::element_from_residue`]; every group operation funnels through
//! it, so the rest of the crate never sees a raw residue.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::MODULUS_MIN_BITS;
use crate::crypto_tools::bigint::BigInt;
use crate::sdk::api::{BytesVec, CodecError, CodecResult};

/// An RSA-type modulus together with the derived group parameters.
#[derive(Debug, Clone)]
pub struct Modulus {
    n: BigInt,
    /// (N - 1) / 2, the largest canonical lift
    half: BigInt,
    byte_len: usize,
}

impl Modulus {
    /// Accepts a positive odd composite of at least 1024 bits. The
    /// factorization is the caller's to discard.
    pub fn new(n: BigInt) -> CodecResult<Self> {
        if !n.is_positive() || n.is_even() {
            warn!("modulus rejected: not a positive odd integer");
            return Err(CodecError::InvalidModulus);
        }
        let byte_len = n.to_bytes_be().len();
        if byte_len * 8 < MODULUS_MIN_BITS {
            warn!(
                "modulus rejected: {} bits is below the {}-bit floor",
                byte_len * 8,
                MODULUS_MIN_BITS
            );
            return Err(CodecError::InvalidModulus);
        }
        let half = (&n - BigInt::one()) >> 1;
        Ok(Self { n, half, byte_len })
    }

    pub fn value(&self) -> &BigInt {
        &self.n
    }

    /// Encoded size of one group element, in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Reduce an arbitrary integer into the group: take the residue mod N,
    /// then fold the upper half onto the lower via x -> N - x.
    pub fn element_from_residue(&self, x: &BigInt) -> Element {
        let r = x.modulo(&self.n);
        if r > self.half {
            Element(&self.n - &r)
        } else {
            Element(r)
        }
    }

    pub fn one(&self) -> Element {
        Element(BigInt::one())
    }

    pub fn mul(&self, a: &Element, b: &Element) -> Element {
        self.element_from_residue(&(&a.0 * &b.0))
    }

    pub fn pow(&self, a: &Element, e: &BigInt) -> Element {
        self.element_from_residue(&a.0.modpow(e, &self.n))
    }

    /// Exactly `byte_len` bytes: the canonical lift, unsigned big-endian.
    pub fn encode(&self, a: &Element) -> BytesVec {
        a.0.to_bytes_be_padded(self.byte_len)
    }

    /// Decodes iff the input is exactly `byte_len` bytes holding an integer
    /// x with 1 <= x <= (N-1)/2. Notably rejects 0 and the upper half.
    pub fn try_decode(&self, bytes: &[u8]) -> Option<Element> {
        if bytes.len() != self.byte_len {
            return None;
        }
        let x = BigInt::from_bytes_be(bytes);
        if x.is_zero() || x > self.half {
            return None;
        }
        Some(Element(x))
    }
}

/// An element of G, held as its canonical lift.
///
/// Deserialized elements are not range-checked (that needs the modulus);
/// they become trustworthy only after surviving [`Modulus::try_decode`] or a
/// VDF verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element(BigInt);

impl AsRef<BigInt> for Element {
    fn as_ref(&self) -> &BigInt {
        &self.0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A modulus whose factorization is known: M521 * M607. Big enough to
    /// pass validation, cheap enough for tests.
    pub(crate) fn mersenne_modulus() -> Modulus {
        let p = (BigInt::one() << 521) - BigInt::one();
        let q = (BigInt::one() << 607) - BigInt::one();
        Modulus::new(&p * &q).unwrap()
    }

    #[test]
    fn modulus_validity() {
        assert!(matches!(
            Modulus::new(BigInt::zero()),
            Err(CodecError::InvalidModulus)
        ));
        assert!(matches!(
            Modulus::new(BigInt::one() << 2000),
            Err(CodecError::InvalidModulus)
        ));
        assert!(matches!(
            Modulus::new(BigInt::from(12345u64)),
            Err(CodecError::InvalidModulus)
        ));
        assert!(matches!(
            Modulus::new(-((BigInt::one() << 1111) - BigInt::one())),
            Err(CodecError::InvalidModulus)
        ));

        let m = mersenne_modulus();
        assert_eq!(m.byte_len(), 141);
        assert_eq!(m.value().bit_length(), 1128);
    }

    #[test]
    fn canonicalization_folds_the_upper_half() {
        let m = mersenne_modulus();
        let x = BigInt::from(123456789u64);
        let a = m.element_from_residue(&x);
        let b = m.element_from_residue(&(m.value() - &x));
        assert_eq!(a, b);
        assert_eq!(a.as_ref(), &x);

        // -x lands on the same element as x
        let c = m.element_from_residue(&-x.clone());
        assert_eq!(a, c);
    }

    #[test]
    fn encode_decode_round_trip() {
        let m = mersenne_modulus();
        for v in [1u64, 2, 0xFFFF_FFFF, 987_654_321] {
            let e = m.element_from_residue(&BigInt::from(v));
            let bytes = m.encode(&e);
            assert_eq!(bytes.len(), m.byte_len());
            assert_eq!(m.try_decode(&bytes), Some(e));
        }
    }

    #[test]
    fn decode_rejects_out_of_range() {
        let m = mersenne_modulus();
        // zero
        assert_eq!(m.try_decode(&vec![0u8; m.byte_len()]), None);
        // upper half: N - 1 is the lift of -1, not canonical
        let top = (m.value() - BigInt::one()).to_bytes_be_padded(m.byte_len());
        assert_eq!(m.try_decode(&top), None);
        // boundary: (N-1)/2 is canonical, (N-1)/2 + 1 is not
        let half = ((m.value() - BigInt::one()) >> 1).to_bytes_be_padded(m.byte_len());
        assert!(m.try_decode(&half).is_some());
        let above = (((m.value() - BigInt::one()) >> 1) + BigInt::one())
            .to_bytes_be_padded(m.byte_len());
        assert_eq!(m.try_decode(&above), None);
        // wrong length
        assert_eq!(m.try_decode(&[1u8; 7]), None);
    }

    #[test]
    fn group_multiplication_wraps_through_the_fold() {
        let m = mersenne_modulus();
        let g = m.element_from_residue(&BigInt::from(3u64));
        let sq = m.mul(&g, &g);
        assert_eq!(sq.as_ref(), &BigInt::from(9u64));
        assert_eq!(m.pow(&g, &BigInt::from(2u64)), sq);
        // x * 1 = x
        assert_eq!(m.mul(&g, &m.one()), g);
        // exponent 0
        assert_eq!(m.pow(&g, &BigInt::zero()), m.one());
    }
}
