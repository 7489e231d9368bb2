//! Wesolowski's verifiable delay function over the signed-residue group.
//!
//! For a counter T and input bytes e: g = H(e), f = g^(2^T) by T sequential
//! squarings, ell = h(g, T, f) a derived prime, and the proof is
//! pi = g^floor(2^T / ell). Verification recomputes ell, reduces 2^T mod
//! ell, and checks pi^ell * g^r == f with two short exponentiations.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{GROUP_ORACLE_TAG, PRIME_ORACLE_TAG};
use crate::crypto_tools::bigint::BigInt;
use crate::crypto_tools::group::{Element, Modulus};
use crate::crypto_tools::shake::Shake128;

/// Iterations per batch in the evaluate loops. Each batch costs one
/// Montgomery setup, and is the natural checkpoint for cooperative
/// cancellation.
const BATCH: u128 = 4096;

/// The (output, proof) pair produced by [`evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub output: Element,
    pub proof: Element,
}

/// The oracle H: map arbitrary bytes to a group element.
///
/// Absorbs the domain tag, the input, and the modulus encoding, so two VDFs
/// under different moduli behave as independent oracles. The reduction of
/// the squeezed integer mod N is biased, but negligibly so at this size.
pub fn hash_to_group(modulus: &Modulus, input: &[u8]) -> Element {
    let mut shake = Shake128::new();
    shake.update(&[GROUP_ORACLE_TAG]);
    shake.update(input);
    shake.update(&modulus.value().to_bytes_be());
    let digest = shake.flip().next_vec(modulus.byte_len());
    modulus.element_from_residue(&BigInt::from_bytes_be(&digest))
}

/// The oracle h: derive the challenge prime from (g, T, f).
///
/// Squeezes 32 bytes, forces the value odd, and walks upward in steps of
/// two to the next prime. The result lies in [3, 2^256 + 297].
pub fn derive_prime(modulus: &Modulus, g: &Element, counter: u128, f: &Element) -> BigInt {
    let mut shake = Shake128::new();
    shake.update(&[PRIME_ORACLE_TAG]);
    shake.update(&modulus.encode(g));
    shake.update(&modulus.value().to_bytes_be());
    shake.update(&counter.to_be_bytes());
    shake.update(&modulus.encode(f));
    let digest = shake.flip().next_vec(32);

    let y = BigInt::from_bytes_be(&digest);
    if y <= BigInt::from(2u64) {
        return BigInt::from(3u64);
    }
    let two = BigInt::from(2u64);
    let mut candidate = y | BigInt::one();
    while !candidate.is_prime() {
        candidate = candidate + &two;
    }
    candidate
}

/// Evaluate the VDF: T sequential squarings plus the proof.
pub fn evaluate(modulus: &Modulus, counter: u128, input: &[u8]) -> Evaluation {
    let g = hash_to_group(modulus, input);

    // f = g^(2^T); an exponent of 2^k is exactly k squarings under one
    // Montgomery setup
    let mut output = g.clone();
    let mut remaining = counter;
    while remaining > 0 {
        let k = remaining.min(BATCH) as usize;
        output = modulus.pow(&output, &(BigInt::one() << k));
        remaining -= k as u128;
    }

    let ell = derive_prime(modulus, &g, counter, &output);

    // pi = g^q for q = floor(2^T / ell), without materializing q: run the
    // long division bit by bit, folding each batch of quotient bits z into
    // pi <- pi^(2^k) * g^z
    let mut proof = modulus.one();
    let mut r = BigInt::one();
    let mut remaining = counter;
    while remaining > 0 {
        let k = remaining.min(BATCH) as usize;
        let mut z = BigInt::zero();
        for _ in 0..k {
            r = r << 1;
            z = z << 1;
            if r >= ell {
                r = &r - &ell;
                z = z + BigInt::one();
            }
        }
        proof = modulus.pow(&proof, &(BigInt::one() << k));
        proof = modulus.mul(&proof, &modulus.pow(&g, &z));
        remaining -= k as u128;
    }

    Evaluation { output, proof }
}

/// Verify an evaluation: pi^ell * g^(2^T mod ell) must equal f.
pub fn verify(modulus: &Modulus, counter: u128, input: &[u8], eval: &Evaluation) -> bool {
    let g = hash_to_group(modulus, input);
    let ell = derive_prime(modulus, &g, counter, &eval.output);
    let r = BigInt::from(2u64).modpow(&BigInt::from(counter), &ell);
    let check = modulus.mul(&modulus.pow(&eval.proof, &ell), &modulus.pow(&g, &r));
    if check == eval.output {
        true
    } else {
        warn!("vdf: proof does not match output");
        false
    }
}
