use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroize;

/// Initialize a ChaCha20 RNG from the operating system entropy source.
/// Intended for the prime-generation helpers; the codec itself is
/// deterministic and draws no randomness of its own.
pub fn os_seeded() -> impl CryptoRng + RngCore {
    let mut seed = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut seed);
    let rng = ChaCha20Rng::from_seed(seed);
    seed.zeroize();
    rng
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_tools::bigint::BigInt;

    #[test]
    fn feeds_the_prime_generator() {
        let mut rng = os_seeded();
        let min = BigInt::from(1u64 << 40);
        let max = BigInt::from(1u64 << 41);
        let p = BigInt::random_prime(&mut rng, &min, &max, None, false);
        assert!(p.is_prime());
        assert!(p >= min && p < max);
    }
}
