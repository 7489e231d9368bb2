//! Probabilistic primality testing and random prime generation.
//!
//! Candidates pass through three screens: a bitfield of the primes below
//! 512, trial division against precomputed products of the odd primes in
//! [3, 511], and Miller-Rabin with random bases. `is_prime` always runs 50
//! rounds (error probability at most 2^-100); candidate generation uses the
//! round count keyed by bit size.

use rand::{CryptoRng, Rng, RngCore};

use super::{arith, BigInt, Sign};

/// Bit `i` set iff `i` is prime, for `i < 512`.
const SMALL_PRIME_BITS: [u64; 8] = [
    0x28208A20A08A28AC,
    0x800228A202088288,
    0x8028208820A00A08,
    0x08028228800800A2,
    0x228800200A20A082,
    0x8820808228020800,
    0x0882802802022020,
    0x208808808008A202,
];

/// Products of consecutive odd primes in [3, 511], each fitting in a word.
const SMALL_ODD_PRIME_PRODUCTS: [u64; 12] = [
    0xE221F97C30E94E1D, // 3 * 5 * ... * 53
    0x6329899EA9F2714B, // 59 * ... * 101
    0x58EDCB4C9ED39C8B, // 103 * ... * 149
    0x09966FF94FD516FB, // 151 * ... * 191
    0x3BD7632C1F36EB51, // 193 * ... * 233
    0x00FD14B3C90D88A9, // 239 * ... * 271
    0x02AD3DBE0CCA85FF, // 277 * ... * 313
    0x0787F9A02C3388A7, // 317 * ... * 359
    0x1113C5CC6D101657, // 367 * ... * 401
    0x2456C94F936BDB15, // 409 * ... * 443
    0x4236A30B85FFE139, // 449 * ... * 487
    0x0000000E9AEF58CB, // 491 * 499 * 503 * 509
];

/// Miller-Rabin round counts for candidate generation, keyed by bit size
/// (the OpenSSL `BN_prime_checks_for_size` table).
pub fn mr_rounds_for_bits(bits: usize) -> usize {
    if bits >= 3747 {
        3
    } else if bits >= 1345 {
        4
    } else if bits >= 476 {
        5
    } else if bits >= 400 {
        6
    } else if bits >= 347 {
        7
    } else if bits >= 308 {
        8
    } else if bits >= 55 {
        27
    } else {
        34
    }
}

impl BigInt {
    /// 50-round Miller-Rabin behind the small-prime screens.
    pub fn is_prime(&self) -> bool {
        probable_prime(self, 50, &mut rand::thread_rng())
    }

    /// Uniform value in `[0, bound)`, `bound > 0`, by rejection sampling.
    pub fn random_below(rng: &mut (impl CryptoRng + RngCore), bound: &BigInt) -> BigInt {
        assert!(bound.is_positive(), "bigint: random_below with empty range");
        let bits = bound.bit_length();
        loop {
            let x = random_bits(rng, bits);
            if &x < bound {
                return x;
            }
        }
    }

    /// Random prime `p` with `min <= p < max`, optionally with
    /// `order_divisor | p - 1` and/or `p = 3 mod 4`.
    pub fn random_prime(
        rng: &mut (impl CryptoRng + RngCore),
        min: &BigInt,
        max: &BigInt,
        order_divisor: Option<&BigInt>,
        three_mod_four: bool,
    ) -> BigInt {
        assert!(min > &BigInt::one() && min < max, "bigint: empty prime range");
        let rounds = mr_rounds_for_bits(max.bit_length());
        let span = max - min;
        loop {
            let p = match order_divisor {
                // p = 1 + k * q for k in [ceil((min-1)/q), (max-2)/q]
                Some(q) => {
                    let k_min = div_ceil(&(min - BigInt::one()), q);
                    let (k_max, _) = (max - BigInt::from(2u64)).divrem(q);
                    assert!(k_min <= k_max, "bigint: no multiple of divisor in range");
                    let k_span = &k_max - &k_min + BigInt::one();
                    let k = k_min + Self::random_below(rng, &k_span);
                    BigInt::one() + q * k
                }
                None => min + Self::random_below(rng, &span),
            };
            if p.is_even() || &p < min {
                continue;
            }
            if three_mod_four && p.limbs()[0] & 3 != 3 {
                continue;
            }
            if probable_prime(&p, rounds, rng) {
                return p;
            }
        }
    }
}

fn div_ceil(a: &BigInt, b: &BigInt) -> BigInt {
    let (q, r) = a.divrem(b);
    if r.is_zero() {
        q
    } else {
        q + BigInt::one()
    }
}

fn random_bits(rng: &mut (impl CryptoRng + RngCore), bits: usize) -> BigInt {
    let limbs = (bits + 63) / 64;
    let mut mag: Vec<u64> = (0..limbs).map(|_| rng.gen()).collect();
    if bits % 64 != 0 {
        if let Some(top) = mag.last_mut() {
            *top &= (1u64 << (bits % 64)) - 1;
        }
    }
    BigInt::from_parts(Sign::Plus, mag)
}

fn probable_prime(n: &BigInt, rounds: usize, rng: &mut (impl CryptoRng + RngCore)) -> bool {
    if !n.is_positive() {
        return false;
    }
    if n.bit_length() <= 9 {
        let v = n.limbs().first().copied().unwrap_or(0);
        return SMALL_PRIME_BITS[(v / 64) as usize] >> (v % 64) & 1 == 1;
    }
    if n.is_even() {
        return false;
    }
    for &product in &SMALL_ODD_PRIME_PRODUCTS {
        let r = arith::divrem_limb(n.limbs(), product).1;
        if gcd_u64(r, product) != 1 {
            return false;
        }
    }
    miller_rabin(n, rounds, rng)
}

/// `rounds` of Miller-Rabin with random bases in `[2, n-2]`. `n` odd, > 511.
fn miller_rabin(n: &BigInt, rounds: usize, rng: &mut (impl CryptoRng + RngCore)) -> bool {
    let n_minus_1 = n - BigInt::one();
    let s = n_minus_1.trailing_zeros();
    let d = &n_minus_1 >> s;
    let base_span = n - BigInt::from(3u64);

    'rounds: for _ in 0..rounds {
        let a = BigInt::random_below(rng, &base_span) + BigInt::from(2u64);
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_1 {
            continue;
        }
        for _ in 0..s - 1 {
            x = (&x * &x).modulo(n);
            if x == n_minus_1 {
                continue 'rounds;
            }
            if x.is_one() {
                return false;
            }
        }
        return false;
    }
    true
}

fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn sieve(limit: usize) -> Vec<bool> {
        let mut composite = vec![false; limit];
        for i in 2..limit {
            if !composite[i] {
                let mut j = i * i;
                while j < limit {
                    composite[j] = true;
                    j += i;
                }
            }
        }
        (0..limit).map(|i| i >= 2 && !composite[i]).collect()
    }

    #[test]
    fn small_prime_bitfield_matches_sieve() {
        let reference = sieve(512);
        for v in 0..512usize {
            assert_eq!(BigInt::from(v).is_prime(), reference[v], "{v}");
        }
    }

    #[test]
    fn primality_up_to_twenty_thousand() {
        let reference = sieve(20_000);
        for v in 0..20_000usize {
            assert_eq!(BigInt::from(v).is_prime(), reference[v], "{v}");
        }
    }

    #[test]
    fn carmichael_numbers_are_composite() {
        for v in [561u64, 1105, 1729, 41041, 825265, 321197185] {
            assert!(!BigInt::from(v).is_prime(), "{v}");
        }
        // smallest strong pseudoprime to bases 2, 3, 5 and 7
        assert!(!BigInt::from(3215031751u64).is_prime());
    }

    #[test]
    fn large_known_primes_and_composites() {
        assert!(BigInt::from(1_000_000_007u64).is_prime());
        assert!(BigInt::from((1u128 << 89) - 1).is_prime());
        assert!(!BigInt::from((1u128 << 67) - 1).is_prime());
        assert!(((BigInt::one() << 521) - BigInt::one()).is_prime());
        assert!(!((BigInt::one() << 523) - BigInt::one()).is_prime());
        assert!(!BigInt::from(-7i64).is_prime());
    }

    #[test]
    fn random_below_stays_in_range() {
        let mut rng = ChaCha20Rng::from_seed([7; 32]);
        let bound = BigInt::from(1000u64);
        for _ in 0..200 {
            let x = BigInt::random_below(&mut rng, &bound);
            assert!(!x.is_negative() && x < bound);
        }
    }

    #[test]
    fn random_prime_respects_constraints() {
        let mut rng = ChaCha20Rng::from_seed([42; 32]);
        let min = BigInt::from(1u64 << 31);
        let max = BigInt::from(1u64 << 32);
        let p = BigInt::random_prime(&mut rng, &min, &max, None, true);
        assert!(p.is_prime());
        assert!(p >= min && p < max);
        assert_eq!(p.limbs()[0] & 3, 3);

        let q = BigInt::from(10007u64);
        let p = BigInt::random_prime(&mut rng, &min, &max, Some(&q), false);
        assert!(p.is_prime());
        assert!(p >= min && p < max);
        assert_eq!((&p - BigInt::one()).modulo(&q), BigInt::zero());
    }

    #[test]
    fn round_table_spot_checks() {
        assert_eq!(mr_rounds_for_bits(2048), 4);
        assert_eq!(mr_rounds_for_bits(4096), 3);
        assert_eq!(mr_rounds_for_bits(512), 5);
        assert_eq!(mr_rounds_for_bits(32), 34);
    }
}
