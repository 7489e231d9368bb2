//! Modular exponentiation, modular inverse, extended GCD.
//!
//! Odd moduli go through Montgomery multiplication; an even modulus `m` is
//! split as `m = m_odd * 2^t`, the computation runs independently modulo
//! each factor (truncating multiplication modulo `2^t`), and the results are
//! recombined by CRT.

use super::{BigInt, Sign};

/// Montgomery context for an odd modulus. `R = 2^(64 * m.len())`.
struct Montgomery {
    m: Vec<u64>,
    /// `-m^{-1} mod 2^64`
    n0: u64,
    /// `R^2 mod m`
    rr: Vec<u64>,
}

impl Montgomery {
    fn new(m: &BigInt) -> Self {
        debug_assert!(m.is_odd() && !m.is_one());
        let limbs = m.limbs().to_vec();
        let n0 = inv64(limbs[0]).wrapping_neg();
        let r2 = BigInt::one() << (128 * limbs.len());
        let mut rr = r2.modulo(m).limbs().to_vec();
        rr.resize(limbs.len(), 0);
        Self { m: limbs, n0, rr }
    }

    /// CIOS Montgomery product: `a * b * R^{-1} mod m`.
    /// Operands and result are `m.len()` limbs, fully reduced.
    fn mul(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let n = self.m.len();
        let mut t = vec![0u64; n + 2];
        for i in 0..n {
            let ai = a[i];
            let mut carry = 0u64;
            for j in 0..n {
                let s = t[j] as u128 + (ai as u128) * (b[j] as u128) + carry as u128;
                t[j] = s as u64;
                carry = (s >> 64) as u64;
            }
            let s = t[n] as u128 + carry as u128;
            t[n] = s as u64;
            t[n + 1] = (s >> 64) as u64;

            let u = t[0].wrapping_mul(self.n0);
            let s = t[0] as u128 + (u as u128) * (self.m[0] as u128);
            debug_assert_eq!(s as u64, 0);
            let mut carry = (s >> 64) as u64;
            for j in 1..n {
                let s = t[j] as u128 + (u as u128) * (self.m[j] as u128) + carry as u128;
                t[j - 1] = s as u64;
                carry = (s >> 64) as u64;
            }
            let s = t[n] as u128 + carry as u128;
            t[n - 1] = s as u64;
            let s = t[n + 1] as u128 + (s >> 64);
            t[n] = s as u64;
            t[n + 1] = (s >> 64) as u64;
            debug_assert_eq!(t[n + 1], 0);
        }
        // t < 2m: a single conditional subtraction reduces fully
        if t[n] != 0 || BigInt::cmp_mag(&t[..n], &self.m) != std::cmp::Ordering::Less {
            let mut borrow = 0u64;
            for j in 0..n {
                let (d, b1) = t[j].overflowing_sub(self.m[j]);
                let (d, b2) = d.overflowing_sub(borrow);
                t[j] = d;
                borrow = (b1 | b2) as u64;
            }
            t[n] = t[n].wrapping_sub(borrow);
        }
        t.truncate(n);
        t
    }

    fn to_mont(&self, x: &BigInt) -> Vec<u64> {
        let mut limbs = x.limbs().to_vec();
        limbs.resize(self.m.len(), 0);
        self.mul(&limbs, &self.rr)
    }

    fn from_mont(&self, a: &[u64]) -> BigInt {
        let mut one = vec![0u64; self.m.len()];
        one[0] = 1;
        BigInt::from_parts(Sign::Plus, self.mul(a, &one))
    }

    fn one(&self) -> Vec<u64> {
        let mut one = vec![0u64; self.m.len()];
        one[0] = 1;
        self.mul(&one, &self.rr)
    }
}

/// Inverse of an odd word modulo `2^64` by Newton iteration.
fn inv64(x: u64) -> u64 {
    debug_assert!(x & 1 == 1);
    let mut inv = x; // correct to 3 bits: x * x == 1 mod 8
    for _ in 0..5 {
        inv = inv.wrapping_mul(2u64.wrapping_sub(x.wrapping_mul(inv)));
    }
    debug_assert_eq!(x.wrapping_mul(inv), 1);
    inv
}

/// Low `t` bits of a non-negative value.
fn low_bits(x: &BigInt, t: usize) -> BigInt {
    debug_assert!(!x.is_negative());
    let limbs = (t + 63) / 64;
    let take = limbs.min(x.limbs().len());
    let mut mag = x.limbs()[..take].to_vec();
    if t % 64 != 0 && mag.len() == limbs {
        mag[limbs - 1] &= (1u64 << (t % 64)) - 1;
    }
    BigInt::from_parts(Sign::Plus, mag)
}

/// `base^e mod m` for odd `m > 1`, `base` in `[0, m)`, `e > 0`.
fn pow_odd(base: &BigInt, e: &BigInt, m: &BigInt) -> BigInt {
    let ctx = Montgomery::new(m);
    let bm = ctx.to_mont(base);
    let mut acc = ctx.one();
    for i in (0..e.bit_length()).rev() {
        acc = ctx.mul(&acc, &acc);
        if e.test_bit(i) {
            acc = ctx.mul(&acc, &bm);
        }
    }
    ctx.from_mont(&acc)
}

/// `base^e mod 2^t` by square-and-multiply with truncating multiplication.
fn pow_pow2(base: &BigInt, e: &BigInt, t: usize) -> BigInt {
    let b = low_bits(&base.modulo(&(BigInt::one() << t)), t);
    let mut acc = low_bits(&BigInt::one(), t);
    for i in (0..e.bit_length()).rev() {
        acc = low_bits(&(&acc * &acc), t);
        if e.test_bit(i) {
            acc = low_bits(&(&acc * &b), t);
        }
    }
    acc
}

/// Inverse of an odd value modulo `2^t` by Hensel lifting.
fn inv_pow2(a: &BigInt, t: usize) -> BigInt {
    debug_assert!(a.is_odd());
    let a_low = low_bits(a, t);
    let mut x = BigInt::one();
    let mut bits = 1usize;
    while bits < t {
        bits = (bits * 2).min(t);
        let correction = BigInt::from(2u64) - &a_low * &x;
        x = (&x * &correction).modulo(&(BigInt::one() << bits));
    }
    x
}

/// Recombine `x = a1 mod m_odd`, `x = a2 mod 2^t` into `x mod (m_odd << t)`.
fn crt_combine(a1: &BigInt, m_odd: &BigInt, a2: &BigInt, t: usize) -> BigInt {
    if m_odd.is_one() {
        return a2.clone();
    }
    let minv = inv_pow2(m_odd, t);
    let diff = (a2 - a1).modulo(&(BigInt::one() << t));
    let k = low_bits(&(&diff * &minv), t);
    a1 + &(m_odd * &k)
}

impl BigInt {
    /// `self^e mod |m|`, result in `[0, |m|)`.
    ///
    /// A negative exponent inverts `self` modulo `|m|` first and panics if no
    /// inverse exists. `|m| == 1` yields 0. Panics on `m == 0`.
    pub fn modpow(&self, e: &BigInt, m: &BigInt) -> BigInt {
        assert!(!m.is_zero(), "bigint: modpow with zero modulus");
        let m_abs = m.abs();
        if m_abs.is_one() {
            return BigInt::zero();
        }
        let base = if e.is_negative() {
            self.inv_mod(&m_abs)
                .unwrap_or_else(|| panic!("bigint: negative exponent with non-invertible base"))
        } else {
            self.modulo(&m_abs)
        };
        let e_abs = e.abs();
        if e_abs.is_zero() {
            return BigInt::one();
        }
        if m_abs.is_odd() {
            return pow_odd(&base, &e_abs, &m_abs);
        }
        let t = m_abs.trailing_zeros();
        let m_odd = &m_abs >> t;
        let a1 = if m_odd.is_one() {
            BigInt::zero()
        } else {
            pow_odd(&base.modulo(&m_odd), &e_abs, &m_odd)
        };
        let a2 = pow_pow2(&base, &e_abs, t);
        crt_combine(&a1, &m_odd, &a2, t)
    }

    /// Inverse of `self` modulo `m > 0`, in `[0, m)`, when it exists.
    /// Works for even `m` via the `m = m_odd * 2^t` split.
    pub fn inv_mod(&self, m: &BigInt) -> Option<BigInt> {
        assert!(m.is_positive(), "bigint: inv_mod with non-positive modulus");
        if m.is_one() {
            return Some(BigInt::zero());
        }
        if m.is_odd() {
            return inv_mod_odd(self, m);
        }
        if self.is_even() {
            return None;
        }
        let t = m.trailing_zeros();
        let m_odd = m >> t;
        let i1 = if m_odd.is_one() {
            BigInt::zero()
        } else {
            inv_mod_odd(self, &m_odd)?
        };
        let i2 = inv_pow2(&self.modulo(&(BigInt::one() << t)), t);
        Some(crt_combine(&i1, &m_odd, &i2, t))
    }

    /// Binary extended GCD: returns `(g, u, v)` with `g = self*u + other*v`
    /// and `g >= 0`.
    pub fn gcd_ext(&self, other: &BigInt) -> (BigInt, BigInt, BigInt) {
        let sign_of = |s: &BigInt| match s.sign() {
            Sign::Minus => BigInt::from(-1i64),
            _ => BigInt::one(),
        };
        if self.is_zero() && other.is_zero() {
            return (BigInt::zero(), BigInt::zero(), BigInt::zero());
        }
        if self.is_zero() {
            return (other.abs(), BigInt::zero(), sign_of(other));
        }
        if other.is_zero() {
            return (self.abs(), sign_of(self), BigInt::zero());
        }

        let mut x = self.abs();
        let mut y = other.abs();
        let mut k = 0usize;
        while x.is_even() && y.is_even() {
            x = x >> 1;
            y = y >> 1;
            k += 1;
        }

        // HAC algorithm 14.61; invariants a*x + b*y = u and c*x + d*y = v
        let mut u = x.clone();
        let mut v = y.clone();
        let mut a = BigInt::one();
        let mut b = BigInt::zero();
        let mut c = BigInt::zero();
        let mut d = BigInt::one();
        loop {
            while u.is_even() {
                u = u >> 1;
                if a.is_even() && b.is_even() {
                    a = a >> 1;
                    b = b >> 1;
                } else {
                    a = (&a + &y) >> 1;
                    b = (&b - &x) >> 1;
                }
            }
            while v.is_even() {
                v = v >> 1;
                if c.is_even() && d.is_even() {
                    c = c >> 1;
                    d = d >> 1;
                } else {
                    c = (&c + &y) >> 1;
                    d = (&d - &x) >> 1;
                }
            }
            if u >= v {
                u = &u - &v;
                a = &a - &c;
                b = &b - &d;
            } else {
                v = &v - &u;
                c = &c - &a;
                d = &d - &b;
            }
            if u.is_zero() {
                break;
            }
        }

        let g = &v << k;
        let u_coef = if self.is_negative() { -c } else { c };
        let v_coef = if other.is_negative() { -d } else { d };
        (g, u_coef, v_coef)
    }
}

/// Inverse for odd `m > 1` via the extended GCD.
fn inv_mod_odd(a: &BigInt, m: &BigInt) -> Option<BigInt> {
    let a_red = a.modulo(m);
    if a_red.is_zero() {
        return None;
    }
    let (g, u, _) = a_red.gcd_ext(m);
    if !g.is_one() {
        return None;
    }
    Some(u.modulo(m))
}
