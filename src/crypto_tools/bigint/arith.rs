//! Addition, subtraction, multiplication, truncating division.

use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

use super::{BigInt, Sign};

pub(super) fn add_mag(a: &[u64], b: &[u64]) -> Vec<u64> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(long.len() + 1);
    let mut carry = 0u64;
    for i in 0..long.len() {
        let (s, c1) = long[i].overflowing_add(*short.get(i).unwrap_or(&0));
        let (s, c2) = s.overflowing_add(carry);
        out.push(s);
        carry = (c1 | c2) as u64;
    }
    if carry != 0 {
        out.push(carry);
    }
    out
}

/// `a - b`; requires `a >= b`.
pub(super) fn sub_mag(a: &[u64], b: &[u64]) -> Vec<u64> {
    debug_assert!(BigInt::cmp_mag(a, b) != Ordering::Less);
    let mut out = Vec::with_capacity(a.len());
    let mut borrow = 0u64;
    for i in 0..a.len() {
        let (d, b1) = a[i].overflowing_sub(*b.get(i).unwrap_or(&0));
        let (d, b2) = d.overflowing_sub(borrow);
        out.push(d);
        borrow = (b1 | b2) as u64;
    }
    debug_assert_eq!(borrow, 0);
    while out.last() == Some(&0) {
        out.pop();
    }
    out
}

pub(super) fn mul_mag(a: &[u64], b: &[u64]) -> Vec<u64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    // single-limb fast path, the common case for small intermediate values
    if b.len() == 1 {
        return mul_limb(a, b[0]);
    }
    if a.len() == 1 {
        return mul_limb(b, a[0]);
    }
    let mut out = vec![0u64; a.len() + b.len()];
    for (i, &ai) in a.iter().enumerate() {
        let mut carry = 0u64;
        for (j, &bj) in b.iter().enumerate() {
            let t = out[i + j] as u128 + (ai as u128) * (bj as u128) + carry as u128;
            out[i + j] = t as u64;
            carry = (t >> 64) as u64;
        }
        out[i + b.len()] = carry;
    }
    while out.last() == Some(&0) {
        out.pop();
    }
    out
}

pub(super) fn mul_limb(a: &[u64], b: u64) -> Vec<u64> {
    if b == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(a.len() + 1);
    let mut carry = 0u64;
    for &ai in a {
        let t = (ai as u128) * (b as u128) + carry as u128;
        out.push(t as u64);
        carry = (t >> 64) as u64;
    }
    if carry != 0 {
        out.push(carry);
    }
    while out.last() == Some(&0) {
        out.pop();
    }
    out
}

/// Magnitude division. Returns `(quotient, remainder)`.
pub(super) fn divrem_mag(a: &[u64], b: &[u64]) -> (Vec<u64>, Vec<u64>) {
    assert!(!b.is_empty(), "bigint: division by zero");
    if BigInt::cmp_mag(a, b) == Ordering::Less {
        return (Vec::new(), a.to_vec());
    }
    if b.len() == 1 {
        let (q, r) = divrem_limb(a, b[0]);
        return (q, if r == 0 { Vec::new() } else { vec![r] });
    }
    divrem_knuth(a, b)
}

pub(super) fn divrem_limb(a: &[u64], b: u64) -> (Vec<u64>, u64) {
    debug_assert!(b != 0);
    let mut q = vec![0u64; a.len()];
    let mut rem = 0u64;
    for i in (0..a.len()).rev() {
        let cur = ((rem as u128) << 64) | a[i] as u128;
        q[i] = (cur / b as u128) as u64;
        rem = (cur % b as u128) as u64;
    }
    while q.last() == Some(&0) {
        q.pop();
    }
    (q, rem)
}

/// Knuth algorithm D. Caller guarantees `a >= b` and `b.len() >= 2`.
fn divrem_knuth(a: &[u64], b: &[u64]) -> (Vec<u64>, Vec<u64>) {
    let n = b.len();
    let shift = b[n - 1].leading_zeros() as usize;

    // normalized copies: v's top limb has its high bit set,
    // u gets one extra limb to absorb the shift overflow
    let v = shl_limbs(b, shift, false);
    let mut u = shl_limbs(a, shift, true);
    debug_assert_eq!(v.len(), n);
    debug_assert_eq!(u.len(), a.len() + 1);

    let m = u.len() - n - 1;
    let mut q = vec![0u64; m + 1];
    let vtop = v[n - 1];
    let vnext = v[n - 2];

    for j in (0..=m).rev() {
        let u2 = u[j + n];
        let u1 = u[j + n - 1];
        let u0 = u[j + n - 2];

        let num = ((u2 as u128) << 64) | u1 as u128;
        let mut qhat = if u2 >= vtop {
            u64::MAX as u128
        } else {
            num / vtop as u128
        };
        let mut rhat = num - qhat * vtop as u128;
        while rhat <= u64::MAX as u128
            && qhat * vnext as u128 > ((rhat << 64) | u0 as u128)
        {
            qhat -= 1;
            rhat += vtop as u128;
        }

        // u[j..j+n+1] -= qhat * v
        let qh = qhat as u64;
        let mut mul_carry = 0u64;
        let mut borrow = 0u64;
        for i in 0..n {
            let p = (qh as u128) * (v[i] as u128) + mul_carry as u128;
            mul_carry = (p >> 64) as u64;
            let (d, b1) = u[j + i].overflowing_sub(p as u64);
            let (d, b2) = d.overflowing_sub(borrow);
            u[j + i] = d;
            borrow = (b1 | b2) as u64;
        }
        let (d, b1) = u[j + n].overflowing_sub(mul_carry);
        let (d, b2) = d.overflowing_sub(borrow);
        u[j + n] = d;

        let mut qj = qh;
        if b1 | b2 {
            // qhat was one too large: add v back
            qj -= 1;
            let mut carry = 0u64;
            for i in 0..n {
                let (s, c1) = u[j + i].overflowing_add(v[i]);
                let (s, c2) = s.overflowing_add(carry);
                u[j + i] = s;
                carry = (c1 | c2) as u64;
            }
            u[j + n] = u[j + n].wrapping_add(carry);
        }
        q[j] = qj;
    }

    while q.last() == Some(&0) {
        q.pop();
    }
    let mut r = shr_limbs(&u[..n], shift);
    while r.last() == Some(&0) {
        r.pop();
    }
    (q, r)
}

/// Shift limbs left by `shift < 64` bits. `extend` forces an extra top limb.
fn shl_limbs(a: &[u64], shift: usize, extend: bool) -> Vec<u64> {
    let mut out = Vec::with_capacity(a.len() + 1);
    if shift == 0 {
        out.extend_from_slice(a);
        if extend {
            out.push(0);
        }
        return out;
    }
    let mut carry = 0u64;
    for &limb in a {
        out.push((limb << shift) | carry);
        carry = limb >> (64 - shift);
    }
    if extend || carry != 0 {
        out.push(carry);
    }
    out
}

/// Shift limbs right by `shift < 64` bits.
fn shr_limbs(a: &[u64], shift: usize) -> Vec<u64> {
    if shift == 0 {
        return a.to_vec();
    }
    let mut out = vec![0u64; a.len()];
    for i in 0..a.len() {
        out[i] = a[i] >> shift;
        if i + 1 < a.len() {
            out[i] |= a[i + 1] << (64 - shift);
        }
    }
    out
}

fn add_signed(a: &BigInt, b: &BigInt) -> BigInt {
    match (a.sign, b.sign) {
        (Sign::NoSign, _) => b.clone(),
        (_, Sign::NoSign) => a.clone(),
        (x, y) if x == y => BigInt::from_parts(x, add_mag(&a.mag, &b.mag)),
        _ => match BigInt::cmp_mag(&a.mag, &b.mag) {
            Ordering::Equal => BigInt::zero(),
            Ordering::Greater => BigInt::from_parts(a.sign, sub_mag(&a.mag, &b.mag)),
            Ordering::Less => BigInt::from_parts(b.sign, sub_mag(&b.mag, &a.mag)),
        },
    }
}

impl BigInt {
    /// Truncated division: quotient rounds toward zero, remainder takes the
    /// sign of the dividend, `self = q * rhs + r` with `|r| < |rhs|`.
    ///
    /// Panics on a zero divisor.
    pub fn divrem(&self, rhs: &BigInt) -> (BigInt, BigInt) {
        assert!(!rhs.is_zero(), "bigint: division by zero");
        if self.is_zero() {
            return (BigInt::zero(), BigInt::zero());
        }
        let (q, r) = divrem_mag(&self.mag, &rhs.mag);
        let q_sign = if self.sign == rhs.sign {
            Sign::Plus
        } else {
            Sign::Minus
        };
        (
            BigInt::from_parts(q_sign, q),
            BigInt::from_parts(self.sign, r),
        )
    }

    /// The unique representative of `self` in `[0, |m|)`.
    pub fn modulo(&self, m: &BigInt) -> BigInt {
        assert!(!m.is_zero(), "bigint: division by zero");
        let (_, r) = self.divrem(m);
        if r.is_negative() {
            BigInt::from_parts(Sign::Plus, sub_mag(&m.mag, &r.mag))
        } else {
            r
        }
    }
}

impl Neg for &BigInt {
    type Output = BigInt;
    fn neg(self) -> BigInt {
        let sign = match self.sign {
            Sign::Plus => Sign::Minus,
            Sign::Minus => Sign::Plus,
            Sign::NoSign => return BigInt::zero(),
        };
        BigInt {
            sign,
            mag: self.mag.clone(),
        }
    }
}

impl Neg for BigInt {
    type Output = BigInt;
    fn neg(mut self) -> BigInt {
        self.sign = match self.sign {
            Sign::Plus => Sign::Minus,
            Sign::Minus => Sign::Plus,
            Sign::NoSign => Sign::NoSign,
        };
        self
    }
}

impl Add for &BigInt {
    type Output = BigInt;
    fn add(self, rhs: &BigInt) -> BigInt {
        add_signed(self, rhs)
    }
}

impl Sub for &BigInt {
    type Output = BigInt;
    fn sub(self, rhs: &BigInt) -> BigInt {
        match rhs.sign {
            Sign::NoSign => self.clone(),
            _ => add_signed(
                self,
                &BigInt {
                    sign: match rhs.sign {
                        Sign::Plus => Sign::Minus,
                        _ => Sign::Plus,
                    },
                    mag: rhs.mag.clone(),
                },
            ),
        }
    }
}

impl Mul for &BigInt {
    type Output = BigInt;
    fn mul(self, rhs: &BigInt) -> BigInt {
        if self.is_zero() || rhs.is_zero() {
            return BigInt::zero();
        }
        let sign = if self.sign == rhs.sign {
            Sign::Plus
        } else {
            Sign::Minus
        };
        BigInt::from_parts(sign, mul_mag(&self.mag, &rhs.mag))
    }
}

macro_rules! forward_binop {
    ($trait:ident, $method:ident) => {
        impl $trait<BigInt> for BigInt {
            type Output = BigInt;
            fn $method(self, rhs: BigInt) -> BigInt {
                (&self).$method(&rhs)
            }
        }
        impl $trait<&BigInt> for BigInt {
            type Output = BigInt;
            fn $method(self, rhs: &BigInt) -> BigInt {
                (&self).$method(rhs)
            }
        }
        impl $trait<BigInt> for &BigInt {
            type Output = BigInt;
            fn $method(self, rhs: BigInt) -> BigInt {
                self.$method(&rhs)
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);

#[cfg(test)]
mod tests {
    use super::*;

    fn bi(v: i128) -> BigInt {
        BigInt::from(v)
    }

    #[test]
    fn small_arithmetic_matches_i128() {
        let samples: &[i128] = &[
            0,
            1,
            -1,
            2,
            -3,
            17,
            255,
            -256,
            u64::MAX as i128,
            -(u64::MAX as i128),
            (u64::MAX as i128) + 1,
            i64::MAX as i128,
            i64::MIN as i128,
            1 << 100,
            -(1 << 100) + 7,
        ];
        for &a in samples {
            for &b in samples {
                assert_eq!(bi(a) + bi(b), bi(a + b), "{a} + {b}");
                assert_eq!(bi(a) - bi(b), bi(a - b), "{a} - {b}");
                if let Some(p) = a.checked_mul(b) {
                    assert_eq!(bi(a) * bi(b), bi(p), "{a} * {b}");
                }
                if b != 0 {
                    let (q, r) = bi(a).divrem(&bi(b));
                    assert_eq!(q, bi(a / b), "{a} / {b}");
                    assert_eq!(r, bi(a % b), "{a} % {b}");
                }
            }
        }
    }

    #[test]
    fn truncation_sign_table() {
        // quotient toward zero, remainder follows the dividend
        let cases = [
            (7, 3, 2, 1),
            (-7, 3, -2, -1),
            (7, -3, -2, 1),
            (-7, -3, 2, -1),
        ];
        for (a, b, q, r) in cases {
            let (qq, rr) = bi(a).divrem(&bi(b));
            assert_eq!((qq, rr), (bi(q), bi(r)));
        }
    }

    #[test]
    fn modulo_is_nonnegative() {
        for (a, m) in [(-7i128, 3i128), (7, 3), (-1, 5), (-15, 5), (4, -5), (-4, -5)] {
            let r = bi(a).modulo(&bi(m));
            assert_eq!(r, bi(a.rem_euclid(m.abs())));
        }
    }

    #[test]
    fn multi_limb_multiplication() {
        // (2^128 - 1)^2 = 2^256 - 2^129 + 1
        let a = BigInt::from(u128::MAX);
        let sq = &a * &a;
        let expected = (BigInt::one() << 256) - (BigInt::one() << 129) + BigInt::one();
        assert_eq!(sq, expected);
    }

    #[test]
    fn knuth_division_round_trip() {
        // exercise the multi-limb path, including the qhat correction branches
        let a = BigInt::from_str_radix(
            "F3A9C0DE4B17265800112233445566778899AABBCCDDEEFF0123456789ABCDEF\
             FEDCBA9876543210DEADBEEFCAFEBABE00112233445566778899AABBCCDDEEFF",
            16,
        )
        .unwrap();
        let b = BigInt::from_str_radix(
            "8000000000000000000000000000000000000000000000000000000000000001",
            16,
        )
        .unwrap();
        let (q, r) = a.divrem(&b);
        assert!(r < b);
        assert!(!r.is_negative());
        assert_eq!(&q * &b + &r, a);

        // divisor with a top limb of all ones
        let c = BigInt::from_str_radix(
            "FFFFFFFFFFFFFFFF00000000000000000000000000000000",
            16,
        )
        .unwrap();
        let (q, r) = a.divrem(&c);
        assert!(r < c);
        assert_eq!(&q * &c + &r, a);
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn divide_by_zero_panics() {
        let _ = bi(1).divrem(&BigInt::zero());
    }
}
