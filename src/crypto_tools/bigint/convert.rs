//! Byte and string conversions.
//!
//! Unsigned encodings are minimal (no leading zero byte) and reject
//! negative values. Signed encodings are minimal two's complement. serde
//! support delegates to the signed big-endian form, mirroring how the wire
//! layer treats every integer as bytes.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::{arith, BigInt, Sign};

const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

impl BigInt {
    /// Minimal unsigned big-endian bytes. Zero encodes as empty.
    /// Panics on negative values.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        assert!(
            !self.is_negative(),
            "bigint: unsigned encoding of a negative value"
        );
        let mut out = Vec::with_capacity(self.mag.len() * 8);
        for &limb in self.mag.iter().rev() {
            out.extend_from_slice(&limb.to_be_bytes());
        }
        let zeros = out.iter().take_while(|&&b| b == 0).count();
        out.drain(..zeros);
        out
    }

    /// Minimal unsigned little-endian bytes. Zero encodes as empty.
    pub fn to_bytes_le(&self) -> Vec<u8> {
        let mut out = self.to_bytes_be();
        out.reverse();
        out
    }

    /// Unsigned big-endian bytes left-padded with zeros to `width`.
    /// Panics if the value does not fit.
    pub fn to_bytes_be_padded(&self, width: usize) -> Vec<u8> {
        let bytes = self.to_bytes_be();
        assert!(bytes.len() <= width, "bigint: value wider than padding");
        let mut out = vec![0u8; width - bytes.len()];
        out.extend_from_slice(&bytes);
        out
    }

    pub fn from_bytes_be(bytes: &[u8]) -> BigInt {
        let bytes = &bytes[bytes.iter().take_while(|&&b| b == 0).count()..];
        let mut mag = Vec::with_capacity((bytes.len() + 7) / 8);
        for chunk in bytes.rchunks(8) {
            let mut limb = [0u8; 8];
            limb[8 - chunk.len()..].copy_from_slice(chunk);
            mag.push(u64::from_be_bytes(limb));
        }
        BigInt::from_parts(Sign::Plus, mag)
    }

    pub fn from_bytes_le(bytes: &[u8]) -> BigInt {
        let mut be = bytes.to_vec();
        be.reverse();
        Self::from_bytes_be(&be)
    }

    /// Minimal signed (two's complement) big-endian bytes. Zero is empty.
    pub fn to_signed_bytes_be(&self) -> Vec<u8> {
        match self.sign {
            Sign::NoSign => Vec::new(),
            Sign::Plus => {
                let mut bytes = self.to_bytes_be();
                if bytes[0] & 0x80 != 0 {
                    bytes.insert(0, 0);
                }
                bytes
            }
            Sign::Minus => {
                let mut bytes = self.abs().to_bytes_be();
                negate_bytes(&mut bytes);
                if bytes[0] & 0x80 == 0 {
                    bytes.insert(0, 0xFF);
                }
                bytes
            }
        }
    }

    pub fn to_signed_bytes_le(&self) -> Vec<u8> {
        let mut out = self.to_signed_bytes_be();
        out.reverse();
        out
    }

    pub fn from_signed_bytes_be(bytes: &[u8]) -> BigInt {
        match bytes.first() {
            None => BigInt::zero(),
            Some(&top) if top & 0x80 != 0 => {
                let mut mag = bytes.to_vec();
                negate_bytes(&mut mag);
                -Self::from_bytes_be(&mag)
            }
            _ => Self::from_bytes_be(bytes),
        }
    }

    pub fn from_signed_bytes_le(bytes: &[u8]) -> BigInt {
        let mut be = bytes.to_vec();
        be.reverse();
        Self::from_signed_bytes_be(&be)
    }

    /// Parse with optional `-` sign and `0x`/`0b` prefix. The prefix must
    /// agree with `radix` (16 and 2 respectively).
    pub fn from_str_radix(s: &str, radix: u32) -> Result<BigInt, ParseBigIntError> {
        assert!((2..=36).contains(&radix), "bigint: radix out of range");
        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let rest = match radix {
            16 => rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")).unwrap_or(rest),
            2 => rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")).unwrap_or(rest),
            _ => rest,
        };
        if rest.is_empty() {
            return Err(ParseBigIntError);
        }
        let mut mag: Vec<u64> = Vec::new();
        for &b in rest.as_bytes() {
            let d = (b as char).to_digit(radix).ok_or(ParseBigIntError)?;
            mag = arith::mul_limb(&mag, radix as u64);
            // add the digit in place
            let mut carry = d as u64;
            for limb in mag.iter_mut() {
                let (s, c) = limb.overflowing_add(carry);
                *limb = s;
                carry = c as u64;
                if carry == 0 {
                    break;
                }
            }
            if carry != 0 {
                mag.push(carry);
            }
        }
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        Ok(BigInt::from_parts(sign, mag))
    }

    /// Render in the given radix; digits above 9 are uppercase.
    pub fn to_str_radix(&self, radix: u32) -> String {
        assert!((2..=36).contains(&radix), "bigint: radix out of range");
        if self.is_zero() {
            return "0".to_string();
        }
        let mut digits = Vec::new();
        let mut mag = self.mag.clone();
        while !mag.is_empty() {
            let (q, r) = arith::divrem_limb(&mag, radix as u64);
            digits.push(DIGITS[r as usize]);
            mag = q;
        }
        if self.is_negative() {
            digits.push(b'-');
        }
        digits.reverse();
        String::from_utf8(digits).expect("digits are ascii")
    }
}

/// Two's-complement negation of a big-endian byte string, in place.
fn negate_bytes(bytes: &mut [u8]) {
    let mut carry = 1u8;
    for b in bytes.iter_mut().rev() {
        let (s, c) = (!*b).overflowing_add(carry);
        *b = s;
        carry = c as u8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseBigIntError;

impl fmt::Display for ParseBigIntError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid integer literal")
    }
}

impl std::error::Error for ParseBigIntError {}

impl FromStr for BigInt {
    type Err = ParseBigIntError;

    /// Radix 10, with `0x`/`0b` prefixes switching to 16/2.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('-').unwrap_or(s);
        if digits.starts_with("0x") || digits.starts_with("0X") {
            Self::from_str_radix(s, 16)
        } else if digits.starts_with("0b") || digits.starts_with("0B") {
            Self::from_str_radix(s, 2)
        } else {
            Self::from_str_radix(s, 10)
        }
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_radix(10))
    }
}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_radix(10))
    }
}

impl Serialize for BigInt {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_signed_bytes_be().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BigInt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = Deserialize::deserialize(deserializer)?;
        let value = BigInt::from_signed_bytes_be(&bytes);
        // reject redundant leading bytes so equal values have equal encodings
        if value.to_signed_bytes_be() != bytes {
            return Err(de::Error::custom("non-minimal integer encoding"));
        }
        Ok(value)
    }
}
