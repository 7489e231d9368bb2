//! Keccak-f[1600] and the absorb/squeeze sponge.
//!
//! The absorb-to-squeeze transition is a type change: [`Sponge::flip`]
//! consumes the absorbing sponge and returns a [`SpongeReader`]. Squeezing
//! from an absorbing sponge (or absorbing into a squeezing one) does not
//! compile, which is how the "fatal programming error" of out-of-state use
//! is ruled out.

const RC: [u64; 24] = [
    0x0000000000000001,
    0x0000000000008082,
    0x800000000000808a,
    0x8000000080008000,
    0x000000000000808b,
    0x0000000080000001,
    0x8000000080008081,
    0x8000000000008009,
    0x000000000000008a,
    0x0000000000000088,
    0x0000000080008009,
    0x000000008000000a,
    0x000000008000808b,
    0x800000000000008b,
    0x8000000000008089,
    0x8000000000008003,
    0x8000000000008002,
    0x8000000000000080,
    0x000000000000800a,
    0x800000008000000a,
    0x8000000080008081,
    0x8000000000008080,
    0x0000000080000001,
    0x8000000080008008,
];

const RHO: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];

const PI: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

/// The 24-round Keccak-f[1600] permutation.
pub fn keccak_f1600(a: &mut [u64; 25]) {
    for &rc in &RC {
        // theta
        let mut c = [0u64; 5];
        for x in 0..5 {
            c[x] = a[x] ^ a[x + 5] ^ a[x + 10] ^ a[x + 15] ^ a[x + 20];
        }
        for x in 0..5 {
            let d = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
            for y in 0..5 {
                a[x + 5 * y] ^= d;
            }
        }
        // rho and pi in one walk
        let mut last = a[1];
        for i in 0..24 {
            let tmp = a[PI[i]];
            a[PI[i]] = last.rotate_left(RHO[i]);
            last = tmp;
        }
        // chi
        for y in 0..5 {
            let row = [a[5 * y], a[5 * y + 1], a[5 * y + 2], a[5 * y + 3], a[5 * y + 4]];
            for x in 0..5 {
                a[5 * y + x] = row[x] ^ (!row[(x + 1) % 5] & row[(x + 2) % 5]);
            }
        }
        // iota
        a[0] ^= rc;
    }
}

/// Domain-padding byte appended on the absorb-to-squeeze flip.
#[derive(Debug, Clone, Copy)]
pub enum Domain {
    Shake = 0x1F,
    Sha3 = 0x06,
}

/// An absorbing sponge over Keccak-f[1600].
pub struct Sponge {
    state: [u64; 25],
    rate: usize,
    pos: usize,
}

impl Sponge {
    /// `capacity` in bits; must be a positive multiple of 64 below 1600.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity % 64 == 0 && capacity > 0 && capacity < 1600,
            "sponge: invalid capacity"
        );
        Self {
            state: [0; 25],
            rate: 200 - capacity / 8,
            pos: 0,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.state[self.pos / 8] ^= (byte as u64) << (8 * (self.pos % 8));
            self.pos += 1;
            if self.pos == self.rate {
                keccak_f1600(&mut self.state);
                self.pos = 0;
            }
        }
    }

    /// Apply the domain padding and switch to squeezing.
    pub fn flip(mut self, domain: Domain) -> SpongeReader {
        self.state[self.pos / 8] ^= (domain as u64) << (8 * (self.pos % 8));
        self.state[(self.rate - 1) / 8] ^= 0x80u64 << (8 * ((self.rate - 1) % 8));
        keccak_f1600(&mut self.state);
        SpongeReader {
            state: self.state,
            rate: self.rate,
            pos: 0,
        }
    }
}

/// A squeezing sponge. Obtained from [`Sponge::flip`].
pub struct SpongeReader {
    state: [u64; 25],
    rate: usize,
    pos: usize,
}

impl SpongeReader {
    pub fn next(&mut self, out: &mut [u8]) {
        for byte in out.iter_mut() {
            if self.pos == self.rate {
                keccak_f1600(&mut self.state);
                self.pos = 0;
            }
            *byte = (self.state[self.pos / 8] >> (8 * (self.pos % 8))) as u8;
            self.pos += 1;
        }
    }

    pub fn next_vec(&mut self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.next(&mut out);
        out
    }
}
