//! SHAKE128 extendable-output function: the Keccak sponge at capacity 256
//! bits (rate 168 bytes) with the SHAKE domain padding.

use super::keccak::{Domain, Sponge, SpongeReader};

const CAPACITY_BITS: usize = 256;

pub struct Shake128(Sponge);

impl Shake128 {
    pub fn new() -> Self {
        Self(Sponge::new(CAPACITY_BITS))
    }

    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    pub fn flip(self) -> Shake128Reader {
        Shake128Reader(self.0.flip(Domain::Shake))
    }
}

impl Default for Shake128 {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Shake128Reader(SpongeReader);

impl Shake128Reader {
    pub fn next(&mut self, out: &mut [u8]) {
        self.0.next(out);
    }

    pub fn next_vec(&mut self, len: usize) -> Vec<u8> {
        self.0.next_vec(len)
    }
}
