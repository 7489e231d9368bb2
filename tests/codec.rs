//! End-to-end codec scenarios against the default 2048-bit modulus.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing_test::traced_test;

use parcomp::codec::Codec;

const HEADER_LEN: usize = 528;

fn random_bytes(len: usize, seed: u8) -> Vec<u8> {
    let mut rng = ChaCha20Rng::from_seed([seed; 32]);
    let mut out = vec![0u8; len];
    rng.fill_bytes(&mut out);
    out
}

#[test]
fn empty_input_passes_through() {
    let codec = Codec::default();
    assert_eq!(codec.compress(&[]), Vec::<u8>::new());
    assert_eq!(codec.decompress(&[]).unwrap(), Vec::<u8>::new());
}

#[test]
fn short_inputs_pass_through() {
    let codec = Codec::default();
    assert_eq!(codec.header_len(), HEADER_LEN);
    for len in [1, 16, HEADER_LEN - 1, HEADER_LEN] {
        let data = random_bytes(len, 1);
        assert_eq!(codec.compress(&data), data, "len {len}");
        assert_eq!(codec.decompress(&data).unwrap(), data, "len {len}");
    }
}

#[test]
fn compressible_input_shrinks_and_round_trips() {
    let codec = Codec::default();
    let data = vec![0u8; 2000];

    let compressed = codec.compress(&data);
    assert!(compressed.len() < data.len());
    assert!(compressed.len() > HEADER_LEN);

    // a freshly shrunk artifact carries counter zero
    let counter_field = &compressed[compressed.len() - HEADER_LEN..][..16];
    assert_eq!(counter_field, &[0u8; 16]);

    assert_eq!(codec.decompress(&compressed).unwrap(), data);
}

#[test]
fn incompressible_input_passes_through() {
    let codec = Codec::default();
    let data = random_bytes(2000, 2);
    assert_eq!(codec.compress(&data), data);
    assert_eq!(codec.decompress(&data).unwrap(), data);
}

#[test]
fn iterated_compression_is_non_increasing_and_reversible() {
    let codec = Codec::default();
    let d0 = vec![0u8; 2000];

    let mut steps = vec![d0.clone()];
    for i in 1..=5 {
        let prev = steps.last().unwrap();
        let next = codec.compress(prev);
        assert!(next.len() <= prev.len(), "step {i} grew");
        steps.push(next);
    }

    // after the first step the length is pinned: the counter just climbs
    assert_eq!(steps[2].len(), steps[1].len());
    assert_eq!(steps[5].len(), steps[1].len());
    let counter_field = &steps[5][steps[5].len() - HEADER_LEN..][..16];
    assert_eq!(counter_field, &4u128.to_be_bytes());

    let mut current = steps[5].clone();
    for _ in 0..5 {
        current = codec.decompress(&current).unwrap();
    }
    assert_eq!(current, d0);
}

#[test]
#[traced_test]
fn tampered_artifact_passes_through_unchanged() {
    let codec = Codec::default();
    let compressed = codec.compress(&vec![0u8; 2000]);

    // flip a byte in the middle of the f field
    let mut tampered = compressed.clone();
    let f_mid = tampered.len() - HEADER_LEN + 16 + 128;
    tampered[f_mid] ^= 0x40;
    assert_ne!(tampered, compressed);

    assert_eq!(codec.decompress(&tampered).unwrap(), tampered);
    // compressing the tampered bytes is also a pass-through: DEFLATE cannot
    // win back the header and the trailing proof no longer verifies
    assert_eq!(codec.compress(&tampered), tampered);
}

#[test]
fn compress_never_expands() {
    let codec = Codec::default();
    for (len, seed) in [(0usize, 3u8), (100, 4), (529, 5), (1000, 6), (3000, 7)] {
        let data = random_bytes(len, seed);
        assert!(codec.compress(&data).len() <= data.len(), "len {len}");
    }
    let zeros = vec![0u8; 5000];
    assert!(codec.compress(&zeros).len() <= zeros.len());
}
