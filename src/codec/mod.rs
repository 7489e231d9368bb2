//! The paradoxical compression codec.
//!
//! Compress never grows its input; genuine shrinking is delegated to
//! DEFLATE, and an input that already ends in a valid artifact header has
//! its counter bumped and its proof rewritten instead, at constant length.
//! Decompress undoes exactly one step. Inputs whose trailing bytes do not
//! verify pass through unchanged in both directions.

use std::io::{Read, Write};

use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};
use tracing::{debug, warn};

use crate::constants::COUNTER_LEN;
use crate::crypto_tools::bigint::BigInt;
use crate::crypto_tools::group::Modulus;
use crate::sdk::api::{BytesVec, CodecError, CodecResult};
use crate::vdf::{self, Evaluation};

/// RSA-2048 from the RSA Factoring Challenge: a 2048-bit product of two
/// primes nobody knows.
const DEFAULT_MODULUS_HEX: &str =
    "C7970CEEDCC3B0754490201A7AA613CD73911081C790F5F1A8726F463550BB5B\
     7FF0DB8E1EA1189EC72F93D1650011BD721AEEACC2ACDE32A04107F0648C2813\
     A31F5B0B7765FF8B44B4B6FFC93384B646EB09C7CF5E8592D40EA33C80039F35\
     B4F14A04B51F7BFD781BE4D1673164BA8EB991C2C4D730BBBE35F592BDEF524A\
     F7E8DAEFD26C66FC02C479AF89D64D373F442709439DE66CEB955F3EA37D5159\
     F6135809F85334B5CB1813ADDC80CD05609F10AC6A95AD65872C909525BDAD32\
     BC729592642920F24C61DC5B3C3B7923E56B16A4D9D373D8721F24A3FC0F1B31\
     31F55615172866BCCC30F95054C824E733A5EB6817F7BC16399D48C6361CC7E5";

pub struct Codec {
    modulus: Modulus,
    counter_cap: Option<u128>,
}

impl Codec {
    pub fn new(modulus_value: BigInt) -> CodecResult<Self> {
        Ok(Self {
            modulus: Modulus::new(modulus_value)?,
            counter_cap: None,
        })
    }

    /// Bound the counter accepted by [`Self::decompress`]. An artifact with
    /// a larger counter is rejected instead of triggering its T-1 squarings.
    /// The reference behaviour (no cap) is the default.
    pub fn with_counter_cap(mut self, cap: u128) -> Self {
        self.counter_cap = Some(cap);
        self
    }

    pub fn modulus(&self) -> &Modulus {
        &self.modulus
    }

    /// Header size: the counter plus two group elements.
    pub fn header_len(&self) -> usize {
        COUNTER_LEN + 2 * self.modulus.byte_len()
    }

    /// Total: every branch returns output no longer than `data`.
    pub fn compress(&self, data: &[u8]) -> BytesVec {
        let header_len = self.header_len();
        if data.len() <= header_len {
            return data.to_vec();
        }

        // a DEFLATE win only counts if it pays for the header it introduces
        let deflated = deflate(data);
        if deflated.len() < data.len() - header_len {
            let eval = vdf::evaluate(&self.modulus, 0, &deflated);
            return self.assemble(deflated, 0, &eval);
        }

        // an input that is already a valid artifact gets its counter bumped
        // and its proof rewritten, at identical length
        if let Some((payload, counter, _)) = self.parse_artifact(data) {
            let next = counter.wrapping_add(1);
            let eval = vdf::evaluate(&self.modulus, next, payload);
            return self.assemble(payload.to_vec(), next, &eval);
        }

        debug!("compress: pass-through");
        data.to_vec()
    }

    /// Reverse one compression step. Fails only when a validated payload is
    /// rejected by DEFLATE, or when the counter cap is exceeded.
    pub fn decompress(&self, data: &[u8]) -> CodecResult<BytesVec> {
        if data.len() <= self.header_len() {
            return Ok(data.to_vec());
        }
        let (payload, counter, _) = match self.parse_artifact(data) {
            Some(parsed) => parsed,
            None => {
                debug!("decompress: pass-through");
                return Ok(data.to_vec());
            }
        };
        if let Some(cap) = self.counter_cap {
            if counter > cap {
                warn!("decompress: counter {} above cap {}", counter, cap);
                return Err(CodecError::CounterCapExceeded);
            }
        }
        if counter > 0 {
            let eval = vdf::evaluate(&self.modulus, counter - 1, payload);
            return Ok(self.assemble(payload.to_vec(), counter - 1, &eval));
        }
        inflate(payload)
    }

    /// Split off the trailing header and check it: both elements must
    /// decode and the proof must verify against the payload.
    fn parse_artifact<'a>(&self, data: &'a [u8]) -> Option<(&'a [u8], u128, Evaluation)> {
        let nlen = self.modulus.byte_len();
        let (payload, header) = data.split_at(data.len() - self.header_len());
        let counter = u128::from_be_bytes(header[..COUNTER_LEN].try_into().expect("sized slice"));
        let output = self.modulus.try_decode(&header[COUNTER_LEN..COUNTER_LEN + nlen])?;
        let proof = self.modulus.try_decode(&header[COUNTER_LEN + nlen..])?;
        let eval = Evaluation { output, proof };
        if !vdf::verify(&self.modulus, counter, payload, &eval) {
            return None;
        }
        Some((payload, counter, eval))
    }

    fn assemble(&self, mut payload: BytesVec, counter: u128, eval: &Evaluation) -> BytesVec {
        payload.reserve_exact(self.header_len());
        payload.extend_from_slice(&counter.to_be_bytes());
        payload.extend_from_slice(&self.modulus.encode(&eval.output));
        payload.extend_from_slice(&self.modulus.encode(&eval.proof));
        payload
    }
}

impl Default for Codec {
    /// The codec over the default 2048-bit modulus (header 528 bytes).
    fn default() -> Self {
        let n = BigInt::from_str_radix(DEFAULT_MODULUS_HEX, 16).expect("default modulus literal");
        Self::new(n).expect("default modulus is valid")
    }
}

fn deflate(data: &[u8]) -> BytesVec {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).expect("writing to a Vec cannot fail");
    encoder.finish().expect("writing to a Vec cannot fail")
}

fn inflate(data: &[u8]) -> CodecResult<BytesVec> {
    let mut out = Vec::new();
    DeflateDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|err| {
            warn!("inflate rejected a validated payload: {}", err);
            CodecError::Inflate(err)
        })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_tools::group::tests::mersenne_modulus;

    fn test_codec() -> Codec {
        Codec {
            modulus: mersenne_modulus(),
            counter_cap: None,
        }
    }

    #[test]
    fn default_codec_parameters() {
        let codec = Codec::default();
        assert_eq!(codec.modulus().byte_len(), 256);
        assert_eq!(codec.header_len(), 528);
        assert_eq!(codec.modulus().value().bit_length(), 2048);
        assert!(codec.modulus().value().is_odd());
    }

    #[test]
    fn deflate_inflate_round_trip() {
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaabbbbbbbbbbbb".repeat(10);
        let packed = deflate(&data);
        assert!(packed.len() < data.len());
        assert_eq!(inflate(&packed).unwrap(), data);
    }

    #[test]
    fn inflate_surfaces_decoder_errors() {
        let garbage = [0xFFu8; 32];
        assert!(matches!(inflate(&garbage), Err(CodecError::Inflate(_))));
    }

    #[test]
    fn artifact_assembles_and_parses() {
        let codec = test_codec();
        let payload = b"not very compressible payload".to_vec();
        let eval = vdf::evaluate(codec.modulus(), 9, &payload);
        let artifact = codec.assemble(payload.clone(), 9, &eval);
        assert_eq!(artifact.len(), payload.len() + codec.header_len());

        let (parsed_payload, counter, parsed_eval) =
            codec.parse_artifact(&artifact).expect("round trip");
        assert_eq!(parsed_payload, &payload[..]);
        assert_eq!(counter, 9);
        assert_eq!(parsed_eval, eval);
    }

    #[test]
    fn parse_rejects_wrong_counter() {
        let codec = test_codec();
        let payload = b"some payload".to_vec();
        let eval = vdf::evaluate(codec.modulus(), 4, &payload);
        let mut artifact = codec.assemble(payload.clone(), 4, &eval);
        // bump the counter without recomputing the proof
        let pos = payload.len() + COUNTER_LEN - 1;
        artifact[pos] ^= 1;
        assert!(codec.parse_artifact(&artifact).is_none());
    }

    #[test]
    fn counter_cap_is_enforced() {
        let codec = test_codec().with_counter_cap(3);
        let payload = b"capped payload".to_vec();
        let eval = vdf::evaluate(codec.modulus(), 7, &payload);
        let artifact = codec.assemble(payload, 7, &eval);
        assert!(matches!(
            codec.decompress(&artifact),
            Err(CodecError::CounterCapExceeded)
        ));

        // under the cap the same artifact unwinds normally
        let relaxed = test_codec().with_counter_cap(7);
        assert!(relaxed.decompress(&artifact).is_ok());
    }
}
