//! API for parcomp users
use std::fmt;
use std::io;

pub type CodecResult<T> = Result<T, CodecError>;
pub type BytesVec = Vec<u8>;

#[derive(Debug)]
pub enum CodecError {
    /// The modulus failed the validity check at codec construction.
    InvalidModulus,
    /// Decompression saw a counter above the configured cap.
    CounterCapExceeded,
    /// DEFLATE rejected the payload of an otherwise valid artifact.
    Inflate(io::Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidModulus => f.write_str("invalid modulus"),
            Self::CounterCapExceeded => f.write_str("counter exceeds the configured cap"),
            Self::Inflate(err) => write!(f, "deflate stream rejected: {err}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Inflate(err) => Some(err),
            _ => None,
        }
    }
}
