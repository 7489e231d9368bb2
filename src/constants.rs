// Domain separation constants for the VDF hash oracles
pub const GROUP_ORACLE_TAG: u8 = 0x01;
pub const PRIME_ORACLE_TAG: u8 = 0x02;

/// Width of the counter field in an artifact header, in bytes.
pub const COUNTER_LEN: usize = 16;

/// The smallest modulus the codec accepts, in bits.
pub const MODULUS_MIN_BITS: usize = 1024;
