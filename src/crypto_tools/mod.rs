pub mod bigint;
pub mod group;
pub mod keccak;
pub mod rng;
pub mod shake;
