//! Secp256k1 framework version metadata.
//!
//! Both values are fixed at build time from the package metadata in
//! `Cargo.toml`.

/// Build version of the Secp256k1 framework as a floating-point number.
pub const VERSION_NUMBER: f64 = 1.0;

/// Build version of the Secp256k1 framework as a null-terminated string.
pub const VERSION_STRING: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
