//! WalletLibrary framework version metadata.

/// Build version of the WalletLibrary framework as a floating-point number.
pub const VERSION_NUMBER: f64 = 1.0;

/// Build version of the WalletLibrary framework as a null-terminated string.
pub const VERSION_STRING: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
