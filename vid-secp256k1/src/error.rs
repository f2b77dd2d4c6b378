use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Keys
    #[error("invalid secret key")]
    InvalidSecretKey,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("public key coordinate must be {expected} bytes, got {actual}")]
    InvalidCoordinateLength { expected: usize, actual: usize },

    // Signatures
    #[error("signature must be 64 bytes, got {0}")]
    InvalidSignatureLength(usize),
    #[error("invalid signature")]
    InvalidSignature,

    // Wrapped external errors
    #[error(transparent)]
    Secp256k1(#[from] secp256k1::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
