use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};

use crate::error::{Error, Result};
use crate::hash::sha256;

/// Length of a compact `r||s` signature.
pub const SIGNATURE_LEN: usize = 64;

/// ECDSA over secp256k1 with SHA-256, as used by the `ES256K` JWS algorithm.
pub struct Es256k;

impl Es256k {
    pub const ALGORITHM: &'static str = "ES256K";

    /// Sign `message` and return the compact 64 byte signature.
    ///
    /// # Arguments
    /// * `message` - Raw bytes to sign, hashed with SHA-256 before signing
    /// * `secret` - Signing key
    ///
    /// # Returns
    /// * `r||s`, both big-endian 32 byte integers
    pub fn sign(message: &[u8], secret: &SecretKey) -> [u8; SIGNATURE_LEN] {
        let secp = Secp256k1::signing_only();
        let digest = Message::from_digest(sha256(message));
        secp.sign_ecdsa(&digest, secret).serialize_compact()
    }

    /// Verify a compact signature over `message`.
    ///
    /// High-S signatures are normalized before verification.
    ///
    /// # Arguments
    /// * `message` - Raw bytes that were signed
    /// * `signature` - Compact `r||s` signature
    /// * `public_key` - Key expected to have produced the signature
    ///
    /// # Returns
    /// * `Ok(false)` when the signature is well formed but does not match
    pub fn verify(message: &[u8], signature: &[u8], public_key: &PublicKey) -> Result<bool> {
        if signature.len() != SIGNATURE_LEN {
            return Err(Error::InvalidSignatureLength(signature.len()));
        }

        let mut signature = Signature::from_compact(signature).map_err(|_| Error::InvalidSignature)?;
        signature.normalize_s();

        let secp = Secp256k1::verification_only();
        let digest = Message::from_digest(sha256(message));
        Ok(secp.verify_ecdsa(&digest, &signature, public_key).is_ok())
    }
}
