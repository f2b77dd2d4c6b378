use rand::RngCore;

use crate::token::b64url;

const NONCE_PREFIX_LEN: usize = 32;

/// Nonces that tie a request to the holder's identifier.
pub struct NonceCreator;

impl NonceCreator {
    /// `b64url(random 32 bytes) + "." + b64url(SHA-512(did))`.
    pub fn create(did: &str) -> String {
        let mut prefix = [0u8; NONCE_PREFIX_LEN];
        rand::thread_rng().fill_bytes(&mut prefix);

        let did_hash = vid_secp256k1::sha512(did.as_bytes());
        format!("{}.{}", b64url(prefix), b64url(did_hash))
    }
}
