use std::fmt;

use secp256k1::{PublicKey, Secp256k1, SecretKey};

use crate::error::{Error, Result};

/// Length of a single affine coordinate of an uncompressed public key.
pub const COORDINATE_LEN: usize = 32;

const UNCOMPRESSED_PREFIX: u8 = 0x04;

/// A secp256k1 secret key together with its public key.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let secp = Secp256k1::signing_only();
        let secret = SecretKey::new(&mut rand::thread_rng());
        let public = PublicKey::from_secret_key(&secp, &secret);
        Self { secret, public }
    }

    /// Rebuild a key pair from a 32 byte big-endian secret.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| Error::InvalidSecretKey)?;
        Ok(Self::from_secret_key(secret))
    }

    pub fn from_secret_key(secret: SecretKey) -> Self {
        let secp = Secp256k1::signing_only();
        let public = PublicKey::from_secret_key(&secp, &secret);
        Self { secret, public }
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.secret_bytes()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Affine `(x, y)` coordinates of the public key, taken from its
    /// 65 byte uncompressed encoding.
    pub fn public_coordinates(&self) -> ([u8; COORDINATE_LEN], [u8; COORDINATE_LEN]) {
        let encoded = self.public.serialize_uncompressed();
        let mut x = [0u8; COORDINATE_LEN];
        let mut y = [0u8; COORDINATE_LEN];
        x.copy_from_slice(&encoded[1..1 + COORDINATE_LEN]);
        y.copy_from_slice(&encoded[1 + COORDINATE_LEN..]);
        (x, y)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Rebuild a public key from its affine coordinates.
pub fn public_key_from_coordinates(x: &[u8], y: &[u8]) -> Result<PublicKey> {
    for coordinate in [x, y] {
        if coordinate.len() != COORDINATE_LEN {
            return Err(Error::InvalidCoordinateLength {
                expected: COORDINATE_LEN,
                actual: coordinate.len(),
            });
        }
    }

    let mut encoded = Vec::with_capacity(1 + 2 * COORDINATE_LEN);
    encoded.push(UNCOMPRESSED_PREFIX);
    encoded.extend_from_slice(x);
    encoded.extend_from_slice(y);

    PublicKey::from_slice(&encoded).map_err(|_| Error::InvalidPublicKey)
}
