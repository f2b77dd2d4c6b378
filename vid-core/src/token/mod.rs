//! JWS compact tokens signed with ES256K.

mod jwk;
mod jws;
pub(crate) mod numeric_date;
pub mod validation;

pub use jwk::{EcPublicJwk, Jwk};
pub use jws::{Header, JwsToken};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

pub(crate) fn b64url(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn b64url_decode(encoded: &str) -> crate::error::Result<Vec<u8>> {
    Ok(URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('='))?)
}
