use serde::{Deserialize, Serialize};
use serde_json::json;
use vid_secp256k1::secp256k1::PublicKey;
use vid_secp256k1::{public_key_from_coordinates, sha256, Es256k, KeyPair};

use super::{b64url, b64url_decode};
use crate::error::{required, Result, VerifiedIdError};

const SECP256K1_CURVE: &str = "secp256k1";

/// JSON Web Key as found in identifier documents and token headers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

impl Jwk {
    /// Public key for ES256K verification.
    ///
    /// Only `secp256k1` keys are accepted (case-insensitive).
    pub fn public_key(&self) -> Result<PublicKey> {
        let curve = self.crv.as_deref().unwrap_or_default();
        if !curve.eq_ignore_ascii_case(SECP256K1_CURVE) {
            return Err(VerifiedIdError::invalid_property(
                "crv",
                SECP256K1_CURVE,
                self.crv.as_deref(),
            ));
        }

        let x = b64url_decode(&required(self.x.clone(), "x", "JWK")?)?;
        let y = b64url_decode(&required(self.y.clone(), "y", "JWK")?)?;
        Ok(public_key_from_coordinates(&x, &y)?)
    }
}

/// Public secp256k1 key in the shape used inside did:ion documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcPublicJwk {
    pub kty: String,
    #[serde(rename = "use")]
    pub key_use: String,
    pub key_ops: Vec<String>,
    pub alg: String,
    pub crv: String,
    pub x: String,
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl EcPublicJwk {
    pub fn from_key_pair(key_pair: &KeyPair, kid: Option<String>) -> Self {
        let (x, y) = key_pair.public_coordinates();
        Self::from_coordinates(b64url(x), b64url(y), kid)
    }

    /// Key from base64url encoded coordinates.
    pub fn from_coordinates(x: impl Into<String>, y: impl Into<String>, kid: Option<String>) -> Self {
        Self {
            kty: "EC".to_string(),
            key_use: "sig".to_string(),
            key_ops: vec!["verify".to_string()],
            alg: Es256k::ALGORITHM.to_string(),
            crv: SECP256K1_CURVE.to_string(),
            x: x.into(),
            y: y.into(),
            kid,
        }
    }

    /// RFC 7638 thumbprint: SHA-256 over the required members in
    /// lexicographic order.
    pub fn thumbprint(&self) -> String {
        let members = json!({
            "crv": self.crv,
            "kty": self.kty,
            "x": self.x,
            "y": self.y,
        });
        b64url(sha256(members.to_string().as_bytes()))
    }

    pub fn to_jwk(&self) -> Jwk {
        Jwk {
            kty: self.kty.clone(),
            kid: self.kid.clone(),
            crv: Some(self.crv.clone()),
            key_use: Some(self.key_use.clone()),
            x: Some(self.x.clone()),
            y: Some(self.y.clone()),
            d: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;

    #[test]
    fn test_public_jwk_round_trips_to_public_key() {
        let pair = KeyPair::generate();
        let jwk = EcPublicJwk::from_key_pair(&pair, Some("sign_1".to_string())).to_jwk();
        assert_eq!(&jwk.public_key().unwrap(), pair.public_key());
    }

    #[test]
    fn test_curve_is_case_insensitive() {
        let pair = KeyPair::generate();
        let mut jwk = EcPublicJwk::from_key_pair(&pair, None).to_jwk();
        jwk.crv = Some("SECP256K1".to_string());
        assert!(jwk.public_key().is_ok());
    }

    #[test]
    fn test_other_curves_rejected() {
        let pair = KeyPair::generate();
        let mut jwk = EcPublicJwk::from_key_pair(&pair, None).to_jwk();
        jwk.crv = Some("P-256".to_string());
        let err = jwk.public_key().unwrap_err();
        assert_eq!(err.code, codes::INVALID_PROPERTY);
    }

    #[test]
    fn test_thumbprint_ignores_optional_members() {
        let pair = KeyPair::generate();
        let with_kid = EcPublicJwk::from_key_pair(&pair, Some("a".to_string()));
        let without_kid = EcPublicJwk::from_key_pair(&pair, None);
        assert_eq!(with_kid.thumbprint(), without_kid.thumbprint());
        assert_eq!(with_kid.thumbprint().len(), 43);
    }

    #[test]
    fn test_serializes_use_member() {
        let pair = KeyPair::generate();
        let value = serde_json::to_value(EcPublicJwk::from_key_pair(&pair, None)).unwrap();
        assert_eq!(value["use"], "sig");
        assert_eq!(value["key_ops"][0], "verify");
        assert!(value.get("kid").is_none());
    }
}
