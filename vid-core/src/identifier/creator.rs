use serde::Serialize;
use serde_json::{json, Value};
use vid_secp256k1::{sha256, KeyPair};

use super::{
    HolderIdentifier, KeyContainer, RECOVERY_KEY_PREFIX, SIGNING_KEY_PREFIX, UPDATE_KEY_PREFIX,
};
use crate::error::Result;
use crate::token::{b64url, EcPublicJwk};

const SHA256_MULTIHASH_PREFIX: [u8; 2] = [0x12, 0x20];
const ION_METHOD_PREFIX: &str = "did:ion";
const VERIFICATION_KEY_TYPE: &str = "EcdsaSecp256k1VerificationKey2019";
const AUTHENTICATION_PURPOSE: &str = "authentication";

/// Creates holder identifiers with fresh keys.
pub struct IdentifierCreator;

impl IdentifierCreator {
    pub fn create(alias: &str) -> Result<HolderIdentifier> {
        let signing = KeyContainer::new(format!("{}{}", SIGNING_KEY_PREFIX, alias), KeyPair::generate());
        let update = KeyContainer::new(format!("{}{}", UPDATE_KEY_PREFIX, alias), KeyPair::generate());
        let recovery = KeyContainer::new(
            format!("{}{}", RECOVERY_KEY_PREFIX, alias),
            KeyPair::generate(),
        );

        let did = IdentifierFormatter::long_form(
            &public_jwk(&recovery),
            &public_jwk(&update),
            &[public_jwk(&signing)],
        )?;
        log::debug!("created identifier for alias {}", alias);

        Ok(HolderIdentifier {
            did,
            alias: alias.to_string(),
            keys: vec![signing, update, recovery],
        })
    }
}

fn public_jwk(key: &KeyContainer) -> EcPublicJwk {
    EcPublicJwk::from_key_pair(&key.key_pair, Some(key.key_id.clone()))
}

/// Builds the did:ion long form for a set of public keys.
///
/// Document keys are published under their `kid`.
pub struct IdentifierFormatter;

impl IdentifierFormatter {
    pub fn long_form(
        recovery_key: &EcPublicJwk,
        update_key: &EcPublicJwk,
        document_keys: &[EcPublicJwk],
    ) -> Result<String> {
        let public_keys: Vec<Value> = document_keys
            .iter()
            .map(|jwk| {
                json!({
                    "id": jwk.kid.clone().unwrap_or_default(),
                    "type": VERIFICATION_KEY_TYPE,
                    "publicKeyJwk": jwk,
                    "purposes": [AUTHENTICATION_PURPOSE],
                })
            })
            .collect();
        let delta = json!({
            "patches": [{
                "action": "replace",
                "document": {
                    "publicKeys": public_keys,
                    "services": [],
                },
            }],
            "updateCommitment": Self::commitment(update_key)?,
        });

        let suffix_data = json!({
            "deltaHash": b64url(multihash(canonical(&delta)?.as_bytes())),
            "recoveryCommitment": Self::commitment(recovery_key)?,
        });

        let short_form = format!(
            "{}:{}",
            ION_METHOD_PREFIX,
            b64url(multihash(canonical(&suffix_data)?.as_bytes()))
        );
        let initial_state = json!({
            "delta": delta,
            "suffixData": suffix_data,
        });

        Ok(format!(
            "{}:{}",
            short_form,
            b64url(canonical(&initial_state)?)
        ))
    }

    /// Double multihash over the canonical public JWK, every member included.
    pub fn commitment(jwk: &EcPublicJwk) -> Result<String> {
        let reveal = multihash(canonical(jwk)?.as_bytes());
        Ok(b64url(multihash(&reveal)))
    }
}

/// JSON with object keys in sorted order.
fn canonical<T: Serialize>(value: &T) -> Result<String> {
    let value: Value = serde_json::to_value(value)?;
    Ok(value.to_string())
}

fn multihash(bytes: &[u8]) -> Vec<u8> {
    let mut hashed = SHA256_MULTIHASH_PREFIX.to_vec();
    hashed.extend_from_slice(&sha256(bytes));
    hashed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::b64url_decode;

    #[test]
    fn test_create_long_form() {
        let identifier = IdentifierCreator::create("master").unwrap();
        assert_eq!(identifier.alias, "master");
        assert_eq!(identifier.signing_key().unwrap().key_id, "sign_master");

        let parts: Vec<&str> = identifier.did.split(':').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(&parts[..2], &["did", "ion"]);

        let suffix = b64url_decode(parts[2]).unwrap();
        assert_eq!(&suffix[..2], &SHA256_MULTIHASH_PREFIX);
        assert_eq!(suffix.len(), 34);
    }

    #[test]
    fn test_long_form_embeds_signing_key() {
        let identifier = IdentifierCreator::create("alias").unwrap();
        let encoded = identifier.did.rsplit(':').next().unwrap();
        let state: Value = serde_json::from_slice(&b64url_decode(encoded).unwrap()).unwrap();

        let key = &state["delta"]["patches"][0]["document"]["publicKeys"][0];
        assert_eq!(key["id"], "sign_alias");
        assert_eq!(key["type"], VERIFICATION_KEY_TYPE);
        assert_eq!(key["purposes"], json!(["authentication"]));

        let signing = identifier.signing_key().unwrap();
        let expected = EcPublicJwk::from_key_pair(&signing.key_pair, None);
        assert_eq!(key["publicKeyJwk"]["x"], expected.x);
        assert_eq!(key["publicKeyJwk"]["kid"], "sign_alias");
    }

    #[test]
    fn test_update_and_recovery_keys_are_kept() {
        let identifier = IdentifierCreator::create("holder").unwrap();
        let ids: Vec<&str> = identifier.keys.iter().map(|key| key.key_id.as_str()).collect();
        assert!(ids.contains(&"sign_holder"));
        assert!(ids.contains(&"update_holder"));
        assert!(ids.contains(&"recover_holder"));
        assert_eq!(identifier.did_document_keys().len(), 1);

        let encoded = identifier.did.rsplit(':').next().unwrap();
        let state: Value = serde_json::from_slice(&b64url_decode(encoded).unwrap()).unwrap();
        let update = identifier.update_key().unwrap();
        let recovery = identifier.recovery_key().unwrap();
        assert_eq!(
            state["delta"]["updateCommitment"],
            IdentifierFormatter::commitment(&public_jwk(update)).unwrap()
        );
        assert_eq!(
            state["suffixData"]["recoveryCommitment"],
            IdentifierFormatter::commitment(&public_jwk(recovery)).unwrap()
        );
    }

    fn fixed_jwk() -> EcPublicJwk {
        EcPublicJwk::from_coordinates(
            "Ir5lqT2yDCXdWI8HgMj2erz9HVChFFv4Bd70oDqclvs",
            "_uSQb2NNO3MMnsS83ByMxayGbk3ODYxAlMx-_YOw5oc",
            Some("testKey".to_string()),
        )
    }

    #[test]
    fn test_commitment_covers_full_jwk() {
        assert_eq!(
            IdentifierFormatter::commitment(&fixed_jwk()).unwrap(),
            "EiAH3--84rx9V1KiCmQbNOavkCqE-ZW-zdBcbCAg5cbIBg"
        );
    }

    #[test]
    fn test_long_form_for_fixed_key() {
        let key = fixed_jwk();
        let did = IdentifierFormatter::long_form(&key, &key, &[key.clone()]).unwrap();
        assert_eq!(did, FIXED_KEY_DID);
    }

    const FIXED_KEY_DID: &str = "did:ion:EiBqI3vUhJSlAfpBMqf9K0xTL-qwvsqv3nUSLxB5npih9g:eyJkZWx0YSI6eyJwYXRjaGVzIjpbeyJhY3Rpb24iOiJyZXBsYWNlIiwiZG9jdW1lbnQiOnsicHVibGljS2V5cyI6W3siaWQiOiJ0ZXN0S2V5IiwicHVibGljS2V5SndrIjp7ImFsZyI6IkVTMjU2SyIsImNydiI6InNlY3AyNTZrMSIsImtleV9vcHMiOlsidmVyaWZ5Il0sImtpZCI6InRlc3RLZXkiLCJrdHkiOiJFQyIsInVzZSI6InNpZyIsIngiOiJJcjVscVQyeURDWGRXSThIZ01qMmVyejlIVkNoRkZ2NEJkNzBvRHFjbHZzIiwieSI6Il91U1FiMk5OTzNNTW5zUzgzQnlNeGF5R2JrM09EWXhBbE14LV9ZT3c1b2MifSwicHVycG9zZXMiOlsiYXV0aGVudGljYXRpb24iXSwidHlwZSI6IkVjZHNhU2VjcDI1NmsxVmVyaWZpY2F0aW9uS2V5MjAxOSJ9XSwic2VydmljZXMiOltdfX1dLCJ1cGRhdGVDb21taXRtZW50IjoiRWlBSDMtLTg0cng5VjFLaUNtUWJOT2F2a0NxRS1aVy16ZEJjYkNBZzVjYklCZyJ9LCJzdWZmaXhEYXRhIjp7ImRlbHRhSGFzaCI6IkVpRDQ4N25LaFlvaFY5c004MEYxMEgwSmJHOXhyaTJKcDJPRk1aRmFKREhXWXciLCJyZWNvdmVyeUNvbW1pdG1lbnQiOiJFaUFIMy0tODRyeDlWMUtpQ21RYk5PYXZrQ3FFLVpXLXpkQmNiQ0FnNWNiSUJnIn19";

    #[test]
    fn test_short_form_is_hash_of_suffix_data() {
        let identifier = IdentifierCreator::create("alias").unwrap();
        let parts: Vec<&str> = identifier.did.split(':').collect();
        let state: Value = serde_json::from_slice(&b64url_decode(parts[3]).unwrap()).unwrap();

        let expected = b64url(multihash(
            canonical(&state["suffixData"]).unwrap().as_bytes(),
        ));
        assert_eq!(parts[2], expected);
    }

    #[test]
    fn test_canonical_sorts_keys() {
        let value = json!({"b": 1, "a": {"d": 2, "c": 3}});
        assert_eq!(canonical(&value).unwrap(), r#"{"a":{"c":3,"d":2},"b":1}"#);
    }
}
