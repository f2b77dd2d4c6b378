//! Holder identifiers (did:ion long form) and identifier documents.

mod creator;
mod document;
mod manager;
mod resolver;

pub use creator::{IdentifierCreator, IdentifierFormatter};
pub use document::{IdentifierDocument, IdentifierDocumentService, VerificationMethod};
pub use manager::{FileIdentifierManager, IdentifierManager, InMemoryIdentifierManager};
pub use resolver::{DidDocumentResolver, IdentifierDocumentResolving};

use vid_secp256k1::KeyPair;

use crate::error::{Result, VerifiedIdError};

pub const SIGNING_KEY_PREFIX: &str = "sign_";
pub const UPDATE_KEY_PREFIX: &str = "update_";
pub const RECOVERY_KEY_PREFIX: &str = "recover_";

/// A signing key and the id it is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyContainer {
    pub key_id: String,
    pub key_pair: KeyPair,
}

impl KeyContainer {
    pub fn new(key_id: impl Into<String>, key_pair: KeyPair) -> Self {
        Self {
            key_id: key_id.into(),
            key_pair,
        }
    }
}

/// The wallet's own identifier together with its keys.
///
/// `keys` holds the document signing keys (`sign_<alias>`) next to the
/// update (`update_<alias>`) and recovery (`recover_<alias>`) keys the
/// long form commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderIdentifier {
    /// Long form did:ion.
    pub did: String,
    pub alias: String,
    pub keys: Vec<KeyContainer>,
}

impl HolderIdentifier {
    /// Keys published in the identifier document.
    pub fn did_document_keys(&self) -> Vec<&KeyContainer> {
        self.keys_with_prefix(SIGNING_KEY_PREFIX).collect()
    }

    /// First signing key, required for anything the holder signs.
    pub fn signing_key(&self) -> Result<&KeyContainer> {
        self.keys_with_prefix(SIGNING_KEY_PREFIX)
            .next()
            .ok_or_else(VerifiedIdError::no_keys_in_document)
    }

    pub fn update_key(&self) -> Option<&KeyContainer> {
        self.keys_with_prefix(UPDATE_KEY_PREFIX).next()
    }

    pub fn recovery_key(&self) -> Option<&KeyContainer> {
        self.keys_with_prefix(RECOVERY_KEY_PREFIX).next()
    }

    fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a KeyContainer> {
        self.keys
            .iter()
            .filter(move |key| key.key_id.starts_with(prefix))
    }

    /// `kid` header value for tokens signed with `key`.
    pub fn key_reference(&self, key: &KeyContainer) -> String {
        format!("{}#{}", self.did, key.key_id)
    }
}
