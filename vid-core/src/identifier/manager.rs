use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use vid_secp256k1::KeyPair;

use super::{HolderIdentifier, IdentifierCreator, KeyContainer};
use crate::error::{Result, VerifiedIdError};

const MASTER_IDENTIFIER_ALIAS: &str = "master";

/// Source of the holder identifier used for signing.
pub trait IdentifierManager: Send + Sync {
    fn fetch_or_create_master_identifier(&self) -> Result<HolderIdentifier>;
}

/// Creates the master identifier on first use and keeps it for the
/// lifetime of the process.
#[derive(Default)]
pub struct InMemoryIdentifierManager {
    identifier: Mutex<Option<HolderIdentifier>>,
}

impl InMemoryIdentifierManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentifierManager for InMemoryIdentifierManager {
    fn fetch_or_create_master_identifier(&self) -> Result<HolderIdentifier> {
        let mut cached = self
            .identifier
            .lock()
            .map_err(|e| VerifiedIdError::unspecified(e.to_string()))?;

        if let Some(identifier) = cached.as_ref() {
            return Ok(identifier.clone());
        }

        let identifier = IdentifierCreator::create(MASTER_IDENTIFIER_ALIAS)?;
        *cached = Some(identifier.clone());
        Ok(identifier)
    }
}

#[derive(Serialize, Deserialize)]
struct StoredKey {
    key_id: String,
    secret: String,
}

#[derive(Serialize, Deserialize)]
struct StoredIdentifier {
    alias: String,
    did: String,
    keys: Vec<StoredKey>,
}

impl StoredIdentifier {
    fn from_identifier(identifier: &HolderIdentifier) -> Self {
        Self {
            alias: identifier.alias.clone(),
            did: identifier.did.clone(),
            keys: identifier
                .keys
                .iter()
                .map(|key| StoredKey {
                    key_id: key.key_id.clone(),
                    secret: hex::encode(key.key_pair.secret_bytes()),
                })
                .collect(),
        }
    }

    fn into_identifier(self) -> Result<HolderIdentifier> {
        let keys = self
            .keys
            .into_iter()
            .map(|key| {
                let secret = hex::decode(&key.secret)
                    .map_err(VerifiedIdError::malformed_input_from)?;
                Ok(KeyContainer::new(key.key_id, KeyPair::from_secret_bytes(&secret)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(HolderIdentifier {
            did: self.did,
            alias: self.alias,
            keys,
        })
    }
}

/// Persists the master identifier as JSON at a fixed path.
///
/// Secrets are stored hex encoded and unencrypted, protecting the file is
/// left to the host.
pub struct FileIdentifierManager {
    path: PathBuf,
    identifier: Mutex<Option<HolderIdentifier>>,
}

impl FileIdentifierManager {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            identifier: Mutex::new(None),
        }
    }

    fn load(&self) -> Result<Option<HolderIdentifier>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read(&self.path).map_err(VerifiedIdError::unspecified)?;
        let stored: StoredIdentifier = serde_json::from_slice(&contents)?;
        stored.into_identifier().map(Some)
    }

    fn store(&self, identifier: &HolderIdentifier) -> Result<()> {
        let stored = StoredIdentifier::from_identifier(identifier);
        let contents = serde_json::to_vec_pretty(&stored)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(VerifiedIdError::unspecified)?;
        }
        fs::write(&self.path, contents).map_err(VerifiedIdError::unspecified)
    }
}

impl IdentifierManager for FileIdentifierManager {
    fn fetch_or_create_master_identifier(&self) -> Result<HolderIdentifier> {
        let mut cached = self
            .identifier
            .lock()
            .map_err(|e| VerifiedIdError::unspecified(e.to_string()))?;

        if let Some(identifier) = cached.as_ref() {
            return Ok(identifier.clone());
        }

        let identifier = match self.load()? {
            Some(identifier) => identifier,
            None => {
                let identifier = IdentifierCreator::create(MASTER_IDENTIFIER_ALIAS)?;
                self.store(&identifier)?;
                log::info!("stored new master identifier at {}", self.path.display());
                identifier
            }
        };

        *cached = Some(identifier.clone());
        Ok(identifier)
    }
}
