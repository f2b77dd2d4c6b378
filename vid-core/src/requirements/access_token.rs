use std::fmt;
use std::sync::Arc;

use crate::error::{Result, VerifiedIdError};
use crate::requests::openid4vci::{CredentialOfferGrant, PreAuthTokenResolver};

/// An access token for the issuer, obtained by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenRequirement {
    /// Credential configuration the token is for.
    pub configuration: String,
    pub resource_id: String,
    pub scope: String,
    pub required: bool,
    access_token: Option<String>,
}

impl AccessTokenRequirement {
    pub fn new(
        configuration: impl Into<String>,
        resource_id: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            configuration: configuration.into(),
            resource_id: resource_id.into(),
            scope: scope.into(),
            required: true,
            access_token: None,
        }
    }

    pub fn fulfill(&mut self, access_token: impl Into<String>) {
        self.access_token = Some(access_token.into());
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn validate(&self) -> Result<()> {
        match self.access_token {
            Some(_) => Ok(()),
            None => Err(VerifiedIdError::requirement_not_met(
                "Access Token has not been set.",
                vec![],
            )),
        }
    }
}

/// Access token already redeemed from a pre-authorized code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefilledAccessTokenRequirement {
    pub access_token: String,
}

impl PrefilledAccessTokenRequirement {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

/// A transaction code the holder enters; redeemed for an access token on
/// fulfill and retryable until that succeeds.
pub struct RetryablePinRequirement {
    /// Expected length, `-1` when the issuer does not say.
    pub length: i32,
    pub input_mode: String,
    grant: CredentialOfferGrant,
    resolver: Arc<PreAuthTokenResolver>,
    access_token: Option<String>,
}

impl RetryablePinRequirement {
    pub(crate) fn new(
        grant: CredentialOfferGrant,
        resolver: Arc<PreAuthTokenResolver>,
    ) -> Self {
        let tx_code = grant.tx_code.clone().unwrap_or_default();
        Self {
            length: tx_code.length.unwrap_or(-1),
            input_mode: tx_code
                .input_mode
                .unwrap_or_else(|| "alphanumeric".to_string()),
            grant,
            resolver,
            access_token: None,
        }
    }

    pub async fn fulfill(&mut self, pin: &str) -> Result<()> {
        match self
            .resolver
            .resolve_access_token(&self.grant, Some(pin))
            .await
        {
            Ok(access_token) => {
                self.access_token = Some(access_token);
                Ok(())
            }
            Err(error) => Err(VerifiedIdError::requirement_not_met(
                format!("Unable to fetch access token using pin {}.", pin),
                vec![error],
            )),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn validate(&self) -> Result<()> {
        match self.access_token {
            Some(_) => Ok(()),
            None => Err(VerifiedIdError::requirement_not_met(
                "Pin has not been set.",
                vec![],
            )),
        }
    }
}

impl fmt::Debug for RetryablePinRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryablePinRequirement")
            .field("length", &self.length)
            .field("input_mode", &self.input_mode)
            .field("has_access_token", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}
