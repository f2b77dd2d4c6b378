use crate::error::{Result, VerifiedIdError};

/// A claim the holder types in themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfAttestedClaimRequirement {
    pub claim: String,
    pub encrypted: bool,
    pub required: bool,
    value: Option<String>,
}

impl SelfAttestedClaimRequirement {
    pub fn new(claim: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            encrypted: false,
            required: true,
            value: None,
        }
    }

    pub fn fulfill(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn validate(&self) -> Result<()> {
        match self.value {
            Some(_) => Ok(()),
            None => Err(VerifiedIdError::requirement_not_met(
                "Self Attested Claim has not been set.",
                vec![],
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRequirement {
    pub length: usize,
    pub pin_type: String,
    pub salt: Option<String>,
    pin: Option<String>,
}

impl PinRequirement {
    pub fn new(length: usize, pin_type: impl Into<String>, salt: Option<String>) -> Self {
        Self {
            length,
            pin_type: pin_type.into(),
            salt,
            pin: None,
        }
    }

    pub fn fulfill(&mut self, pin: impl Into<String>) {
        self.pin = Some(pin.into());
    }

    pub fn pin(&self) -> Option<&str> {
        self.pin.as_deref()
    }

    pub fn validate(&self) -> Result<()> {
        match self.pin {
            Some(_) => Ok(()),
            None => Err(VerifiedIdError::requirement_not_met(
                "Pin has not been set.",
                vec![],
            )),
        }
    }
}

/// An id_token the holder obtains from an identity provider.
///
/// Not serializable into a presentation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdTokenRequirement {
    pub configuration: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: Option<String>,
    pub nonce: Option<String>,
    pub required: bool,
    id_token: Option<String>,
}

impl IdTokenRequirement {
    pub fn new(
        configuration: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        scope: Option<String>,
        nonce: Option<String>,
    ) -> Self {
        Self {
            configuration: configuration.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scope,
            nonce,
            required: true,
            id_token: None,
        }
    }

    pub fn fulfill(&mut self, id_token: impl Into<String>) {
        self.id_token = Some(id_token.into());
    }

    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    pub fn validate(&self) -> Result<()> {
        match self.id_token {
            Some(_) => Ok(()),
            None => Err(VerifiedIdError::requirement_not_met(
                "Id Token has not been set.",
                vec![],
            )),
        }
    }
}
