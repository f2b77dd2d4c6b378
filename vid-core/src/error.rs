use std::fmt::Display;

use serde_json::{json, Map, Value};
use thiserror::Error;

/// Stable error codes surfaced to library consumers.
pub mod codes {
    // General
    pub const MALFORMED_INPUT: &str = "malformed_input_error";
    pub const NETWORKING: &str = "networking_error";
    pub const REQUIREMENT_NOT_MET: &str = "requirement_not_met";
    pub const UNSPECIFIED: &str = "unspecified_error";
    pub const USER_CANCELED: &str = "user_canceled";
    pub const UNSUPPORTED_INPUT: &str = "unsupported_input";
    pub const UNSUPPORTED_RAW_REQUEST: &str = "unsupported_raw_request";

    // OpenID4VCI
    pub const MALFORMED_CREDENTIAL_METADATA: &str = "credential_metadata_malformed";
    pub const MALFORMED_SIGNED_METADATA: &str = "signed_metadata_token_malformed";
    pub const REQUEST_CREATION: &str = "request_creation_error";
    pub const PRE_AUTH_ISSUANCE: &str = "preauth_issuance_error";

    // Tokens
    pub const INVALID_PROPERTY: &str = "invalid_property";
    pub const TOKEN_EXPIRED: &str = "token_expired";
    pub const TOKEN_INVALID: &str = "token_invalid";

    // Identifiers
    pub const NO_KEYS_FOUND_IN_DOCUMENT: &str = "no_keys_found_in_document";
    pub const VERIFIED_ID_CREATION: &str = "verified_id_creation_error";

    // Requirements and serialization
    pub const MISSING_REQUIRED_PROPERTY: &str = "missing_required_property";
    pub const UNSUPPORTED_SERIALIZATION_METHOD: &str = "unsupported_serialization_method";
    pub const UNABLE_TO_REDUCE_REQUIREMENTS: &str = "unable_to_reduce_requirements";
}

/// Extra data attached to a [`VerifiedIdError`] depending on its kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ErrorDetail {
    #[default]
    None,
    /// Description of the error that caused this one.
    Inner(String),
    Networking {
        status_code: Option<u16>,
        inner_error: Option<String>,
        retryable: bool,
    },
    RequirementNotMet {
        errors: Vec<VerifiedIdError>,
    },
}

/// The single error type returned by the public API.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct VerifiedIdError {
    pub message: String,
    pub code: String,
    pub correlation_id: Option<String>,
    pub detail: ErrorDetail,
}

pub type Result<T> = std::result::Result<T, VerifiedIdError>;

/// Alias kept for readers coming from the platform SDKs.
pub type VerifiedIdResult<T> = Result<T>;

impl VerifiedIdError {
    pub fn new(message: impl Into<String>, code: &str) -> Self {
        Self {
            message: message.into(),
            code: code.to_string(),
            correlation_id: None,
            detail: ErrorDetail::None,
        }
    }

    /// Attach the description of the underlying cause.
    pub fn with_inner(mut self, inner: impl Display) -> Self {
        self.detail = ErrorDetail::Inner(inner.to_string());
        self
    }

    /// Set the correlation id unless one is already present.
    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        if self.correlation_id.is_none() {
            self.correlation_id = correlation_id;
        }
        self
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.detail, ErrorDetail::Networking { retryable: true, .. })
    }

    /// JSON rendering of the error, including its detail fields.
    pub fn description(&self) -> String {
        self.to_json().to_string()
    }

    fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("message".into(), json!(self.message));
        object.insert("code".into(), json!(self.code));
        object.insert("correlationId".into(), json!(self.correlation_id));

        match &self.detail {
            ErrorDetail::None => {}
            ErrorDetail::Inner(inner) => {
                object.insert("error".into(), json!(inner));
            }
            ErrorDetail::Networking {
                status_code,
                inner_error,
                retryable,
            } => {
                object.insert("statusCode".into(), json!(status_code));
                object.insert("innerError".into(), json!(inner_error));
                object.insert("retryable".into(), json!(retryable));
            }
            ErrorDetail::RequirementNotMet { errors } => {
                let errors: Vec<Value> = errors.iter().map(Self::to_json).collect();
                object.insert("errors".into(), Value::Array(errors));
            }
        }

        Value::Object(object)
    }

    // General

    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::new(message, codes::MALFORMED_INPUT)
    }

    /// Wrap an arbitrary failure as malformed input.
    pub fn malformed_input_from(inner: impl Display) -> Self {
        Self::new("Malformed Input.", codes::MALFORMED_INPUT).with_inner(inner)
    }

    pub fn networking(
        message: impl Into<String>,
        status_code: Option<u16>,
        inner_error: Option<String>,
        retryable: bool,
    ) -> Self {
        let mut error = Self::new(message, codes::NETWORKING);
        error.detail = ErrorDetail::Networking {
            status_code,
            inner_error,
            retryable,
        };
        error
    }

    pub fn requirement_not_met(message: impl Into<String>, errors: Vec<VerifiedIdError>) -> Self {
        let mut error = Self::new(message, codes::REQUIREMENT_NOT_MET);
        error.detail = ErrorDetail::RequirementNotMet { errors };
        error
    }

    pub fn unspecified(inner: impl Display) -> Self {
        Self::new("Unspecified Error.", codes::UNSPECIFIED).with_inner(inner)
    }

    pub fn user_canceled(message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| "User Canceled.".to_string());
        Self::new(message, codes::USER_CANCELED)
    }

    pub fn unsupported_input(input: impl Display) -> Self {
        Self::new(format!("Unsupported Input: {}.", input), codes::UNSUPPORTED_INPUT)
    }

    pub fn unsupported_raw_request() -> Self {
        Self::new("Unsupported Raw Request", codes::UNSUPPORTED_RAW_REQUEST)
    }

    /// A property that must be present on a protocol object is missing.
    pub fn missing_property(property: &str, container: &str) -> Self {
        Self::new(
            format!("Property {} is not present in {}.", property, container),
            codes::MISSING_REQUIRED_PROPERTY,
        )
    }

    // OpenID4VCI

    pub fn malformed_credential_offer(message: impl Into<String>) -> Self {
        Self::new(message, codes::MALFORMED_CREDENTIAL_METADATA)
    }

    pub fn malformed_credential_metadata(message: impl Into<String>) -> Self {
        Self::new(message, codes::MALFORMED_CREDENTIAL_METADATA)
    }

    pub fn malformed_signed_metadata(message: impl Into<String>) -> Self {
        Self::new(message, codes::MALFORMED_SIGNED_METADATA)
    }

    pub fn request_creation(message: impl Into<String>) -> Self {
        Self::new(message, codes::REQUEST_CREATION)
    }

    pub fn pre_auth(message: impl Into<String>) -> Self {
        Self::new(message, codes::PRE_AUTH_ISSUANCE)
    }

    // Tokens

    pub fn invalid_property(property: &str, expected: &str, actual: Option<&str>) -> Self {
        let message = match actual {
            Some(actual) => format!(
                "Invalid String for property: {}. Expected: {}, Actual: {}.",
                property, expected, actual
            ),
            None => format!("Propery {} is not present. Expected: {}.", property, expected),
        };
        Self::new(message, codes::INVALID_PROPERTY)
    }

    pub fn token_expired() -> Self {
        Self::new("Token has expired.", codes::TOKEN_EXPIRED)
    }

    pub fn iat_has_not_occurred() -> Self {
        Self::new("Token iat has not occurred.", codes::TOKEN_INVALID)
    }

    pub fn invalid_signature() -> Self {
        Self::new("Signature is not valid.", codes::TOKEN_INVALID)
    }

    // Identifiers

    pub fn no_keys_in_document() -> Self {
        Self::new(
            "No keys found in Identifier document.",
            codes::NO_KEYS_FOUND_IN_DOCUMENT,
        )
    }

    pub fn self_signed_creation(inner: impl Display) -> Self {
        Self::new(
            "Unable to create self signed Verified ID.",
            codes::VERIFIED_ID_CREATION,
        )
        .with_inner(inner)
    }

    // Requirements and serialization

    pub fn missing_required_property(message: impl Into<String>) -> Self {
        Self::new(message, codes::MISSING_REQUIRED_PROPERTY)
    }

    pub fn unsupported_serialization() -> Self {
        Self::new(
            "Serialization not enabled for issuance",
            codes::UNSUPPORTED_SERIALIZATION_METHOD,
        )
    }

    pub fn unable_to_reduce_requirements() -> Self {
        Self::new(
            "Requirement List is empty.",
            codes::UNABLE_TO_REDUCE_REQUIREMENTS,
        )
    }
}

impl From<serde_json::Error> for VerifiedIdError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed_input_from(err)
    }
}

impl From<base64::DecodeError> for VerifiedIdError {
    fn from(err: base64::DecodeError) -> Self {
        Self::malformed_input_from(err)
    }
}

impl From<url::ParseError> for VerifiedIdError {
    fn from(err: url::ParseError) -> Self {
        Self::malformed_input("Invalid url.").with_inner(err)
    }
}

impl From<vid_secp256k1::Error> for VerifiedIdError {
    fn from(err: vid_secp256k1::Error) -> Self {
        Self::malformed_input("Invalid key material.").with_inner(err)
    }
}

/// Unwrap an optional protocol property or fail with `missing_required_property`.
pub(crate) fn required<T>(value: Option<T>, property: &str, container: &str) -> Result<T> {
    value.ok_or_else(|| VerifiedIdError::missing_property(property, container))
}
