//! OpenID presentation requests answered with presentation exchange.

mod models;
mod processor;
mod request;
mod serializer;
mod validator;

pub use models::*;
pub use processor::OpenIdPresentationRequestProcessor;
pub use request::OpenIdPresentationRequest;
pub use serializer::{PresentationExchangeSerializer, PresentationResponse};

pub(crate) use validator::{validate_presentation_request, validate_signed_request, SignedRequestClaims};
