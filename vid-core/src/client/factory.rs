use std::sync::Arc;

use crate::error::{Result, VerifiedIdError};
use crate::requests::{RawRequest, RequestProcessing, RequestResolving, VerifiedIdRequestInput};

/// Picks the first resolver that understands an input.
pub struct RequestResolverFactory {
    resolvers: Vec<Arc<dyn RequestResolving>>,
}

impl RequestResolverFactory {
    pub fn new(resolvers: Vec<Arc<dyn RequestResolving>>) -> Self {
        Self { resolvers }
    }

    pub fn make_resolver(&self, input: &VerifiedIdRequestInput) -> Result<&dyn RequestResolving> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.can_resolve(input))
            .map(|resolver| resolver.as_ref())
            .ok_or_else(|| match input {
                VerifiedIdRequestInput::Url(url) => VerifiedIdError::unsupported_input(url),
            })
    }
}

/// Picks the first processor that understands a raw request.
pub struct RequestProcessorFactory {
    processors: Vec<Arc<dyn RequestProcessing>>,
}

impl RequestProcessorFactory {
    pub fn new(processors: Vec<Arc<dyn RequestProcessing>>) -> Self {
        Self { processors }
    }

    pub fn make_processor(&self, raw_request: &RawRequest) -> Result<&dyn RequestProcessing> {
        self.processors
            .iter()
            .find(|processor| processor.can_process(raw_request))
            .map(|processor| processor.as_ref())
            .ok_or_else(VerifiedIdError::unsupported_raw_request)
    }
}
