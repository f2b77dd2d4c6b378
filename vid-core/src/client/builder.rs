use std::sync::Arc;

use url::Url;

use super::{RequestProcessorFactory, RequestResolverFactory, VerifiedIdClient};
use crate::configuration::{LibraryConfiguration, PreviewFeatureFlags};
use crate::constants::DEFAULT_DISCOVERY_URL;
use crate::error::Result;
use crate::identifier::{DidDocumentResolver, IdentifierManager, InMemoryIdentifierManager};
use crate::logger::{LogConsumer, WalletLibraryLogger};
use crate::networking::{
    interop_prefer_header, CorrelationHeader, HttpClient, LibraryNetworking,
    RequestCorrelationHeader, WalletLibraryNetworking,
};
use crate::requests::openid4vci::OpenId4VciProcessor;
use crate::requests::presentation::OpenIdPresentationRequestProcessor;
use crate::requests::{OpenIdUrlRequestResolver, RequestProcessorExtendable};
use crate::root_of_trust::{LinkedDomainResolver, RootOfTrustResolver};

/// Configures and builds a [`VerifiedIdClient`] on top of an [`HttpClient`].
///
/// ```ignore
/// let client = VerifiedIdClientBuilder::new(ReqwestClient::new())
///     .with_preferred_languages(vec!["en-US".to_string()])
///     .build()?;
/// ```
pub struct VerifiedIdClientBuilder<H: HttpClient> {
    http_client: H,
    logger: WalletLibraryLogger,
    correlation_header: Option<Arc<dyn CorrelationHeader>>,
    preferred_languages: Vec<String>,
    discovery_url: String,
    identifier_manager: Option<Arc<dyn IdentifierManager>>,
    root_of_trust_resolver: Option<Arc<dyn RootOfTrustResolver>>,
    prefer_headers: Vec<(String, String)>,
    preview_feature_flags: PreviewFeatureFlags,
    extensions: Vec<Arc<dyn RequestProcessorExtendable>>,
}

impl<H: HttpClient + 'static> VerifiedIdClientBuilder<H> {
    pub fn new(http_client: H) -> Self {
        Self {
            http_client,
            logger: WalletLibraryLogger::new(),
            correlation_header: None,
            preferred_languages: Vec::new(),
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            identifier_manager: None,
            root_of_trust_resolver: None,
            prefer_headers: Vec::new(),
            preview_feature_flags: PreviewFeatureFlags::default(),
            extensions: Vec::new(),
        }
    }

    pub fn with_log_consumer(mut self, consumer: Arc<dyn LogConsumer>) -> Self {
        self.logger.add_consumer(consumer);
        self
    }

    /// Replace the default `request-id` correlation header.
    pub fn with_correlation_header(mut self, header: Arc<dyn CorrelationHeader>) -> Self {
        self.correlation_header = Some(header);
        self
    }

    /// BCP 47 tags, most preferred first.
    pub fn with_preferred_languages(mut self, languages: Vec<String>) -> Self {
        self.preferred_languages = languages;
        self
    }

    pub fn with_discovery_url(mut self, discovery_url: impl Into<String>) -> Self {
        self.discovery_url = discovery_url.into();
        self
    }

    pub fn with_identifier_manager(mut self, manager: Arc<dyn IdentifierManager>) -> Self {
        self.identifier_manager = Some(manager);
        self
    }

    /// Consulted before linked domain validation.
    pub fn with_root_of_trust_resolver(mut self, resolver: Arc<dyn RootOfTrustResolver>) -> Self {
        self.root_of_trust_resolver = Some(resolver);
        self
    }

    /// Add a `prefer` header value on top of the interop profile version.
    pub fn with_prefer_header(mut self, value: impl Into<String>) -> Self {
        let (field, _) = interop_prefer_header();
        self.prefer_headers.push((field, value.into()));
        self
    }

    /// Opt into a preview feature, see [`PreviewFeatureFlags`].
    pub fn with_preview_feature_flag(mut self, flag: impl Into<String>) -> Self {
        self.preview_feature_flags.add(flag);
        self
    }

    /// Run `extension` on presentation requests. Needs
    /// [`PreviewFeatureFlags::PROCESSOR_EXTENSION_SUPPORT`].
    pub fn with_extension(mut self, extension: Arc<dyn RequestProcessorExtendable>) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn build(self) -> Result<VerifiedIdClient> {
        let correlation_header = self
            .correlation_header
            .unwrap_or_else(|| Arc::new(RequestCorrelationHeader::new()));
        let networking: Arc<dyn LibraryNetworking> = Arc::new(WalletLibraryNetworking::new(
            self.http_client,
            self.logger.clone(),
            Some(correlation_header),
        ));

        let document_resolver = Arc::new(DidDocumentResolver::new(
            networking.clone(),
            Url::parse(&self.discovery_url)?,
        ));
        let root_of_trust_resolver = Arc::new(LinkedDomainResolver::new(
            networking.clone(),
            self.logger.clone(),
            self.root_of_trust_resolver,
        ));
        let identifier_manager = self
            .identifier_manager
            .unwrap_or_else(|| Arc::new(InMemoryIdentifierManager::new()));

        let mut prefer_headers = vec![interop_prefer_header()];
        prefer_headers.extend(self.prefer_headers);

        let configuration = Arc::new(LibraryConfiguration {
            logger: self.logger,
            networking,
            identifier_manager,
            document_resolver,
            root_of_trust_resolver,
            preferred_languages: self.preferred_languages,
            prefer_headers,
            preview_feature_flags: self.preview_feature_flags,
        });

        let resolver_factory = RequestResolverFactory::new(vec![Arc::new(
            OpenIdUrlRequestResolver::new(configuration.clone()),
        )]);
        let presentation_processor = self.extensions.into_iter().fold(
            OpenIdPresentationRequestProcessor::new(configuration.clone()),
            |processor, extension| processor.with_extension(extension),
        );
        let processor_factory = RequestProcessorFactory::new(vec![
            Arc::new(presentation_processor),
            Arc::new(OpenId4VciProcessor::new(configuration.clone())),
        ]);

        Ok(VerifiedIdClient::new(
            configuration,
            resolver_factory,
            processor_factory,
        ))
    }
}
