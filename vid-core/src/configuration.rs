use std::sync::Arc;

use crate::identifier::{IdentifierDocumentResolving, IdentifierManager};
use crate::logger::WalletLibraryLogger;
use crate::networking::LibraryNetworking;
use crate::root_of_trust::RootOfTrustResolver;

/// Features hosts opt into before they are on by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewFeatureFlags {
    supported: Vec<String>,
}

impl PreviewFeatureFlags {
    /// Run registered request processor extensions on presentation requests.
    pub const PROCESSOR_EXTENSION_SUPPORT: &'static str = "ProcessorExtensionSupport";

    pub fn new(supported: Vec<String>) -> Self {
        Self { supported }
    }

    pub fn add(&mut self, flag: impl Into<String>) {
        let flag = flag.into();
        if !self.supported.contains(&flag) {
            self.supported.push(flag);
        }
    }

    pub fn is_supported(&self, flag: &str) -> bool {
        self.supported.iter().any(|supported| supported == flag)
    }
}

/// Everything the resolvers, processors and requests share.
///
/// Built once by the client builder and handed around behind an `Arc`.
pub struct LibraryConfiguration {
    pub logger: WalletLibraryLogger,
    pub networking: Arc<dyn LibraryNetworking>,
    pub identifier_manager: Arc<dyn IdentifierManager>,
    pub document_resolver: Arc<dyn IdentifierDocumentResolving>,
    pub root_of_trust_resolver: Arc<dyn RootOfTrustResolver>,
    /// BCP 47 tags, most preferred first.
    pub preferred_languages: Vec<String>,
    /// Sent with request fetches and issuer calls.
    pub prefer_headers: Vec<(String, String)>,
    pub preview_feature_flags: PreviewFeatureFlags,
}

impl LibraryConfiguration {
    pub fn is_preview_feature_flag_supported(&self, flag: &str) -> bool {
        self.preview_feature_flags.is_supported(flag)
    }
}
