mod correlation;
mod http_trait;
#[allow(clippy::module_inception)]
mod networking;

#[cfg(test)]
pub(crate) mod mock;

pub use correlation::{CorrelationHeader, RequestCorrelationHeader};
pub use http_trait::{HttpClient, HttpResponse};
pub use networking::{
    interop_prefer_header, ContentType, Headers, LibraryNetworking, WalletLibraryNetworking,
    INTEROP_PROFILE_VERSION, PREFER_HEADER_FIELD,
};
