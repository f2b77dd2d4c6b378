//! Protocol constants shared across the library.

/// DID resolution endpoint used unless the builder overrides it.
pub const DEFAULT_DISCOVERY_URL: &str = "https://discover.did.msidentity.com/v1.0/identifiers";

pub const OPENID_SCHEME: &str = "openid-vc";
pub const REQUEST_URI_QUERY_ITEM: &str = "request_uri";
pub const CREDENTIAL_OFFER_URI_QUERY_ITEM: &str = "credential_offer_uri";

pub const DID_CONFIGURATION_PATH: &str = "/.well-known/did-configuration.json";
pub const CREDENTIAL_ISSUER_METADATA_PATH: &str = "/.well-known/openid-credential-issuer";
pub const OPENID_CONFIGURATION_PATH: &str = "/.well-known/openid-configuration";

/// `prompt` value of a presentation request that leads to issuance.
pub const ISSUANCE_PROMPT: &str = "create";

pub const LINKED_DOMAINS_SERVICE_TYPE: &str = "LinkedDomains";

pub const AUTHORIZATION_CODE_GRANT: &str = "authorization_code";
pub const PRE_AUTHORIZED_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:pre-authorized_code";

pub const JWT_TYPE: &str = "JWT";
pub const PROOF_JWT_TYPE: &str = "openid4vci-proof+jwt";

pub const VC_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
pub const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";
pub const VERIFIABLE_PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// Clock skew tolerated when checking `iat` and `exp`.
pub const TOKEN_SKEW_SECONDS: u64 = 300;

/// Lifetime of presentation responses (id_token and VPs).
pub const PRESENTATION_RESPONSE_LIFETIME_SECONDS: u64 = 3000;

pub const SELF_SIGNED_LIFETIME_SECONDS: u64 = 300;

/// Lifetime of contract issuance responses.
pub const ISSUANCE_RESPONSE_LIFETIME_SECONDS: u64 = 300;

/// Id token configuration meaning "the id_token_hint of the request".
pub const SELF_ISSUED_ID_TOKEN_CONFIGURATION: &str = "https://self-issued.me";
