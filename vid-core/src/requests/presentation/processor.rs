use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::models::{InputDescriptor, PresentationRequestClaims};
use super::OpenIdPresentationRequest;
use crate::configuration::{LibraryConfiguration, PreviewFeatureFlags};
use crate::error::{required, Result, VerifiedIdError};
use crate::requests::contract::ContractIssuanceProcessor;
use crate::requests::{
    RawRequest, RequestProcessing, RequestProcessorExtendable, VerifiedIdPartialRequest,
    VerifiedIdRequest, VerifiedIdRequestInput,
};
use crate::requirements::{
    FieldConstraint, GroupConstraint, GroupConstraintOperator, Requirement, VcTypeConstraint,
    VerifiedIdConstraint, VerifiedIdRequirement,
};
use crate::styles::{Logo, RequesterStyle};
use crate::wallet_log;

pub struct OpenIdPresentationRequestProcessor {
    configuration: Arc<LibraryConfiguration>,
    contract_processor: ContractIssuanceProcessor,
    extensions: Vec<Arc<dyn RequestProcessorExtendable>>,
}

impl OpenIdPresentationRequestProcessor {
    pub fn new(configuration: Arc<LibraryConfiguration>) -> Self {
        Self {
            contract_processor: ContractIssuanceProcessor::new(configuration.clone()),
            configuration,
            extensions: Vec::new(),
        }
    }

    /// Run `extension` on every presentation request this processor builds.
    pub fn with_extension(mut self, extension: Arc<dyn RequestProcessorExtendable>) -> Self {
        self.extensions.push(extension);
        self
    }

    fn extensions_enabled(&self) -> bool {
        !self.extensions.is_empty()
            && self
                .configuration
                .is_preview_feature_flag_supported(PreviewFeatureFlags::PROCESSOR_EXTENSION_SUPPORT)
    }
}

#[async_trait]
impl RequestProcessing for OpenIdPresentationRequestProcessor {
    fn can_process(&self, raw_request: &RawRequest) -> bool {
        matches!(raw_request, RawRequest::PresentationRequest { .. })
    }

    async fn process(&self, raw_request: RawRequest) -> Result<VerifiedIdRequest> {
        let RawRequest::PresentationRequest {
            token,
            root_of_trust,
        } = raw_request
        else {
            return Err(VerifiedIdError::unsupported_raw_request());
        };

        let raw_claims = if self.extensions_enabled() {
            Some(token.raw_payload()?)
        } else {
            None
        };
        let claims = token.content;
        let requirement = requirement_from_claims(&claims)?;

        if claims.is_issuance() {
            let request = self.contract_processor.process(&claims, &requirement).await?;
            return Ok(VerifiedIdRequest::Issuance(Box::new(request)));
        }
        wallet_log!(
            self.configuration.logger,
            Debug,
            "presentation request from {} processed",
            claims.client_id.as_deref().unwrap_or_default()
        );

        let mut partial =
            VerifiedIdPartialRequest::new(requester_style(&claims), requirement, root_of_trust);
        if let Some(raw_claims) = raw_claims {
            for extension in &self.extensions {
                partial = extension.parse(&raw_claims, partial);
            }
        }

        let request = OpenIdPresentationRequest::new(
            partial.requester_style,
            partial.requirement,
            partial.root_of_trust,
            claims,
            self.configuration.clone(),
        );
        Ok(VerifiedIdRequest::Presentation(Box::new(request)))
    }
}

fn requester_style(claims: &PresentationRequestClaims) -> RequesterStyle {
    let registration = claims.registration.as_ref();
    RequesterStyle {
        name: registration
            .and_then(|registration| registration.client_name.clone())
            .unwrap_or_default(),
        logo: registration
            .and_then(|registration| registration.logo_uri.clone())
            .map(|uri| Logo {
                uri: Some(uri),
                alt_text: None,
            }),
    }
}

fn requirement_from_claims(claims: &PresentationRequestClaims) -> Result<Requirement> {
    let requirements = claims
        .vp_token_requests()
        .iter()
        .filter_map(|request| request.presentation_definition.as_ref())
        .flat_map(|definition| definition.input_descriptors.iter().flatten())
        .map(|descriptor| requirement_from_descriptor(descriptor).map(Requirement::VerifiedId))
        .collect::<Result<Vec<_>>>()?;

    Requirement::reduce(requirements)
}

pub(crate) fn requirement_from_descriptor(
    descriptor: &InputDescriptor,
) -> Result<VerifiedIdRequirement> {
    let types: Vec<String> = descriptor
        .schema
        .iter()
        .flatten()
        .filter_map(|schema| schema.uri.clone())
        .collect();

    let type_constraint = match types.as_slice() {
        [] => return Err(VerifiedIdError::missing_property("schema", "InputDescriptor")),
        [single] => VerifiedIdConstraint::VcType(VcTypeConstraint::new(single.clone())),
        many => VerifiedIdConstraint::Group(GroupConstraint {
            constraints: many
                .iter()
                .map(|t| VerifiedIdConstraint::VcType(VcTypeConstraint::new(t.clone())))
                .collect(),
            operator: GroupConstraintOperator::Any,
        }),
    };

    let constraints = descriptor.constraints.as_ref();
    let field_constraints = constraints
        .and_then(|constraints| constraints.fields.as_ref())
        .into_iter()
        .flatten()
        .map(|field| {
            let paths = required(field.path.clone(), "path", "Field")?;
            let pattern = required(
                field.filter.as_ref().and_then(|filter| filter.pattern.clone()),
                "pattern",
                "Filter",
            )?;
            Ok(VerifiedIdConstraint::Field(FieldConstraint::new(
                paths,
                &pattern,
                field.purpose.clone(),
            )?))
        })
        .collect::<Result<Vec<_>>>()?;

    let constraint = if field_constraints.is_empty() {
        type_constraint
    } else {
        let mut all = vec![type_constraint];
        all.extend(field_constraints);
        VerifiedIdConstraint::Group(GroupConstraint {
            constraints: all,
            operator: GroupConstraintOperator::All,
        })
    };

    let mut requirement = VerifiedIdRequirement::new(descriptor.id.clone(), types, constraint);
    requirement.purpose = descriptor.purpose.clone();
    requirement.exclusive_presentation_with = constraints
        .and_then(|constraints| constraints.exclusive_presentation_with.clone())
        .unwrap_or_default();
    requirement.issuance_options = descriptor
        .issuance
        .iter()
        .flatten()
        .filter_map(|issuance| issuance.manifest.as_deref())
        .filter_map(|manifest| Url::parse(manifest).ok())
        .map(VerifiedIdRequestInput::Url)
        .collect();
    Ok(requirement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;
    use crate::networking::mock::MockHttpClient;
    use crate::root_of_trust::RootOfTrust;
    use crate::test_support::configuration;
    use crate::token::{Header, JwsToken};
    use crate::requirements::SelfAttestedClaimRequirement;
    use crate::verified_id::tests::self_signed;
    use serde_json::{json, Map, Value};

    /// Round trip through the compact form so unmodelled claims survive.
    fn raw_request(claims: Value) -> RawRequest {
        let compact = JwsToken::new(Header::default(), claims).unwrap().serialize();
        RawRequest::PresentationRequest {
            token: JwsToken::from_compact(&compact).unwrap(),
            root_of_trust: RootOfTrust::default(),
        }
    }

    fn two_descriptor_claims() -> Value {
        json!({
            "client_id": "did:web:verifier.example",
            "registration": {"client_name": "Verifier"},
            "x-loyalty-program": "gold",
            "claims": {"vp_token": {"presentation_definition": {
                "id": "def",
                "input_descriptors": [
                    {"id": "a", "schema": [{"uri": "A"}]},
                    {"id": "b", "schema": [{"uri": "B"}]}
                ]
            }}}
        })
    }

    /// Swaps descriptor `a` for a claim named after an unmodelled request claim.
    struct LoyaltyExtension;

    impl RequestProcessorExtendable for LoyaltyExtension {
        fn parse(
            &self,
            raw_request: &Map<String, Value>,
            mut request: VerifiedIdPartialRequest,
        ) -> VerifiedIdPartialRequest {
            let level = raw_request["x-loyalty-program"].as_str().unwrap_or_default().to_string();
            request.requester_style.name = format!("{} ({})", request.requester_style.name, level);
            request.replace_requirement("a", |_| {
                Requirement::SelfAttestedClaim(SelfAttestedClaimRequirement::new(level))
            });
            request
        }
    }

    fn descriptor(value: Value) -> InputDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_single_schema_is_type_constraint() {
        let requirement = requirement_from_descriptor(&descriptor(json!({
            "id": "employee",
            "purpose": "Prove employment",
            "schema": [{"uri": "EmployeeCard"}],
            "constraints": {"exclusive_presentation_with": ["other"]}
        })))
        .unwrap();

        assert_eq!(requirement.id.as_deref(), Some("employee"));
        assert_eq!(requirement.purpose.as_deref(), Some("Prove employment"));
        assert_eq!(requirement.exclusive_presentation_with, vec!["other"]);
        assert!(matches!(
            requirement.constraint,
            VerifiedIdConstraint::VcType(_)
        ));
    }

    #[test]
    fn test_several_schemas_accept_any_type() {
        let mut requirement = requirement_from_descriptor(&descriptor(json!({
            "id": "id-doc",
            "schema": [{"uri": "Passport"}, {"uri": "DriversLicense"}]
        })))
        .unwrap();

        assert!(requirement
            .fulfill(self_signed(&["DriversLicense"], json!({})))
            .is_ok());
        assert!(requirement
            .fulfill(self_signed(&["EmployeeCard"], json!({})))
            .is_err());
    }

    #[test]
    fn test_field_constraints_are_anded() {
        let mut requirement = requirement_from_descriptor(&descriptor(json!({
            "id": "employee",
            "schema": [{"uri": "EmployeeCard"}],
            "constraints": {"fields": [{
                "path": ["$.vc.credentialSubject.department"],
                "filter": {"type": "string", "pattern": "^Sales$"}
            }]}
        })))
        .unwrap();

        assert!(requirement
            .fulfill(self_signed(&["EmployeeCard"], json!({"department": "Legal"})))
            .is_err());
        assert!(requirement
            .fulfill(self_signed(&["EmployeeCard"], json!({"department": "Sales"})))
            .is_ok());
    }

    #[test]
    fn test_descriptor_without_schema_is_rejected() {
        let err = requirement_from_descriptor(&descriptor(json!({"id": "x"}))).unwrap_err();
        assert_eq!(err.code, codes::MISSING_REQUIRED_PROPERTY);
    }

    #[tokio::test]
    async fn test_process_builds_group_and_style() {
        let claims = json!({
            "client_id": "did:web:verifier.example",
            "registration": {"client_name": "Verifier", "logo_uri": "https://verifier.example/logo.png"},
            "claims": {"vp_token": {"presentation_definition": {
                "id": "def",
                "input_descriptors": [
                    {"id": "a", "schema": [{"uri": "A"}]},
                    {"id": "b", "schema": [{"uri": "B"}]}
                ]
            }}}
        });
        let raw = RawRequest::PresentationRequest {
            token: JwsToken::new(Header::default(), serde_json::from_value(claims).unwrap())
                .unwrap(),
            root_of_trust: RootOfTrust::default(),
        };

        let processor = OpenIdPresentationRequestProcessor::new(configuration(MockHttpClient::new()));
        assert!(processor.can_process(&raw));
        assert!(!processor.can_process(&RawRequest::CredentialOffer(json!({}))));

        let VerifiedIdRequest::Presentation(request) = processor.process(raw).await.unwrap() else {
            panic!("expected a presentation request");
        };
        assert_eq!(request.style().name, "Verifier");
        match request.requirement() {
            Requirement::Group(group) => assert_eq!(group.requirements.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!request.is_satisfied());
    }

    #[test]
    fn test_issuance_manifest_becomes_issuance_option() {
        let requirement = requirement_from_descriptor(&descriptor(json!({
            "id": "EmployeeCard",
            "schema": [{"uri": "EmployeeCard"}],
            "issuance": [{"manifest": "https://issuer.example/contracts/EmployeeCard"}, {}]
        })))
        .unwrap();
        assert_eq!(
            requirement.issuance_options,
            vec![VerifiedIdRequestInput::Url(
                Url::parse("https://issuer.example/contracts/EmployeeCard").unwrap()
            )]
        );
    }

    #[tokio::test]
    async fn test_extensions_need_preview_flag() {
        let processor = OpenIdPresentationRequestProcessor::new(configuration(MockHttpClient::new()))
            .with_extension(Arc::new(LoyaltyExtension));

        let VerifiedIdRequest::Presentation(request) =
            processor.process(raw_request(two_descriptor_claims())).await.unwrap()
        else {
            panic!("expected a presentation request");
        };
        assert_eq!(request.style().name, "Verifier");
    }

    #[tokio::test]
    async fn test_extensions_reshape_request() {
        let mut flagged = configuration(MockHttpClient::new());
        Arc::get_mut(&mut flagged)
            .unwrap()
            .preview_feature_flags
            .add(PreviewFeatureFlags::PROCESSOR_EXTENSION_SUPPORT);
        let processor =
            OpenIdPresentationRequestProcessor::new(flagged).with_extension(Arc::new(LoyaltyExtension));

        let VerifiedIdRequest::Presentation(request) =
            processor.process(raw_request(two_descriptor_claims())).await.unwrap()
        else {
            panic!("expected a presentation request");
        };
        assert_eq!(request.style().name, "Verifier (gold)");
        let Requirement::Group(group) = request.requirement() else {
            panic!("expected a group");
        };
        assert!(matches!(
            &group.requirements[0],
            Requirement::SelfAttestedClaim(claim) if claim.claim == "gold"
        ));
        assert!(matches!(&group.requirements[1], Requirement::VerifiedId(_)));
    }

    #[tokio::test]
    async fn test_create_prompt_yields_issuance_request() {
        let client = MockHttpClient::new();
        let processor = OpenIdPresentationRequestProcessor::new(configuration(client.clone()));
        let claims = json!({
            "prompt": "create",
            "state": "state-1",
            "redirect_uri": "https://verifier.example/callback",
            "claims": {"vp_token": {"presentation_definition": {
                "id": "def",
                "input_descriptors": [{
                    "id": "EmployeeCard",
                    "schema": [{"uri": "EmployeeCard"}],
                    "issuance": [{"manifest": "https://issuer.example/contracts/EmployeeCard"}]
                }]
            }}}
        });

        // the contract is unreachable, so issuance fails after reporting it
        let err = processor.process(raw_request(claims)).await.unwrap_err();
        assert_eq!(err.code, codes::NETWORKING);
        assert_eq!(
            client.requests_to("https://issuer.example/contracts/EmployeeCard").len(),
            1
        );
        let callback = &client.requests_to("https://verifier.example/callback")[0];
        assert_eq!(callback.body_json()["details"], "fetch_contract_error");
    }
}
