use std::sync::Arc;

use url::Url;

use super::models::{
    AccessTokenDescriptor, AttestationsDescriptor, IdTokenDescriptor, IssuanceCompletionDetails,
    IssuanceCompletionResponse, PresentationDescriptor, SelfIssuedClaimsDescriptor,
};
use super::request::{send_issuance_result, ContractIssuanceRequest};
use super::resolver::ManifestResolver;
use crate::configuration::LibraryConfiguration;
use crate::constants::SELF_ISSUED_ID_TOKEN_CONFIGURATION;
use crate::error::{required, Result, VerifiedIdError};
use crate::nonce::NonceCreator;
use crate::requests::presentation::{PinDescriptor, PresentationRequestClaims};
use crate::requests::VerifiedIdRequestInput;
use crate::requirements::{
    AccessTokenRequirement, GroupRequirement, GroupRequirementOperator, IdTokenRequirement,
    PinRequirement, Requirement, SelfAttestedClaimRequirement, VcTypeConstraint,
    VerifiedIdConstraint, VerifiedIdRequirement,
};
use crate::wallet_log;

const DEFAULT_PIN_TYPE: &str = "numeric";

/// Turns a presentation request with `prompt=create` into a contract
/// issuance request.
pub struct ContractIssuanceProcessor {
    configuration: Arc<LibraryConfiguration>,
    manifest_resolver: ManifestResolver,
}

impl ContractIssuanceProcessor {
    pub fn new(configuration: Arc<LibraryConfiguration>) -> Self {
        Self {
            manifest_resolver: ManifestResolver::new(configuration.clone()),
            configuration,
        }
    }

    /// `requirement` is the one built from the request's input descriptors.
    /// Its first issuance option names the contract.
    pub async fn process(
        &self,
        claims: &PresentationRequestClaims,
        requirement: &Requirement,
    ) -> Result<ContractIssuanceRequest> {
        let Requirement::VerifiedId(verified_id) = requirement else {
            return Err(VerifiedIdError::malformed_input(
                "Unsupported requirement in an issuance request.",
            ));
        };
        let Some(VerifiedIdRequestInput::Url(contract_url)) = verified_id.issuance_options.first()
        else {
            return Err(VerifiedIdError::malformed_input(
                "No issuance options available on Presentation Request.",
            ));
        };
        let state = required(claims.state.clone(), "state", "PresentationRequest")?;
        let callback_url = Url::parse(required(
            claims.redirect_uri.as_deref(),
            "redirect_uri",
            "PresentationRequest",
        )?)?;

        let contract = match self.manifest_resolver.resolve(contract_url).await {
            Ok(contract) => contract,
            Err(err) => {
                wallet_log!(
                    self.configuration.logger,
                    Warn,
                    "unable to resolve contract {}: {}",
                    contract_url,
                    err
                );
                let result = IssuanceCompletionResponse::failed(
                    &state,
                    IssuanceCompletionDetails::FetchContractError,
                );
                send_issuance_result(&self.configuration, &callback_url, &result).await;
                return Err(err);
            }
        };

        let attestations = required(
            contract.claims.input.attestations.as_ref(),
            "attestations",
            "Contract",
        )?;
        let nonce = self
            .configuration
            .identifier_manager
            .fetch_or_create_master_identifier()
            .ok()
            .map(|identifier| NonceCreator::create(&identifier.did));
        let mut requirement = requirement_from_attestations(attestations, nonce)?;

        if let Some(id_token_hint) = &claims.id_token_hint {
            let pin = claims.pin.as_ref().map(pin_requirement);
            requirement = with_injected_id_token(requirement, id_token_hint, pin);
        }

        Ok(ContractIssuanceRequest::new(
            requirement,
            contract,
            state,
            callback_url,
            self.configuration.clone(),
        ))
    }
}

/// One requirement per attestation, in the order access tokens, id tokens,
/// presentations, self issued claims.
pub(crate) fn requirement_from_attestations(
    attestations: &AttestationsDescriptor,
    nonce: Option<String>,
) -> Result<Requirement> {
    let mut requirements = Vec::new();
    for descriptor in attestations.access_tokens.iter().flatten() {
        requirements.push(Requirement::AccessToken(access_token_requirement(
            descriptor,
        )?));
    }
    for descriptor in attestations.id_tokens.iter().flatten() {
        requirements.push(Requirement::IdToken(id_token_requirement(
            descriptor,
            nonce.clone(),
        )?));
    }
    for descriptor in attestations.presentations.iter().flatten() {
        requirements.push(Requirement::VerifiedId(verified_id_requirement(descriptor)));
    }
    if let Some(self_issued) = &attestations.self_issued {
        requirements.extend(self_issued_requirement(self_issued));
    }

    Requirement::reduce(requirements)
}

fn access_token_requirement(descriptor: &AccessTokenDescriptor) -> Result<AccessTokenRequirement> {
    let container = "AccessTokenDescriptor";
    let mut requirement = AccessTokenRequirement::new(
        required(descriptor.configuration.clone(), "configuration", container)?,
        required(descriptor.resource_id.clone(), "resourceId", container)?,
        required(descriptor.obo_scope.clone(), "oboScope", container)?,
    );
    requirement.required = descriptor.required.unwrap_or(false);
    Ok(requirement)
}

fn id_token_requirement(
    descriptor: &IdTokenDescriptor,
    nonce: Option<String>,
) -> Result<IdTokenRequirement> {
    Url::parse(&descriptor.configuration).map_err(|_| {
        VerifiedIdError::invalid_property(
            "configuration",
            "URL",
            Some(&descriptor.configuration),
        )
    })?;
    let redirect_uri = required(
        descriptor.redirect_uri.clone(),
        "redirect_uri",
        "IdTokenDescriptor",
    )?;

    let mut requirement = IdTokenRequirement::new(
        descriptor.configuration.clone(),
        descriptor.client_id.clone().unwrap_or_default(),
        redirect_uri,
        descriptor.scope.clone(),
        nonce,
    );
    requirement.required = descriptor.required.unwrap_or(false);
    Ok(requirement)
}

fn verified_id_requirement(descriptor: &PresentationDescriptor) -> VerifiedIdRequirement {
    let credential_type = &descriptor.credential_type;
    let mut requirement = VerifiedIdRequirement::new(
        Some(credential_type.clone()),
        vec![credential_type.clone()],
        VerifiedIdConstraint::VcType(VcTypeConstraint::new(credential_type.clone())),
    );
    requirement.required = descriptor.required.unwrap_or(false);
    requirement.encrypted = descriptor.encrypted.unwrap_or(false);
    requirement.issuance_options = descriptor
        .contracts
        .iter()
        .flatten()
        .filter_map(|contract| Url::parse(contract).ok())
        .map(VerifiedIdRequestInput::Url)
        .collect();
    requirement
}

fn self_issued_requirement(descriptor: &SelfIssuedClaimsDescriptor) -> Option<Requirement> {
    let group_required = descriptor.required.unwrap_or(false);
    let encrypted = descriptor.encrypted.unwrap_or(false);
    let mut claims: Vec<SelfAttestedClaimRequirement> = descriptor
        .claims
        .iter()
        .flatten()
        .map(|claim| {
            let mut requirement = SelfAttestedClaimRequirement::new(claim.claim.clone());
            requirement.encrypted = encrypted;
            requirement.required = claim.required.unwrap_or(false);
            requirement
        })
        .collect();

    match claims.len() {
        0 => None,
        1 => {
            let mut claim = claims.remove(0);
            claim.required = claim.required || group_required;
            Some(Requirement::SelfAttestedClaim(claim))
        }
        _ => {
            let mut group = GroupRequirement::new(
                claims.into_iter().map(Requirement::SelfAttestedClaim).collect(),
                GroupRequirementOperator::All,
            );
            group.required = group_required;
            Some(Requirement::Group(group))
        }
    }
}

fn pin_requirement(descriptor: &PinDescriptor) -> PinRequirement {
    PinRequirement::new(
        descriptor.length,
        descriptor.pin_type.as_deref().unwrap_or(DEFAULT_PIN_TYPE),
        descriptor.salt.clone(),
    )
}

fn is_self_issued(requirement: &IdTokenRequirement) -> bool {
    requirement.configuration == SELF_ISSUED_ID_TOKEN_CONFIGURATION
}

/// Fulfill the self issued id token requirements with the request's
/// `id_token_hint`. A pin, if any, joins them.
fn with_injected_id_token(
    requirement: Requirement,
    id_token_hint: &str,
    pin: Option<PinRequirement>,
) -> Requirement {
    match requirement {
        Requirement::Group(mut group) => {
            let mut fulfilled = false;
            for child in group.requirements.iter_mut() {
                if let Requirement::IdToken(id_token) = child {
                    if is_self_issued(id_token) {
                        id_token.fulfill(id_token_hint);
                        fulfilled = true;
                    }
                }
            }
            if let (true, Some(pin)) = (fulfilled, pin) {
                group.requirements.push(Requirement::Pin(pin));
            }
            Requirement::Group(group)
        }
        Requirement::IdToken(mut id_token) if is_self_issued(&id_token) => {
            id_token.fulfill(id_token_hint);
            match pin {
                Some(pin) => {
                    let mut group = GroupRequirement::new(
                        vec![Requirement::IdToken(id_token), Requirement::Pin(pin)],
                        GroupRequirementOperator::All,
                    );
                    group.required = false;
                    Requirement::Group(group)
                }
                None => Requirement::IdToken(id_token),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;
    use crate::networking::mock::MockHttpClient;
    use crate::requests::contract::models::tests::{contract_json, CREDENTIAL_ISSUER};
    use crate::requests::contract::IssuanceResponseClaims;
    use crate::requests::VerifiedIdIssuanceRequest;
    use crate::test_support::{configuration, TestIssuer};
    use crate::token::JwsToken;
    use crate::verified_id::tests::vc_jwt;
    use crate::verified_id::VerifiedId;
    use serde_json::{json, Value};

    const CONTRACT_URL: &str = "https://issuer.example/contracts/EmployeeCard";
    const CALLBACK: &str = "https://verifier.example/callback";

    fn attestations(value: Value) -> AttestationsDescriptor {
        serde_json::from_value(value).unwrap()
    }

    fn issuance_claims(extra: Value) -> PresentationRequestClaims {
        let mut claims = json!({
            "prompt": "create",
            "state": "state-1",
            "redirect_uri": CALLBACK,
        });
        if let (Some(claims), Value::Object(extra)) = (claims.as_object_mut(), extra) {
            claims.extend(extra);
        }
        serde_json::from_value(claims).unwrap()
    }

    fn contract_requirement() -> Requirement {
        let mut requirement = VerifiedIdRequirement::new(
            Some("EmployeeCard".to_string()),
            vec!["EmployeeCard".to_string()],
            VerifiedIdConstraint::VcType(VcTypeConstraint::new("EmployeeCard")),
        );
        requirement.issuance_options = vec![VerifiedIdRequestInput::Url(
            Url::parse(CONTRACT_URL).unwrap(),
        )];
        Requirement::VerifiedId(requirement)
    }

    fn serve_contract(client: &MockHttpClient, attestations: Value) {
        let issuer = TestIssuer::new("did:web:issuer.example");
        issuer.publish(client, None);
        client.respond_json(
            CONTRACT_URL,
            json!({"token": issuer.sign("JWT", contract_json(attestations))}),
        );
    }

    fn callback_bodies(client: &MockHttpClient) -> Vec<Value> {
        client
            .requests_to(CALLBACK)
            .iter()
            .map(|request| request.body_json())
            .collect()
    }

    #[test]
    fn test_attestations_map_in_order() {
        let requirement = requirement_from_attestations(
            &attestations(json!({
                "selfIssued": {"claims": [{"claim": "nickname"}]},
                "presentations": [{"credentialType": "Badge", "required": true,
                    "contracts": ["https://issuer.example/contracts/Badge"]}],
                "idTokens": [{"configuration": "https://login.example/.well-known/openid-configuration",
                    "redirect_uri": "vcclient://openid", "scope": "openid"}],
                "accessTokens": [{"configuration": "cfg", "resourceId": "res", "oboScope": "res/.default",
                    "required": true}]
            })),
            Some("nonce".to_string()),
        )
        .unwrap();

        let Requirement::Group(group) = requirement else {
            panic!("expected a group");
        };
        assert_eq!(group.operator, GroupRequirementOperator::All);
        match group.requirements.as_slice() {
            [Requirement::AccessToken(access), Requirement::IdToken(id_token), Requirement::VerifiedId(badge), Requirement::SelfAttestedClaim(nickname)] =>
            {
                assert!(access.required);
                assert_eq!(access.scope, "res/.default");
                assert!(!id_token.required);
                assert_eq!(id_token.nonce.as_deref(), Some("nonce"));
                assert_eq!(id_token.client_id, "");
                assert!(badge.required);
                assert_eq!(
                    badge.issuance_options,
                    vec![VerifiedIdRequestInput::Url(
                        Url::parse("https://issuer.example/contracts/Badge").unwrap()
                    )]
                );
                assert_eq!(nickname.claim, "nickname");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_self_issued_required_flags() {
        let single = requirement_from_attestations(
            &attestations(json!({"selfIssued": {"required": true, "claims": [{"claim": "a"}]}})),
            None,
        )
        .unwrap();
        assert!(matches!(single, Requirement::SelfAttestedClaim(claim) if claim.required));

        let several = requirement_from_attestations(
            &attestations(json!({"selfIssued": {"claims": [
                {"claim": "a", "required": true}, {"claim": "b"}
            ]}})),
            None,
        )
        .unwrap();
        let Requirement::Group(group) = several else {
            panic!("expected a group");
        };
        assert!(!group.required);
        assert_eq!(group.requirements.len(), 2);
    }

    #[test]
    fn test_empty_attestations_cannot_reduce() {
        let err = requirement_from_attestations(&attestations(json!({})), None).unwrap_err();
        assert_eq!(err.code, codes::UNABLE_TO_REDUCE_REQUIREMENTS);
    }

    #[test]
    fn test_invalid_descriptors_are_rejected() {
        let err = requirement_from_attestations(
            &attestations(json!({"idTokens": [{"configuration": "not a url", "redirect_uri": "x"}]})),
            None,
        )
        .unwrap_err();
        assert_eq!(err.code, codes::INVALID_PROPERTY);

        let err = requirement_from_attestations(
            &attestations(json!({"accessTokens": [{"configuration": "cfg", "resourceId": "res"}]})),
            None,
        )
        .unwrap_err();
        assert_eq!(err.code, codes::MISSING_REQUIRED_PROPERTY);
    }

    #[test]
    fn test_id_token_hint_fulfills_self_issued_tokens() {
        let lone = || {
            requirement_from_attestations(
                &attestations(json!({"idTokens": [{
                    "configuration": SELF_ISSUED_ID_TOKEN_CONFIGURATION,
                    "redirect_uri": "vcclient://openid"
                }]})),
                None,
            )
            .unwrap()
        };
        let pin = PinRequirement::new(4, "numeric", None);

        let Requirement::Group(group) = with_injected_id_token(lone(), "hint", Some(pin.clone()))
        else {
            panic!("expected the hint and pin to be grouped");
        };
        assert!(!group.required);
        assert!(matches!(&group.requirements[0], Requirement::IdToken(t) if t.id_token() == Some("hint")));
        assert!(matches!(&group.requirements[1], Requirement::Pin(_)));

        assert!(matches!(
            with_injected_id_token(lone(), "hint", None),
            Requirement::IdToken(t) if t.id_token() == Some("hint")
        ));

        let mixed = requirement_from_attestations(
            &attestations(json!({
                "idTokens": [
                    {"configuration": SELF_ISSUED_ID_TOKEN_CONFIGURATION, "redirect_uri": "x"},
                    {"configuration": "https://login.example/.well-known/openid-configuration", "redirect_uri": "x"}
                ],
                "selfIssued": {"claims": [{"claim": "nickname"}]}
            })),
            None,
        )
        .unwrap();
        let Requirement::Group(group) = with_injected_id_token(mixed, "hint", Some(pin)) else {
            panic!("expected a group");
        };
        assert_eq!(group.requirements.len(), 4);
        assert!(matches!(&group.requirements[0], Requirement::IdToken(t) if t.id_token() == Some("hint")));
        assert!(matches!(&group.requirements[1], Requirement::IdToken(t) if t.id_token().is_none()));
        assert!(matches!(&group.requirements[3], Requirement::Pin(_)));
    }

    #[tokio::test]
    async fn test_issuance_completes_against_credential_issuer() {
        let client = MockHttpClient::new();
        serve_contract(
            &client,
            json!({"selfIssued": {"claims": [{"claim": "nickname", "required": true}]}}),
        );
        client.respond_json(
            CREDENTIAL_ISSUER,
            json!({"vc": vc_jwt(&["EmployeeCard"], json!({"givenName": "Alice"}))}),
        );
        let processor = ContractIssuanceProcessor::new(configuration(client.clone()));

        let mut request = processor
            .process(&issuance_claims(json!({})), &contract_requirement())
            .await
            .unwrap();
        assert_eq!(request.style().name, "Contoso");
        assert_eq!(request.verified_id_style().name, "Employee Card");
        assert!(!request.is_satisfied());

        let err = request.complete().await.unwrap_err();
        assert_eq!(err.code, codes::REQUIREMENT_NOT_MET);
        assert!(client.requests_to(CALLBACK).is_empty());

        match request.requirement_mut() {
            Requirement::SelfAttestedClaim(claim) => claim.fulfill("Ali"),
            other => panic!("unexpected {:?}", other),
        }
        let verified_id = request.complete().await.unwrap();
        assert!(matches!(verified_id, VerifiedId::Contract { .. }));
        assert_eq!(verified_id.style().name, "Employee Card");

        let posted = &client.requests_to(CREDENTIAL_ISSUER)[0];
        assert!(posted.has_header("content-type", "application/jwt"));
        let response = JwsToken::<IssuanceResponseClaims>::from_compact(&posted.body_text()).unwrap();
        assert_eq!(response.content.contract, CONTRACT_URL);
        assert_eq!(response.content.attestations.self_issued["nickname"], "Ali");

        assert_eq!(
            callback_bodies(&client),
            vec![json!({"code": "issuance_successful", "state": "state-1"})]
        );
    }

    #[tokio::test]
    async fn test_failed_issuance_reports_service_error() {
        let client = MockHttpClient::new();
        serve_contract(&client, json!({"selfIssued": {"claims": [{"claim": "nickname"}]}}));
        client.respond(CREDENTIAL_ISSUER, 500, "boom");
        let processor = ContractIssuanceProcessor::new(configuration(client.clone()));

        let mut request = processor
            .process(&issuance_claims(json!({})), &contract_requirement())
            .await
            .unwrap();
        if let Requirement::SelfAttestedClaim(claim) = request.requirement_mut() {
            claim.fulfill("Ali");
        }

        assert!(request.complete().await.is_err());
        assert_eq!(
            callback_bodies(&client),
            vec![json!({"code": "issuance_failed", "state": "state-1", "details": "issuance_service_error"})]
        );
    }

    #[tokio::test]
    async fn test_unresolvable_contract_reports_fetch_error() {
        let client = MockHttpClient::new();
        let processor = ContractIssuanceProcessor::new(configuration(client.clone()));

        let err = processor
            .process(&issuance_claims(json!({})), &contract_requirement())
            .await
            .err().unwrap();
        assert_eq!(err.code, codes::NETWORKING);
        assert_eq!(
            callback_bodies(&client),
            vec![json!({"code": "issuance_failed", "state": "state-1", "details": "fetch_contract_error"})]
        );
    }

    #[tokio::test]
    async fn test_cancel_reports_user_canceled() {
        let client = MockHttpClient::new();
        serve_contract(&client, json!({"selfIssued": {"claims": [{"claim": "nickname"}]}}));
        let processor = ContractIssuanceProcessor::new(configuration(client.clone()));

        let request = processor
            .process(&issuance_claims(json!({})), &contract_requirement())
            .await
            .unwrap();
        let err = request.cancel(Some("not now".to_string())).await.unwrap_err();
        assert_eq!(err.code, codes::USER_CANCELED);
        assert_eq!(
            callback_bodies(&client),
            vec![json!({"code": "issuance_failed", "state": "state-1", "details": "user_canceled"})]
        );
    }

    #[tokio::test]
    async fn test_injected_hint_and_pin() {
        let client = MockHttpClient::new();
        serve_contract(
            &client,
            json!({"idTokens": [{
                "configuration": SELF_ISSUED_ID_TOKEN_CONFIGURATION,
                "redirect_uri": "vcclient://openid"
            }]}),
        );
        let processor = ContractIssuanceProcessor::new(configuration(client));

        let request = processor
            .process(
                &issuance_claims(json!({
                    "id_token_hint": "hint.jwt.token",
                    "pin": {"length": 4, "salt": "salt"}
                })),
                &contract_requirement(),
            )
            .await
            .unwrap();
        let Requirement::Group(group) = request.requirement() else {
            panic!("expected the hint and pin to be grouped");
        };
        match group.requirements.as_slice() {
            [Requirement::IdToken(id_token), Requirement::Pin(pin)] => {
                assert_eq!(id_token.id_token(), Some("hint.jwt.token"));
                assert_eq!(pin.pin_type, "numeric");
                assert_eq!(pin.salt.as_deref(), Some("salt"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_requirement_without_issuance_option_is_rejected() {
        let processor = ContractIssuanceProcessor::new(configuration(MockHttpClient::new()));
        let mut requirement = contract_requirement();
        if let Requirement::VerifiedId(verified_id) = &mut requirement {
            verified_id.issuance_options.clear();
        }
        let err = processor
            .process(&issuance_claims(json!({})), &requirement)
            .await
            .err().unwrap();
        assert_eq!(err.code, codes::MALFORMED_INPUT);

        let err = processor
            .process(
                &issuance_claims(json!({})),
                &Requirement::SelfAttestedClaim(SelfAttestedClaimRequirement::new("x")),
            )
            .await
            .err().unwrap();
        assert_eq!(err.code, codes::MALFORMED_INPUT);
    }
}
