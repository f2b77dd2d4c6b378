//! What a request needs from the holder before it can be completed.
//!
//! A request carries a single [`Requirement`]; several requirements are
//! combined into a [`GroupRequirement`]. Hosts fulfill the leaves and call
//! [`Requirement::validate`] to see what is still missing.

mod access_token;
mod constraints;
mod group;
mod holder;
mod verified_id;

pub use access_token::{
    AccessTokenRequirement, PrefilledAccessTokenRequirement, RetryablePinRequirement,
};
pub use constraints::{
    FieldConstraint, GroupConstraint, GroupConstraintOperator, VcTypeConstraint,
    VerifiedIdConstraint,
};
pub use group::{GroupRequirement, GroupRequirementOperator};
pub use holder::{IdTokenRequirement, PinRequirement, SelfAttestedClaimRequirement};
pub use verified_id::VerifiedIdRequirement;

use crate::error::{Result, VerifiedIdError};

#[derive(Debug)]
pub enum Requirement {
    Group(GroupRequirement),
    VerifiedId(VerifiedIdRequirement),
    SelfAttestedClaim(SelfAttestedClaimRequirement),
    Pin(PinRequirement),
    IdToken(IdTokenRequirement),
    AccessToken(AccessTokenRequirement),
    PrefilledAccessToken(PrefilledAccessTokenRequirement),
    RetryablePin(RetryablePinRequirement),
}

impl Requirement {
    pub fn validate(&self) -> Result<()> {
        match self {
            Requirement::Group(requirement) => requirement.validate(),
            Requirement::VerifiedId(requirement) => requirement.validate(),
            Requirement::SelfAttestedClaim(requirement) => requirement.validate(),
            Requirement::Pin(requirement) => requirement.validate(),
            Requirement::IdToken(requirement) => requirement.validate(),
            Requirement::AccessToken(requirement) => requirement.validate(),
            Requirement::PrefilledAccessToken(_) => Ok(()),
            Requirement::RetryablePin(requirement) => requirement.validate(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Combine requirements into the single one a request carries.
    pub fn reduce(mut requirements: Vec<Requirement>) -> Result<Requirement> {
        match requirements.len() {
            0 => Err(VerifiedIdError::unable_to_reduce_requirements()),
            1 => Ok(requirements.remove(0)),
            _ => Ok(Requirement::Group(GroupRequirement::new(
                requirements,
                GroupRequirementOperator::All,
            ))),
        }
    }

    /// Access token held by the first token-bearing requirement.
    pub(crate) fn access_token(&self) -> Option<&str> {
        match self {
            Requirement::Group(group) => group
                .requirements
                .iter()
                .find_map(Requirement::access_token),
            Requirement::AccessToken(requirement) => requirement.access_token(),
            Requirement::PrefilledAccessToken(requirement) => Some(&requirement.access_token),
            Requirement::RetryablePin(requirement) => requirement.access_token(),
            _ => None,
        }
    }

    /// Verified ID requirements whose selections go into a presentation.
    ///
    /// ANY groups only contribute their valid members.
    pub(crate) fn presentable<'a>(
        &'a self,
        presentable: &mut Vec<&'a VerifiedIdRequirement>,
    ) -> Result<()> {
        match self {
            Requirement::Group(group) => {
                for requirement in &group.requirements {
                    if group.operator == GroupRequirementOperator::Any && !requirement.is_valid() {
                        continue;
                    }
                    requirement.presentable(presentable)?;
                }
                Ok(())
            }
            Requirement::VerifiedId(requirement) => {
                presentable.push(requirement);
                Ok(())
            }
            _ => Err(VerifiedIdError::unsupported_serialization()),
        }
    }
}
