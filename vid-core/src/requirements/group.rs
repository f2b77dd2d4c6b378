use super::Requirement;
use crate::error::{Result, VerifiedIdError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRequirementOperator {
    All,
    Any,
}

#[derive(Debug)]
pub struct GroupRequirement {
    pub required: bool,
    pub requirements: Vec<Requirement>,
    pub operator: GroupRequirementOperator,
}

impl GroupRequirement {
    pub fn new(requirements: Vec<Requirement>, operator: GroupRequirementOperator) -> Self {
        Self {
            required: true,
            requirements,
            operator,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let errors: Vec<VerifiedIdError> = self
            .requirements
            .iter()
            .filter_map(|requirement| requirement.validate().err())
            .collect();

        let satisfied = match self.operator {
            GroupRequirementOperator::All => errors.is_empty(),
            GroupRequirementOperator::Any => errors.len() < self.requirements.len(),
        };

        if satisfied {
            Ok(())
        } else {
            Err(VerifiedIdError::requirement_not_met(
                "Group Requirement is not valid.",
                errors,
            ))
        }
    }
}
