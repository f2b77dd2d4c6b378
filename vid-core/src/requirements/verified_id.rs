use super::VerifiedIdConstraint;
use crate::error::{Result, VerifiedIdError};
use crate::requests::VerifiedIdRequestInput;
use crate::verified_id::VerifiedId;

/// A Verified ID the holder must select from their wallet.
#[derive(Debug, Clone)]
pub struct VerifiedIdRequirement {
    /// Input descriptor id in the presentation definition.
    pub id: Option<String>,
    pub types: Vec<String>,
    pub purpose: Option<String>,
    pub required: bool,
    pub encrypted: bool,
    pub constraint: VerifiedIdConstraint,
    /// Input descriptors this one may not share a presentation with.
    pub exclusive_presentation_with: Vec<String>,
    /// Where the holder can get a matching Verified ID.
    pub issuance_options: Vec<VerifiedIdRequestInput>,
    selected: Option<VerifiedId>,
}

impl VerifiedIdRequirement {
    pub fn new(id: Option<String>, types: Vec<String>, constraint: VerifiedIdConstraint) -> Self {
        Self {
            id,
            types,
            purpose: None,
            required: true,
            encrypted: false,
            constraint,
            exclusive_presentation_with: Vec::new(),
            issuance_options: Vec::new(),
            selected: None,
        }
    }

    /// Verified IDs from `verified_ids` that satisfy the constraint.
    pub fn get_matches<'a>(&self, verified_ids: &'a [VerifiedId]) -> Vec<&'a VerifiedId> {
        verified_ids
            .iter()
            .filter(|verified_id| self.constraint.matches(verified_id))
            .collect()
    }

    pub fn fulfill(&mut self, verified_id: VerifiedId) -> Result<()> {
        if !self.constraint.matches(&verified_id) {
            return Err(constraints_do_not_match());
        }
        self.selected = Some(verified_id);
        Ok(())
    }

    pub fn selected_verified_id(&self) -> Option<&VerifiedId> {
        self.selected.as_ref()
    }

    pub fn validate(&self) -> Result<()> {
        let Some(selected) = &self.selected else {
            return Err(VerifiedIdError::requirement_not_met(
                "Verified Id has not been set.",
                vec![],
            ));
        };
        if !self.constraint.matches(selected) {
            return Err(constraints_do_not_match());
        }
        Ok(())
    }

    /// Whether this requirement and `other` may go into the same
    /// presentation, checked from both sides.
    pub fn can_share_presentation_with(&self, other: &VerifiedIdRequirement) -> bool {
        let excludes = |a: &VerifiedIdRequirement, b: &VerifiedIdRequirement| {
            b.id
                .as_ref()
                .is_some_and(|id| a.exclusive_presentation_with.contains(id))
        };
        !excludes(self, other) && !excludes(other, self)
    }
}

fn constraints_do_not_match() -> VerifiedIdError {
    VerifiedIdError::requirement_not_met("Verified Id Constraints do not match.", vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::VcTypeConstraint;
    use crate::verified_id::tests::self_signed;
    use serde_json::json;

    fn requirement(vc_type: &str) -> VerifiedIdRequirement {
        VerifiedIdRequirement::new(
            Some(format!("{}-descriptor", vc_type)),
            vec![vc_type.to_string()],
            VerifiedIdConstraint::VcType(VcTypeConstraint::new(vc_type)),
        )
    }

    #[test]
    fn test_unset_requirement_is_invalid() {
        let err = requirement("EmployeeCard").validate().unwrap_err();
        assert_eq!(err.message, "Verified Id has not been set.");
    }

    #[test]
    fn test_fulfill_checks_constraint() {
        let mut requirement = requirement("EmployeeCard");
        let err = requirement
            .fulfill(self_signed(&["Passport"], json!({})))
            .unwrap_err();
        assert_eq!(err.message, "Verified Id Constraints do not match.");
        assert!(requirement.selected_verified_id().is_none());

        requirement
            .fulfill(self_signed(&["EmployeeCard"], json!({})))
            .unwrap();
        assert!(requirement.validate().is_ok());
    }

    #[test]
    fn test_get_matches() {
        let wallet = vec![
            self_signed(&["EmployeeCard"], json!({})),
            self_signed(&["Passport"], json!({})),
        ];
        let matches = requirement("Passport").get_matches(&wallet);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].types()[1], "Passport");
    }

    #[test]
    fn test_exclusivity_is_bidirectional() {
        let a = requirement("A");
        let mut b = requirement("B");
        assert!(a.can_share_presentation_with(&b));

        b.exclusive_presentation_with = vec!["A-descriptor".to_string()];
        assert!(!a.can_share_presentation_with(&b));
        assert!(!b.can_share_presentation_with(&a));
    }
}
