//! Hooks that let hosts reshape a request after the library processed it.
//!
//! Extensions only run when
//! [`PreviewFeatureFlags::PROCESSOR_EXTENSION_SUPPORT`](crate::PreviewFeatureFlags::PROCESSOR_EXTENSION_SUPPORT)
//! is on.

use serde_json::{Map, Value};

use crate::requirements::{
    GroupRequirement, GroupRequirementOperator, Requirement, VerifiedIdRequirement,
};
use crate::root_of_trust::RootOfTrust;
use crate::styles::{RequesterStyle, VerifiedIdStyle};

/// A processed request extensions may still change before it reaches the host.
#[derive(Debug)]
pub struct VerifiedIdPartialRequest {
    pub requester_style: RequesterStyle,
    /// Set when the request issues a Verified ID.
    pub verified_id_style: Option<VerifiedIdStyle>,
    pub requirement: Requirement,
    pub root_of_trust: RootOfTrust,
}

impl VerifiedIdPartialRequest {
    pub fn new(
        requester_style: RequesterStyle,
        requirement: Requirement,
        root_of_trust: RootOfTrust,
    ) -> Self {
        Self {
            requester_style,
            verified_id_style: None,
            requirement,
            root_of_trust,
        }
    }

    /// Swap the first Verified ID requirement with `id`, searched depth
    /// first through groups, for what `transformer` makes of it.
    ///
    /// Returns the new requirement, or `None` if no requirement has `id`.
    pub fn replace_requirement<F>(&mut self, id: &str, transformer: F) -> Option<&Requirement>
    where
        F: FnOnce(VerifiedIdRequirement) -> Requirement,
    {
        let path = path_to(&self.requirement, id)?;
        let node = node_at_mut(&mut self.requirement, &path)?;

        let placeholder = Requirement::Group(GroupRequirement::new(
            Vec::new(),
            GroupRequirementOperator::All,
        ));
        match std::mem::replace(node, placeholder) {
            Requirement::VerifiedId(old) => *node = transformer(old),
            other => *node = other,
        }
        Some(&*node)
    }

    /// Drop every Verified ID requirement with `id` from the top level
    /// group. Nested groups and a lone requirement are left alone.
    pub fn remove_requirement(&mut self, id: &str) -> bool {
        let Requirement::Group(group) = &mut self.requirement else {
            return false;
        };
        let before = group.requirements.len();
        group
            .requirements
            .retain(|requirement| !has_id(requirement, id));
        group.requirements.len() != before
    }
}

fn has_id(requirement: &Requirement, id: &str) -> bool {
    matches!(requirement, Requirement::VerifiedId(verified_id) if verified_id.id.as_deref() == Some(id))
}

/// Child indexes leading to the first Verified ID requirement with `id`.
fn path_to(requirement: &Requirement, id: &str) -> Option<Vec<usize>> {
    match requirement {
        _ if has_id(requirement, id) => Some(Vec::new()),
        Requirement::Group(group) => group
            .requirements
            .iter()
            .enumerate()
            .find_map(|(index, child)| {
                let mut path = path_to(child, id)?;
                path.insert(0, index);
                Some(path)
            }),
        _ => None,
    }
}

fn node_at_mut<'a>(requirement: &'a mut Requirement, path: &[usize]) -> Option<&'a mut Requirement> {
    let mut node = requirement;
    for &index in path {
        node = match node {
            Requirement::Group(group) => group.requirements.get_mut(index)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Host code run on every request a processor produces.
///
/// `raw_request` holds the request's claims as received, including those
/// the library does not interpret.
pub trait RequestProcessorExtendable: Send + Sync {
    fn parse(
        &self,
        raw_request: &Map<String, Value>,
        request: VerifiedIdPartialRequest,
    ) -> VerifiedIdPartialRequest;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::{
        PinRequirement, SelfAttestedClaimRequirement, VcTypeConstraint, VerifiedIdConstraint,
    };

    fn verified_id(id: &str) -> Requirement {
        Requirement::VerifiedId(VerifiedIdRequirement::new(
            Some(id.to_string()),
            vec![id.to_string()],
            VerifiedIdConstraint::VcType(VcTypeConstraint::new(id)),
        ))
    }

    fn group(requirements: Vec<Requirement>) -> Requirement {
        Requirement::Group(GroupRequirement::new(
            requirements,
            GroupRequirementOperator::All,
        ))
    }

    fn partial(requirement: Requirement) -> VerifiedIdPartialRequest {
        VerifiedIdPartialRequest::new(
            RequesterStyle::default(),
            requirement,
            RootOfTrust::default(),
        )
    }

    fn pin() -> Requirement {
        Requirement::Pin(PinRequirement::new(4, "numeric", None))
    }

    #[test]
    fn test_replace_nested_requirement() {
        let mut request = partial(group(vec![
            pin(),
            group(vec![verified_id("a"), verified_id("b")]),
        ]));

        let replaced = request.replace_requirement("b", |old| {
            assert_eq!(old.types, vec!["b"]);
            Requirement::SelfAttestedClaim(SelfAttestedClaimRequirement::new("nickname"))
        });
        assert!(matches!(replaced, Some(Requirement::SelfAttestedClaim(_))));

        let Requirement::Group(outer) = &request.requirement else {
            panic!("expected a group");
        };
        let Requirement::Group(inner) = &outer.requirements[1] else {
            panic!("expected a nested group");
        };
        assert!(matches!(inner.requirements[0], Requirement::VerifiedId(_)));
        assert!(matches!(inner.requirements[1], Requirement::SelfAttestedClaim(_)));
    }

    #[test]
    fn test_replace_lone_requirement() {
        let mut request = partial(verified_id("a"));
        assert!(request.replace_requirement("a", |_| pin()).is_some());
        assert!(matches!(request.requirement, Requirement::Pin(_)));
    }

    #[test]
    fn test_replace_unknown_id_leaves_tree() {
        let mut request = partial(group(vec![verified_id("a"), pin()]));
        let mut called = false;
        assert!(request
            .replace_requirement("missing", |old| {
                called = true;
                Requirement::VerifiedId(old)
            })
            .is_none());
        assert!(!called);
        let Requirement::Group(outer) = &request.requirement else {
            panic!("expected a group");
        };
        assert_eq!(outer.requirements.len(), 2);
    }

    #[test]
    fn test_remove_only_touches_top_level_group() {
        let mut request = partial(group(vec![
            verified_id("a"),
            group(vec![verified_id("b")]),
            pin(),
        ]));
        assert!(request.remove_requirement("a"));
        assert!(!request.remove_requirement("a"));
        assert!(!request.remove_requirement("b"));

        let Requirement::Group(outer) = &request.requirement else {
            panic!("expected a group");
        };
        assert_eq!(outer.requirements.len(), 2);

        let mut lone = partial(verified_id("a"));
        assert!(!lone.remove_requirement("a"));
    }
}
