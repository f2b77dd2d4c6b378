use regex::Regex;
use serde_json::Value;

use crate::error::{Result, VerifiedIdError};
use crate::verified_id::VerifiedId;

/// Restricts which Verified IDs may fulfill a requirement.
#[derive(Debug, Clone)]
pub enum VerifiedIdConstraint {
    VcType(VcTypeConstraint),
    Group(GroupConstraint),
    Field(FieldConstraint),
}

impl VerifiedIdConstraint {
    pub fn matches(&self, verified_id: &VerifiedId) -> bool {
        match self {
            VerifiedIdConstraint::VcType(constraint) => constraint.matches(verified_id),
            VerifiedIdConstraint::Group(constraint) => constraint.matches(verified_id),
            VerifiedIdConstraint::Field(constraint) => constraint.matches(verified_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcTypeConstraint {
    pub vc_type: String,
}

impl VcTypeConstraint {
    pub fn new(vc_type: impl Into<String>) -> Self {
        Self {
            vc_type: vc_type.into(),
        }
    }

    fn matches(&self, verified_id: &VerifiedId) -> bool {
        verified_id.types().iter().any(|t| *t == self.vc_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupConstraintOperator {
    All,
    Any,
}

#[derive(Debug, Clone)]
pub struct GroupConstraint {
    pub constraints: Vec<VerifiedIdConstraint>,
    pub operator: GroupConstraintOperator,
}

impl GroupConstraint {
    fn matches(&self, verified_id: &VerifiedId) -> bool {
        match self.operator {
            GroupConstraintOperator::All => {
                self.constraints.iter().all(|c| c.matches(verified_id))
            }
            GroupConstraintOperator::Any => {
                self.constraints.iter().any(|c| c.matches(verified_id))
            }
        }
    }
}

/// Matches when any of `paths` resolves to a string accepted by `pattern`.
#[derive(Debug, Clone)]
pub struct FieldConstraint {
    pub paths: Vec<String>,
    pub pattern: Regex,
    pub purpose: Option<String>,
}

impl FieldConstraint {
    pub fn new(paths: Vec<String>, pattern: &str, purpose: Option<String>) -> Result<Self> {
        if paths.is_empty() {
            return Err(VerifiedIdError::malformed_input(
                "Field constraint has no paths.",
            ));
        }
        let pattern = Regex::new(pattern).map_err(|e| {
            VerifiedIdError::malformed_input("Field constraint pattern is not valid.").with_inner(e)
        })?;

        Ok(Self {
            paths,
            pattern,
            purpose,
        })
    }

    fn matches(&self, verified_id: &VerifiedId) -> bool {
        let payload = verified_id.vc().payload();
        self.paths
            .iter()
            .filter_map(|path| walk_path(payload, path))
            .filter_map(Value::as_str)
            .any(|value| self.pattern.is_match(value))
    }
}

/// Resolve a `$.a.b.0` style path. Numeric segments index arrays.
fn walk_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix('$').unwrap_or(path);
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(root, |value, segment| match value {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            Value::Object(members) => members.get(segment),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verified_id::tests::self_signed;
    use serde_json::json;

    #[test]
    fn test_vc_type_constraint() {
        let verified_id = self_signed(&["EmployeeCard"], json!({}));
        assert!(VcTypeConstraint::new("EmployeeCard").matches(&verified_id));
        assert!(!VcTypeConstraint::new("Passport").matches(&verified_id));
    }

    #[test]
    fn test_group_operators() {
        let verified_id = self_signed(&["EmployeeCard"], json!({}));
        let constraints = vec![
            VerifiedIdConstraint::VcType(VcTypeConstraint::new("EmployeeCard")),
            VerifiedIdConstraint::VcType(VcTypeConstraint::new("Passport")),
        ];

        let any = GroupConstraint {
            constraints: constraints.clone(),
            operator: GroupConstraintOperator::Any,
        };
        let all = GroupConstraint {
            constraints,
            operator: GroupConstraintOperator::All,
        };
        assert!(any.matches(&verified_id));
        assert!(!all.matches(&verified_id));
    }

    #[test]
    fn test_field_constraint_walks_objects_and_arrays() {
        let verified_id = self_signed(
            &["EmployeeCard"],
            json!({"department": "Sales", "roles": ["admin", "reader"]}),
        );

        let department = FieldConstraint::new(
            vec!["$.vc.credentialSubject.department".to_string()],
            "^Sal",
            None,
        )
        .unwrap();
        assert!(department.matches(&verified_id));

        let role = FieldConstraint::new(
            vec![
                "$.vc.credentialSubject.missing".to_string(),
                "$.vc.credentialSubject.roles.1".to_string(),
            ],
            "^reader$",
            None,
        )
        .unwrap();
        assert!(role.matches(&verified_id));

        let non_string =
            FieldConstraint::new(vec!["$.iat".to_string()], ".*", None).unwrap();
        assert!(!non_string.matches(&verified_id));
    }

    #[test]
    fn test_field_constraint_rejects_bad_input() {
        assert!(FieldConstraint::new(vec![], ".*", None).is_err());
        assert!(FieldConstraint::new(vec!["$.a".to_string()], "(", None).is_err());
    }
}
