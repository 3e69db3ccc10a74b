//! Requirements a policy is made of.

use std::collections::HashSet;

use crate::outcome::RequirementKind;

/// Permission names, at least one of which the caller must hold.
///
/// An empty set means "authenticated only".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PermissionRequirement {
    permissions: Vec<String>,
}

impl PermissionRequirement {
    /// Builds from names, trimming and dropping blanks and duplicates.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut permissions: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !permissions.iter().any(|p| p == name) {
                permissions.push(name.to_string());
            }
        }
        Self { permissions }
    }

    /// Parses `Permission1;Permission2;...`.
    pub fn parse(expression: &str) -> Self {
        Self::new(expression.split(';'))
    }

    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Whether any required permission is in `granted`.
    pub fn is_satisfied_by(&self, granted: &HashSet<String>) -> bool {
        self.permissions.iter().any(|p| granted.contains(p))
    }
}

/// One check a policy requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Requirement {
    SuperAdmin,
    OfficeUser,
    Permission(PermissionRequirement),
    Session,
}

impl Requirement {
    pub fn kind(&self) -> RequirementKind {
        match self {
            Self::SuperAdmin => RequirementKind::SuperAdmin,
            Self::OfficeUser => RequirementKind::OfficeUser,
            Self::Permission(_) => RequirementKind::Permission,
            Self::Session => RequirementKind::Session,
        }
    }
}
