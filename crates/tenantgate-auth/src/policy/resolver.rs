//! Expands policy names into requirements.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::requirement::{PermissionRequirement, Requirement};

/// Policy granted only to super admins.
pub const SUPER_ADMIN: &str = "SuperAdmin";
/// Office-membership gate.
pub const OFFICE_USER: &str = "OfficeUser";
/// Session binding check.
pub const SESSION: &str = "Session";
/// Any authenticated caller.
pub const AUTHENTICATED: &str = "Authenticated";

/// A named, resolved policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    name: String,
    requirements: Vec<Requirement>,
}

impl Policy {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }
}

/// Resolves policy names, caching the result per name.
///
/// Resolution depends only on the name and the session enforcement flag,
/// so cached policies never go stale.
#[derive(Debug, Default)]
pub struct PolicyResolver {
    enforce_session: bool,
    cache: DashMap<String, Arc<Policy>>,
}

impl PolicyResolver {
    pub fn new(enforce_session: bool) -> Self {
        Self {
            enforce_session,
            cache: DashMap::new(),
        }
    }

    pub fn resolve(&self, name: &str) -> Arc<Policy> {
        if let Some(policy) = self.cache.get(name) {
            return Arc::clone(policy.value());
        }
        let policy = Arc::new(self.build(name));
        debug!(policy = name, requirements = policy.requirements.len(), "Policy resolved");
        self.cache
            .entry(name.to_string())
            .or_insert(policy)
            .value()
            .clone()
    }

    fn build(&self, name: &str) -> Policy {
        let requirements = match name.trim() {
            SUPER_ADMIN => vec![Requirement::SuperAdmin],
            OFFICE_USER => vec![Requirement::OfficeUser],
            SESSION => vec![Requirement::Session],
            AUTHENTICATED => self.dynamic(PermissionRequirement::default()),
            expression => self.dynamic(PermissionRequirement::parse(expression)),
        };
        Policy {
            name: name.to_string(),
            requirements,
        }
    }

    fn dynamic(&self, permissions: PermissionRequirement) -> Vec<Requirement> {
        let mut requirements = vec![Requirement::Permission(permissions)];
        if self.enforce_session {
            requirements.push(Requirement::Session);
        }
        requirements
    }
}
