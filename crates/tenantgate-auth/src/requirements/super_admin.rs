//! Super-admin gate.

use tenantgate_core::types::Principal;

use crate::outcome::{AuthFailure, EvaluationFailure, RequirementKind};

pub fn evaluate(principal: &Principal) -> Result<(), EvaluationFailure> {
    if principal.is_super_admin() {
        Ok(())
    } else {
        Err(EvaluationFailure::new(
            RequirementKind::SuperAdmin,
            AuthFailure::NotSuperAdmin,
            "principal is not a super admin",
        ))
    }
}
