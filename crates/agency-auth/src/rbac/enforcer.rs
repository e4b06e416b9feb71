//! RBAC enforcement: the single place where a role is checked against a
//! capability.

use agency_core::error::AppError;
use agency_entity::user::UserRole;

use super::policies::{Permission, RbacPolicies};

/// Enforces role-based access control.
#[derive(Debug, Clone)]
pub struct RbacEnforcer {
    /// The policy configuration.
    policies: RbacPolicies,
}

impl RbacEnforcer {
    /// Creates a new enforcer with the default policy set.
    pub fn new() -> Self {
        Self {
            policies: RbacPolicies::new(),
        }
    }

    /// Creates an enforcer with custom policies.
    pub fn with_policies(policies: RbacPolicies) -> Self {
        Self { policies }
    }

    /// Checks whether the given role has the required capability.
    ///
    /// Returns `Ok(())` if allowed, or an authorization error if denied.
    pub fn require_permission(&self, role: &UserRole, permission: Permission) -> Result<(), AppError> {
        if self.policies.has_permission(role, &permission) {
            Ok(())
        } else {
            tracing::debug!(%role, %permission, "Permission denied");
            Err(AppError::authorization(format!(
                "Role '{role}' does not have permission '{permission}'"
            )))
        }
    }

    /// Checks whether the role has the required capability (returns bool).
    pub fn has_permission(&self, role: &UserRole, permission: Permission) -> bool {
        self.policies.has_permission(role, &permission)
    }

    /// Returns a reference to the underlying policies.
    pub fn policies(&self) -> &RbacPolicies {
        &self.policies
    }
}

impl Default for RbacEnforcer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_core::error::ErrorKind;

    #[test]
    fn test_denial_is_authorization_error() {
        let enforcer = RbacEnforcer::new();
        let err = enforcer
            .require_permission(&UserRole::Staff, Permission::CreateBatches)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(enforcer
            .require_permission(&UserRole::Manager, Permission::ConfirmSales)
            .is_ok());
    }
}
