//! Role-to-capability mapping definitions.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use agency_entity::user::UserRole;

/// A named capability gating one family of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Inventory
    /// See the purchase price of tickets.
    ViewBuyingPrice,
    /// Record new ticket batches.
    CreateBatches,
    /// Edit batch metadata.
    EditBatches,
    /// Delete unsold batches.
    DeleteBatches,
    /// Browse tickets.
    ViewTickets,

    // Sales
    /// Create bookings.
    CreateBookings,
    /// Accept a deposit instead of full payment.
    PartialPayments,
    /// Confirm a sale (ticket to sold, booking to confirmed).
    ConfirmSales,
    /// See bookings created by other users.
    ViewAllBookings,
    /// Delete bookings.
    DeleteBookings,
    /// Release held or sold tickets, cancel confirmed sales.
    OverrideLocks,

    // Reporting
    /// See revenue, profit and batch economics.
    ViewProfit,

    // Administration
    /// Manage user accounts.
    ManageUsers,
    /// Edit system settings, export data, read the activity log.
    SystemSettings,
}

impl Permission {
    /// Every capability.
    pub const ALL: [Permission; 14] = [
        Self::ViewBuyingPrice,
        Self::CreateBatches,
        Self::EditBatches,
        Self::DeleteBatches,
        Self::ViewTickets,
        Self::CreateBookings,
        Self::PartialPayments,
        Self::ConfirmSales,
        Self::ViewAllBookings,
        Self::DeleteBookings,
        Self::OverrideLocks,
        Self::ViewProfit,
        Self::ManageUsers,
        Self::SystemSettings,
    ];

    /// The snake_case tag of this capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewBuyingPrice => "view_buying_price",
            Self::CreateBatches => "create_batches",
            Self::EditBatches => "edit_batches",
            Self::DeleteBatches => "delete_batches",
            Self::ViewTickets => "view_tickets",
            Self::CreateBookings => "create_bookings",
            Self::PartialPayments => "partial_payments",
            Self::ConfirmSales => "confirm_sales",
            Self::ViewAllBookings => "view_all_bookings",
            Self::DeleteBookings => "delete_bookings",
            Self::OverrideLocks => "override_locks",
            Self::ViewProfit => "view_profit",
            Self::ManageUsers => "manage_users",
            Self::SystemSettings => "system_settings",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defines the mapping from each role to its set of capabilities.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    /// Role → set of capabilities.
    policies: HashMap<UserRole, HashSet<Permission>>,
}

impl RbacPolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        let mut policies = HashMap::new();

        // Staff: front desk, sells and takes deposits
        let staff: HashSet<Permission> = [
            Permission::ViewTickets,
            Permission::CreateBookings,
            Permission::PartialPayments,
        ]
        .into_iter()
        .collect();

        // Manager: confirms sales, oversees every booking
        let manager: HashSet<Permission> = [
            Permission::ViewTickets,
            Permission::CreateBookings,
            Permission::ConfirmSales,
            Permission::ViewAllBookings,
        ]
        .into_iter()
        .collect();

        // Admin: everything
        let admin: HashSet<Permission> = Permission::ALL.into_iter().collect();

        policies.insert(UserRole::Staff, staff);
        policies.insert(UserRole::Manager, manager);
        policies.insert(UserRole::Admin, admin);

        Self { policies }
    }

    /// Checks whether a role holds a capability.
    pub fn has_permission(&self, role: &UserRole, permission: &Permission) -> bool {
        self.policies
            .get(role)
            .is_some_and(|set| set.contains(permission))
    }

    /// Capabilities of a role, in declaration order.
    pub fn permissions_for(&self, role: &UserRole) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| self.has_permission(role, p))
            .collect()
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_everything() {
        let policies = RbacPolicies::new();
        for permission in Permission::ALL {
            assert!(policies.has_permission(&UserRole::Admin, &permission));
        }
    }

    #[test]
    fn test_manager_table() {
        let policies = RbacPolicies::new();
        assert_eq!(
            policies.permissions_for(&UserRole::Manager),
            vec![
                Permission::ViewTickets,
                Permission::CreateBookings,
                Permission::ConfirmSales,
                Permission::ViewAllBookings,
            ]
        );
    }

    #[test]
    fn test_staff_cannot_see_money_or_create_batches() {
        let policies = RbacPolicies::new();
        assert!(policies.has_permission(&UserRole::Staff, &Permission::PartialPayments));
        assert!(!policies.has_permission(&UserRole::Staff, &Permission::CreateBatches));
        assert!(!policies.has_permission(&UserRole::Staff, &Permission::ViewProfit));
        assert!(!policies.has_permission(&UserRole::Staff, &Permission::ViewBuyingPrice));
        assert!(!policies.has_permission(&UserRole::Staff, &Permission::ConfirmSales));
    }

    #[test]
    fn test_serialized_tags() {
        assert_eq!(
            serde_json::to_string(&Permission::ViewBuyingPrice).unwrap(),
            "\"view_buying_price\""
        );
        assert_eq!(Permission::OverrideLocks.to_string(), "override_locks");
    }
}
