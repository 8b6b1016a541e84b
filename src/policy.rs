// src/policy.rs
//
// Single declarative role x resource x action table. Handlers and services
// never compare role strings inline; they ask this module.

use crate::common::error::AppError;
use crate::models::auth::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Inquiry,
    InquiryItem,
    CostCalculation,
    Approval,
    Customer,
    User,
    Notification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

/// What a role may touch for a given resource/action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every record.
    Any,
    /// Only records the caller owns (creator, or item assignee for costing).
    Owned,
    Denied,
}

impl Scope {
    pub fn allows(self, is_owner: bool) -> bool {
        match self {
            Scope::Any => true,
            Scope::Owned => is_owner,
            Scope::Denied => false,
        }
    }
}

pub fn permission(role: Role, resource: Resource, action: Action) -> Scope {
    use Action::*;
    use Resource::*;
    use Scope::*;

    match role {
        // Full bypass
        Role::Superuser | Role::Admin => Any,

        Role::Manager => match (resource, action) {
            (Inquiry | InquiryItem, Create | Read | Update) => Any,
            (Inquiry, Delete) => Owned,
            (InquiryItem, Delete) => Denied,
            (CostCalculation, Read) => Any,
            (CostCalculation, _) => Denied,
            (Approval, _) => Any,
            (Customer, _) => Any,
            (User, Read) => Any,
            (User, _) => Denied,
            (Notification, Read | Update) => Owned,
            (Notification, _) => Denied,
        },

        Role::Sales => match (resource, action) {
            (Inquiry, Create) => Any,
            (Inquiry, Read | Update | Delete) => Owned,
            (InquiryItem, Read) => Owned,
            (InquiryItem, _) => Denied,
            (CostCalculation | Approval, _) => Denied,
            (Customer, Create | Read) => Any,
            (Customer, Update) => Owned,
            (Customer, Delete) => Denied,
            (User, _) => Denied,
            (Notification, Read | Update) => Owned,
            (Notification, _) => Denied,
        },

        // Assigns items to costing users
        Role::Vpp => match (resource, action) {
            (Inquiry | InquiryItem, Read) => Any,
            (InquiryItem, Update) => Any,
            (CostCalculation, Read) => Any,
            (Customer, Read) => Any,
            (User, Read) => Any,
            (Notification, Read | Update) => Owned,
            _ => Denied,
        },

        // Costs the items assigned to them
        Role::Vp => match (resource, action) {
            (Inquiry, Read) => Any,
            (InquiryItem, Read) => Any,
            (InquiryItem, Update) => Owned,
            (CostCalculation, Create) => Owned,
            (CostCalculation, Read) => Owned,
            (Customer, Read) => Any,
            (Notification, Read | Update) => Owned,
            _ => Denied,
        },

        Role::Tech => match (resource, action) {
            (Inquiry | InquiryItem, Read) => Any,
            (Notification, Read | Update) => Owned,
            _ => Denied,
        },
    }
}

/// Convenience wrapper: resolves the scope and applies the ownership bit.
pub fn authorize(
    role: Role,
    resource: Resource,
    action: Action,
    is_owner: bool,
) -> Result<(), AppError> {
    if permission(role, resource, action).allows(is_owner) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_and_superuser_bypass_ownership() {
        for role in [Role::Superuser, Role::Admin] {
            assert_eq!(permission(role, Resource::Inquiry, Action::Delete), Scope::Any);
            assert_eq!(
                permission(role, Resource::CostCalculation, Action::Create),
                Scope::Any
            );
        }
    }

    #[test]
    fn sales_writes_only_own_inquiries() {
        assert_eq!(permission(Role::Sales, Resource::Inquiry, Action::Create), Scope::Any);
        let update = permission(Role::Sales, Resource::Inquiry, Action::Update);
        assert_eq!(update, Scope::Owned);
        assert!(update.allows(true));
        assert!(!update.allows(false));
        assert_eq!(
            permission(Role::Sales, Resource::Approval, Action::Create),
            Scope::Denied
        );
    }

    #[test]
    fn vp_costs_only_assigned_items() {
        let create = permission(Role::Vp, Resource::CostCalculation, Action::Create);
        assert_eq!(create, Scope::Owned);
        assert!(!create.allows(false));
        assert_eq!(
            permission(Role::Vp, Resource::Approval, Action::Create),
            Scope::Denied
        );
    }

    #[test]
    fn vpp_assigns_any_item_but_never_costs() {
        assert_eq!(
            permission(Role::Vpp, Resource::InquiryItem, Action::Update),
            Scope::Any
        );
        assert_eq!(
            permission(Role::Vpp, Resource::CostCalculation, Action::Create),
            Scope::Denied
        );
    }

    #[test]
    fn manager_approves_and_deletes_only_own_inquiries() {
        assert_eq!(permission(Role::Manager, Resource::Approval, Action::Create), Scope::Any);
        let delete = permission(Role::Manager, Resource::Inquiry, Action::Delete);
        assert_eq!(delete, Scope::Owned);
        assert!(delete.allows(true));
        assert!(!delete.allows(false));
        assert_eq!(
            permission(Role::Manager, Resource::InquiryItem, Action::Delete),
            Scope::Denied
        );
    }

    #[test]
    fn tech_is_read_only() {
        assert_eq!(permission(Role::Tech, Resource::Inquiry, Action::Read), Scope::Any);
        for action in [Action::Create, Action::Update, Action::Delete] {
            assert_eq!(permission(Role::Tech, Resource::Inquiry, action), Scope::Denied);
        }
    }
}
