//! Role policy for write operations.
//!
//! Reads are open to every member of the tenant; writes follow the role's
//! area of responsibility. This is enforced at the route boundary, keeping
//! domain and storage auth-agnostic.

use derrick_auth::Role;
use derrick_domain::Collection;

/// Whether a role may create/update/delete records in a collection.
pub fn role_may_write(role: Role, collection: Collection) -> bool {
    match role {
        Role::Admin => true,
        Role::Accountant => matches!(
            collection,
            Collection::Revenue
                | Collection::Expenses
                | Collection::Owners
                | Collection::Distributions
        ),
        Role::Operator => matches!(
            collection,
            Collection::Wells | Collection::Production | Collection::Maintenance
        ),
        Role::Viewer => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_writes_everything() {
        for c in Collection::ALL {
            assert!(role_may_write(Role::Admin, c));
        }
    }

    #[test]
    fn viewer_writes_nothing() {
        for c in Collection::ALL {
            assert!(!role_may_write(Role::Viewer, c));
        }
    }

    #[test]
    fn company_mutation_is_admin_only() {
        assert!(role_may_write(Role::Admin, Collection::Companies));
        assert!(!role_may_write(Role::Accountant, Collection::Companies));
        assert!(!role_may_write(Role::Operator, Collection::Companies));
    }

    #[test]
    fn operational_and_financial_splits() {
        assert!(role_may_write(Role::Operator, Collection::Wells));
        assert!(!role_may_write(Role::Operator, Collection::Revenue));
        assert!(role_may_write(Role::Accountant, Collection::Revenue));
        assert!(!role_may_write(Role::Accountant, Collection::Wells));
    }
}
