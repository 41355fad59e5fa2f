//! Role directory loaded from environment variables.
//!
//! Maps Discord user IDs to storefront roles. `ADMIN_USER_IDS` and
//! `CASHIER_USER_IDS` hold comma-separated IDs; anyone not listed is treated
//! as a customer. An ID listed in both gets the admin role.

use crate::entities::Role;
use std::collections::HashSet;

/// Discord user IDs grouped by staff role
#[derive(Debug, Clone, Default)]
pub struct RoleDirectory {
    admins: HashSet<u64>,
    cashiers: HashSet<u64>,
}

fn parse_ids(raw: &str) -> HashSet<u64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}

impl RoleDirectory {
    /// Builds a directory from comma-separated ID lists. Entries that are not
    /// valid IDs are skipped.
    #[must_use]
    pub fn from_lists(admins: &str, cashiers: &str) -> Self {
        Self {
            admins: parse_ids(admins),
            cashiers: parse_ids(cashiers),
        }
    }

    /// Reads `ADMIN_USER_IDS` and `CASHIER_USER_IDS` from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let admins = std::env::var("ADMIN_USER_IDS").unwrap_or_default();
        let cashiers = std::env::var("CASHIER_USER_IDS").unwrap_or_default();
        Self::from_lists(&admins, &cashiers)
    }

    /// Role of the given Discord user.
    #[must_use]
    pub fn role_for(&self, user_id: u64) -> Role {
        if self.admins.contains(&user_id) {
            Role::Admin
        } else if self.cashiers.contains(&user_id) {
            Role::Cashier
        } else {
            Role::Customer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_for_listed_and_unlisted_users() {
        let directory = RoleDirectory::from_lists("1, 2", "3,not-a-number,");
        assert_eq!(directory.role_for(1), Role::Admin);
        assert_eq!(directory.role_for(2), Role::Admin);
        assert_eq!(directory.role_for(3), Role::Cashier);
        assert_eq!(directory.role_for(4), Role::Customer);
    }

    #[test]
    fn test_admin_wins_over_cashier() {
        let directory = RoleDirectory::from_lists("7", "7");
        assert_eq!(directory.role_for(7), Role::Admin);
    }

    #[test]
    fn test_empty_directory_treats_everyone_as_customer() {
        let directory = RoleDirectory::default();
        assert_eq!(directory.role_for(42), Role::Customer);
    }
}
