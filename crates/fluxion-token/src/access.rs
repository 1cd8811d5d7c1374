// crates/fluxion-token/src/access.rs
//
// Role-based access control for privileged ledger operations.
//
// Roles are a flat tagged set, not a hierarchy: holding Admin does not imply
// Minter. The genesis admin is granted every role explicitly. Admin is
// self-referential: Admin holders grant and revoke every role, including
// Admin itself, but the last Admin can never be removed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use fluxion_core::{Address, LedgerError, LedgerResult};

/// Privileged roles on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Grants and revokes roles; updates governance parameters and reward
    /// rate; creates and revokes vesting schedules.
    Admin,
    /// Mints new supply up to the cap.
    Minter,
    /// Burns supply.
    Burner,
    /// Flips the pause switch.
    Pauser,
    /// Manages the treasury address, fee rate, fee exemptions and fee
    /// distribution.
    Treasury,
    /// Manages blacklist, whitelist and transfer limits.
    Compliance,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Minter,
        Role::Burner,
        Role::Pauser,
        Role::Treasury,
        Role::Compliance,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN_ROLE"),
            Role::Minter => write!(f, "MINTER_ROLE"),
            Role::Burner => write!(f, "BURNER_ROLE"),
            Role::Pauser => write!(f, "PAUSER_ROLE"),
            Role::Treasury => write!(f, "TREASURY_ROLE"),
            Role::Compliance => write!(f, "COMPLIANCE_ROLE"),
        }
    }
}

/// Maps each role to the set of addresses holding it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleRegistry {
    assignments: HashMap<Role, BTreeSet<Address>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an address holds a role.
    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.assignments
            .get(&role)
            .map(|set| set.contains(account))
            .unwrap_or(false)
    }

    /// Fail with `Unauthorized` unless `account` holds `role`.
    pub fn require_role(&self, account: &Address, role: Role) -> LedgerResult<()> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                account: *account,
                role: role.to_string(),
            })
        }
    }

    /// Add an address to a role. Returns `true` if it was newly added.
    ///
    /// Unchecked; callers gate this behind `require_role(.., Role::Admin)`.
    pub fn grant(&mut self, role: Role, account: Address) -> bool {
        self.assignments.entry(role).or_default().insert(account)
    }

    /// Remove an address from a role. Returns `true` if it held the role.
    ///
    /// # Errors
    /// Returns `LedgerError::LastAdmin` when removing the only Admin.
    pub fn revoke(&mut self, role: Role, account: &Address) -> LedgerResult<bool> {
        if role == Role::Admin
            && self.has_role(Role::Admin, account)
            && self.members(Role::Admin).count() == 1
        {
            return Err(LedgerError::LastAdmin);
        }
        Ok(self
            .assignments
            .get_mut(&role)
            .map(|set| set.remove(account))
            .unwrap_or(false))
    }

    /// All holders of a role, in address order.
    pub fn members(&self, role: Role) -> impl Iterator<Item = &Address> {
        self.assignments.get(&role).into_iter().flatten()
    }

    /// All roles held by an address.
    pub fn roles_of(&self, account: &Address) -> Vec<Role> {
        Role::ALL
            .iter()
            .copied()
            .filter(|role| self.has_role(*role, account))
            .collect()
    }
}
