//! Role assignments.
//!
//! An account may hold any number of role rows. Roles are totally ordered
//! (`SuperAdmin > Admin > Moderator > User`) and an account is always treated
//! as holding its highest role; holding no rows means plain `User`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role tag, stored as the Postgres enum `app_role`.
///
/// Variants are declared lowest first so the derived `Ord` is the priority order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "app_role", rename_all = "snake_case")]
pub enum Role {
    User,
    Moderator,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Admins and super admins bypass billing and may manage invitations.
    pub fn is_admin(&self) -> bool {
        *self >= Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest-priority role among `roles`; `User` when there are none.
pub fn highest(roles: &[Role]) -> Role {
    roles.iter().copied().max().unwrap_or(Role::User)
}

/// Response body for `GET /api/v1/roles/me`.
#[derive(Debug, Serialize)]
pub struct RoleSummary {
    pub roles: Vec<Role>,
    pub highest_role: Role,
    pub is_admin: bool,
}

impl RoleSummary {
    pub fn new(mut roles: Vec<Role>) -> Self {
        roles.sort_unstable_by(|a, b| b.cmp(a));
        roles.dedup();
        let highest_role = highest(&roles);
        Self {
            is_admin: highest_role.is_admin(),
            highest_role,
            roles,
        }
    }
}
