//! Session domain model.
//!
//! This module contains the core Session entity that represents
//! the caller's authentication and authorization context.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether the account operates standalone or as part of a team tenant.
///
/// The mode decides which visibility rule applies to records: team accounts
/// share everything under their tenant, single accounts see only records
/// owned by their own profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountMode {
    /// Independent account; records are scoped to the owning profile.
    #[default]
    Single,
    /// Member of a team tenant; records are shared across the tenant.
    Team,
}

/// Authorization role of the session's profile within its tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular team member.
    #[default]
    Member,
    /// Elevated role; may mutate records owned by other tenant members.
    Manager,
}

/// The caller's current authentication/authorization context.
///
/// Invariant: `is_authenticated == true` requires both `user_id` and
/// `profile_id` to be set. Any other combination is corrupted state and is
/// normalized to an unauthenticated session with all identity fields cleared
/// (see [`Session::normalized`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Session {
    /// Whether the caller has an established authenticated identity.
    pub is_authenticated: bool,
    /// Authentication account id, set iff authenticated.
    pub user_id: Option<Uuid>,
    /// Business profile id, set iff authenticated.
    pub profile_id: Option<Uuid>,
    /// Account mode deciding the visibility rule.
    #[serde(default)]
    pub mode: AccountMode,
    /// Tenant id, set for team accounts.
    pub tenant_id: Option<Uuid>,
    /// Role within the tenant.
    #[serde(default)]
    pub role: Role,
}

impl Session {
    /// Returns the canonical unauthenticated session.
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// Returns true when both identity fields are present.
    pub fn identity_complete(&self) -> bool {
        self.user_id.is_some() && self.profile_id.is_some()
    }

    /// Returns true when the session is authenticated with a complete
    /// identity. This is the precondition for bulk loads and channel opens.
    pub fn is_active(&self) -> bool {
        self.is_authenticated && self.identity_complete()
    }

    /// Returns true when the session claims authentication but is missing an
    /// identity field.
    pub fn is_corrupted(&self) -> bool {
        self.is_authenticated && !self.identity_complete()
    }

    /// Normalizes corrupted state to the unauthenticated session; any other
    /// session is returned unchanged.
    pub fn normalized(self) -> Self {
        if self.is_corrupted() {
            Self::unauthenticated()
        } else {
            self
        }
    }
}
