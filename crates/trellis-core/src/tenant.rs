//! Tenant visibility and mutation predicates.
//!
//! Pure functions deciding whether a record is visible to a session and
//! whether the session may mutate it. The backend applies its own scoping
//! server-side, but that scoping is advisory: these predicates are the
//! authoritative client-side enforcement, applied to bulk-load results and
//! to every incoming change event before merge.

use crate::domain::DomainRecord;
use crate::session::{AccountMode, Role, Session};

/// A mutating action a session can request on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Update,
    Delete,
}

impl RecordAction {
    /// Lowercase verb for error messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordAction::Update => "update",
            RecordAction::Delete => "delete",
        }
    }
}

/// Returns true when `record` is visible to `session`.
///
/// Team mode: the record's tenant must equal the session's tenant.
/// Single mode: the record's owner must equal the session's profile.
/// A missing field on either side fails the check; two absent ids never
/// compare equal.
pub fn visible<T: DomainRecord>(session: &Session, record: &T) -> bool {
    match session.mode {
        AccountMode::Team => match (session.tenant_id, record.tenant_id()) {
            (Some(session_tenant), Some(record_tenant)) => session_tenant == record_tenant,
            _ => false,
        },
        AccountMode::Single => match (session.profile_id, record.owner_id()) {
            (Some(session_profile), Some(record_owner)) => session_profile == record_owner,
            _ => false,
        },
    }
}

/// Returns true when `session` may apply `action` to `record`.
///
/// The acting profile must own the record, or the session must be a team
/// manager within the record's tenant. The rule is currently identical for
/// updates and deletes; the action is part of the contract so call sites
/// stay explicit about what they are gating.
pub fn may_mutate<T: DomainRecord>(session: &Session, record: &T, _action: RecordAction) -> bool {
    if !session.is_active() {
        return false;
    }

    let owns = match (session.profile_id, record.owner_id()) {
        (Some(session_profile), Some(record_owner)) => session_profile == record_owner,
        _ => false,
    };
    if owns {
        return true;
    }

    session.mode == AccountMode::Team
        && session.role == Role::Manager
        && matches!(
            (session.tenant_id, record.tenant_id()),
            (Some(session_tenant), Some(record_tenant)) if session_tenant == record_tenant
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::domain::Client;

    fn client(tenant_id: Option<Uuid>, profile_id: Option<Uuid>) -> Client {
        let now = Utc::now();
        Client {
            id: Uuid::new_v4(),
            tenant_id,
            profile_id,
            full_name: "Dana Fields".to_string(),
            email: None,
            phone: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn team_session(tenant_id: Uuid, role: Role) -> Session {
        Session {
            is_authenticated: true,
            user_id: Some(Uuid::new_v4()),
            profile_id: Some(Uuid::new_v4()),
            mode: AccountMode::Team,
            tenant_id: Some(tenant_id),
            role,
        }
    }

    fn single_session(profile_id: Uuid) -> Session {
        Session {
            is_authenticated: true,
            user_id: Some(Uuid::new_v4()),
            profile_id: Some(profile_id),
            mode: AccountMode::Single,
            tenant_id: None,
            role: Role::Member,
        }
    }

    #[test]
    fn test_team_visibility_requires_matching_tenant() {
        let tenant = Uuid::new_v4();
        let session = team_session(tenant, Role::Member);

        assert!(visible(&session, &client(Some(tenant), None)));
        assert!(!visible(&session, &client(Some(Uuid::new_v4()), None)));
        assert!(!visible(&session, &client(None, session.profile_id)));
    }

    #[test]
    fn test_single_visibility_requires_matching_owner() {
        let profile = Uuid::new_v4();
        let session = single_session(profile);

        assert!(visible(&session, &client(None, Some(profile))));
        assert!(!visible(&session, &client(None, Some(Uuid::new_v4()))));
        assert!(!visible(&session, &client(None, None)));
    }

    #[test]
    fn test_missing_session_tenant_fails_visibility() {
        let mut session = team_session(Uuid::new_v4(), Role::Member);
        session.tenant_id = None;
        assert!(!visible(&session, &client(None, None)));
    }

    #[test]
    fn test_owner_may_mutate() {
        let profile = Uuid::new_v4();
        let session = single_session(profile);
        let record = client(None, Some(profile));

        assert!(may_mutate(&session, &record, RecordAction::Update));
        assert!(may_mutate(&session, &record, RecordAction::Delete));
    }

    #[test]
    fn test_team_member_may_not_mutate_foreign_record() {
        let tenant = Uuid::new_v4();
        let session = team_session(tenant, Role::Member);
        let record = client(Some(tenant), Some(Uuid::new_v4()));

        assert!(!may_mutate(&session, &record, RecordAction::Update));
    }

    #[test]
    fn test_team_manager_may_mutate_within_tenant() {
        let tenant = Uuid::new_v4();
        let session = team_session(tenant, Role::Manager);
        let record = client(Some(tenant), Some(Uuid::new_v4()));

        assert!(may_mutate(&session, &record, RecordAction::Delete));
    }

    #[test]
    fn test_manager_of_other_tenant_may_not_mutate() {
        let session = team_session(Uuid::new_v4(), Role::Manager);
        let record = client(Some(Uuid::new_v4()), Some(Uuid::new_v4()));

        assert!(!may_mutate(&session, &record, RecordAction::Update));
    }

    #[test]
    fn test_unauthenticated_session_may_not_mutate() {
        let record = client(None, None);
        assert!(!may_mutate(
            &Session::unauthenticated(),
            &record,
            RecordAction::Update
        ));
    }
}
