//! Waitlist entry domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::DomainRecord;

/// A client waiting for an opening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub profile_id: Option<Uuid>,
    pub client_id: Uuid,
    #[serde(default)]
    pub service_id: Option<Uuid>,
    /// Preferred date, when the client stated one.
    #[serde(default)]
    pub requested_date: Option<NaiveDate>,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DomainRecord for WaitlistEntry {
    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }

    fn owner_id(&self) -> Option<Uuid> {
        self.profile_id
    }
}
