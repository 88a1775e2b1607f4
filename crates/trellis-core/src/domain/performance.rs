//! Performance entry domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::DomainRecord;

/// A daily performance roll-up for one staff profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub profile_id: Option<Uuid>,
    /// Business day the entry covers.
    pub recorded_on: NaiveDate,
    pub revenue_cents: i64,
    pub appointment_count: u32,
    pub new_client_count: u32,
    pub created_at: DateTime<Utc>,
}

impl DomainRecord for PerformanceEntry {
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
