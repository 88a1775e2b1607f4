//! Service offering domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::DomainRecord;

/// A bookable service on the business's menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    /// Profile that offers this service.
    pub profile_id: Option<Uuid>,
    pub name: String,
    pub duration_minutes: u32,
    /// Price in the smallest currency unit.
    pub price_cents: i64,
    #[serde(default)]
    pub description: Option<String>,
    /// Inactive services stay on record but cannot be booked.
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl DomainRecord for ServiceOffering {
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
