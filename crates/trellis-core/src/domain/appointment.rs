//! Appointment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::DomainRecord;

/// Lifecycle status of a booked appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

/// A booked appointment between a client and a staff profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    /// Tenant the appointment belongs to (team accounts).
    pub tenant_id: Option<Uuid>,
    /// Staff profile the appointment is booked with.
    pub profile_id: Option<Uuid>,
    /// The client being served.
    pub client_id: Uuid,
    /// The service being performed, when one was picked at booking time.
    pub service_id: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainRecord for Appointment {
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
