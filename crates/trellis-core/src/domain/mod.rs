//! Domain record models for the six synchronized collections.

mod appointment;
mod calendar;
mod client;
mod performance;
mod record;
mod service_offering;
mod waitlist;

pub use appointment::{Appointment, AppointmentStatus};
pub use calendar::CalendarEntry;
pub use client::Client;
pub use performance::PerformanceEntry;
pub use record::DomainRecord;
pub use service_offering::ServiceOffering;
pub use waitlist::WaitlistEntry;
