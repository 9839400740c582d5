// Appointment scheduling engine: slot-conflict detection, the status
// lifecycle, and the authorization rules for moving an appointment
// between states. Transport-agnostic; the HTTP layer lives in routes/.

pub mod availability;
pub mod booking;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod lifecycle;
pub mod management;
pub mod model;
pub mod queries;
pub mod store;
pub mod time_of_day;

#[cfg(test)]
pub mod testsupport;

pub use availability::AvailabilityChecker;
pub use booking::BookingService;
pub use catalog::{PgServiceCatalog, ServiceCatalog, ServiceOffering};
pub use clock::{Clock, SystemClock};
pub use error::SchedulingError;
pub use management::ManagementService;
pub use model::{
    Appointment, AppointmentFilter, AppointmentPatch, AppointmentStatus, BookingRequest,
    Principal, Role,
};
pub use queries::AdminQueryService;
pub use store::{AppointmentStore, PgAppointmentStore};
pub use time_of_day::TimeOfDay;
