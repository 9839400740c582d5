use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::scheduling::error::SchedulingError;
use crate::scheduling::model::AppointmentStatus;
use crate::scheduling::store::AppointmentStore;
use crate::scheduling::time_of_day::TimeOfDay;

/// Half-open interval overlap: `[s1,e1)` and `[s2,e2)` share an instant iff
/// `s1 < e2 && s2 < e1`. Covers partial overlap, containment and exact
/// duplication; back-to-back intervals do not overlap.
pub fn intervals_overlap(s1: TimeOfDay, e1: TimeOfDay, s2: TimeOfDay, e2: TimeOfDay) -> bool {
    s1 < e2 && s2 < e1
}

/// Read-only slot-conflict check against the appointment store.
pub struct AvailabilityChecker {
    store: Arc<dyn AppointmentStore>,
}

impl AvailabilityChecker {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// True when no non-cancelled appointment on `date` overlaps the
    /// candidate interval. `exclude` skips an appointment being edited so
    /// it does not conflict with itself.
    pub async fn is_available(
        &self,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
        exclude: Option<Uuid>,
    ) -> Result<bool, SchedulingError> {
        let existing = self.store.find_by_date(date).await?;

        let conflict = existing.iter().find(|a| {
            a.status != AppointmentStatus::Cancelled
                && Some(a.appointment_id) != exclude
                && intervals_overlap(start, end, a.start_time, a.end_time)
        });

        if let Some(other) = conflict {
            tracing::debug!(
                date = %date,
                candidate = %format_args!("{start}-{end}"),
                blocking = %other.appointment_id,
                "slot conflict"
            );
            return Ok(false);
        }
        Ok(true)
    }
}
