use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::scheduling::availability::AvailabilityChecker;
use crate::scheduling::catalog::ServiceCatalog;
use crate::scheduling::clock::Clock;
use crate::scheduling::error::SchedulingError;
use crate::scheduling::model::{Appointment, AppointmentStatus, BookingRequest};
use crate::scheduling::store::AppointmentStore;
use crate::scheduling::time_of_day::TimeOfDay;

/// Creates new appointments. Validation is fail-fast: the first failing
/// check wins, in the order required fields, formula, past date, past
/// start time (same-day only), interval, availability.
pub struct BookingService {
    store: Arc<dyn AppointmentStore>,
    catalog: Arc<dyn ServiceCatalog>,
    clock: Arc<dyn Clock>,
    availability: AvailabilityChecker,
    // Serializes the check-then-insert section with ManagementService so
    // two concurrent requests cannot both see a free slot.
    write_lock: Arc<Mutex<()>>,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        catalog: Arc<dyn ServiceCatalog>,
        clock: Arc<dyn Clock>,
        write_lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            availability: AvailabilityChecker::new(store.clone()),
            store,
            catalog,
            clock,
            write_lock,
        }
    }

    pub async fn create_appointment(
        &self,
        client_id: Uuid,
        req: BookingRequest,
    ) -> Result<Appointment, SchedulingError> {
        let date = req.date.ok_or(SchedulingError::MissingField("date"))?;
        let start_raw = req
            .start_time
            .ok_or(SchedulingError::MissingField("startTime"))?;
        let end_raw = req
            .end_time
            .ok_or(SchedulingError::MissingField("endTime"))?;
        let formula_id = req
            .formula_id
            .ok_or(SchedulingError::MissingField("formulaId"))?;

        self.catalog
            .resolve(formula_id)
            .await?
            .ok_or(SchedulingError::FormulaNotFound)?;

        let now = self.clock.now();
        if date < now.date_naive() {
            return Err(SchedulingError::PastDate);
        }

        let start: TimeOfDay = start_raw.parse()?;
        if date == now.date_naive() && start <= TimeOfDay::from_datetime(&now) {
            return Err(SchedulingError::PastStartTime);
        }

        let end: TimeOfDay = end_raw.parse()?;
        if end <= start {
            return Err(SchedulingError::InvalidInterval);
        }

        let _guard = self.write_lock.lock().await;
        if !self.availability.is_available(date, start, end, None).await? {
            return Err(SchedulingError::SlotConflict);
        }

        let appointment = Appointment {
            appointment_id: Uuid::new_v4(),
            client_id,
            formula_id,
            date,
            start_time: start,
            end_time: end,
            status: AppointmentStatus::Pending,
            cancellation_reason: None,
            admin_notes: None,
            processed_by: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(&appointment).await?;

        tracing::info!(
            appointment = %appointment.appointment_id,
            client = %client_id,
            date = %date,
            slot = %format_args!("{start}-{end}"),
            "appointment booked"
        );
        Ok(appointment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::testsupport::{date, engine, request, time, Engine};

    // Fixture clock is pinned to 2025-03-01T12:00:00Z in `engine()`.

    #[tokio::test]
    async fn books_a_free_slot_as_pending() {
        let Engine { booking, store, catalog, .. } = engine();
        let client = Uuid::new_v4();

        let appointment = booking
            .create_appointment(client, request(date(2025, 3, 10), "09:00", "10:00", catalog.known))
            .await
            .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.client_id, client);
        assert_eq!(appointment.processed_by, None);
        assert_eq!(appointment.start_time, time("09:00"));
        assert_eq!(store.all().len(), 1);
    }

    #[tokio::test]
    async fn rejects_missing_fields_first() {
        let Engine { booking, catalog, .. } = engine();
        let mut req = request(date(2025, 3, 10), "09:00", "10:00", catalog.known);
        req.start_time = None;
        // Even with an unknown formula the missing field wins.
        req.formula_id = Some(Uuid::new_v4());

        let err = booking
            .create_appointment(Uuid::new_v4(), req)
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::MissingField("startTime"));
    }

    #[tokio::test]
    async fn rejects_unknown_formula() {
        let Engine { booking, .. } = engine();
        let req = request(date(2025, 3, 10), "09:00", "10:00", Uuid::new_v4());

        let err = booking
            .create_appointment(Uuid::new_v4(), req)
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::FormulaNotFound);
    }

    #[tokio::test]
    async fn rejects_past_date() {
        let Engine { booking, catalog, .. } = engine();
        let err = booking
            .create_appointment(
                Uuid::new_v4(),
                request(date(2025, 2, 28), "09:00", "10:00", catalog.known),
            )
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::PastDate);
    }

    #[tokio::test]
    async fn same_day_start_must_be_in_the_future() {
        let Engine { booking, catalog, .. } = engine();

        // Clock reads 12:00 on 2025-03-01; 12:00 itself is not "later".
        let err = booking
            .create_appointment(
                Uuid::new_v4(),
                request(date(2025, 3, 1), "12:00", "13:00", catalog.known),
            )
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::PastStartTime);

        assert!(booking
            .create_appointment(
                Uuid::new_v4(),
                request(date(2025, 3, 1), "12:01", "13:00", catalog.known),
            )
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn rejects_inverted_interval() {
        let Engine { booking, catalog, .. } = engine();
        let err = booking
            .create_appointment(
                Uuid::new_v4(),
                request(date(2025, 3, 10), "23:00", "22:00", catalog.known),
            )
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::InvalidInterval);

        let err = booking
            .create_appointment(
                Uuid::new_v4(),
                request(date(2025, 3, 10), "09:00", "09:00", catalog.known),
            )
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::InvalidInterval);
    }

    #[tokio::test]
    async fn rejects_malformed_time() {
        let Engine { booking, catalog, .. } = engine();
        let mut req = request(date(2025, 3, 10), "09:00", "10:00", catalog.known);
        req.end_time = Some("25:99".into());

        let err = booking
            .create_appointment(Uuid::new_v4(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidTime(_)));
    }

    #[tokio::test]
    async fn second_overlapping_booking_conflicts() {
        let Engine { booking, catalog, .. } = engine();
        booking
            .create_appointment(
                Uuid::new_v4(),
                request(date(2025, 3, 10), "09:00", "10:00", catalog.known),
            )
            .await
            .unwrap();

        let err = booking
            .create_appointment(
                Uuid::new_v4(),
                request(date(2025, 3, 10), "09:30", "10:15", catalog.known),
            )
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::SlotConflict);

        // The adjacent slot right after is still free.
        assert!(booking
            .create_appointment(
                Uuid::new_v4(),
                request(date(2025, 3, 10), "10:00", "11:00", catalog.known),
            )
            .await
            .is_ok());
    }
}
