use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::scheduling::availability::AvailabilityChecker;
use crate::scheduling::catalog::ServiceCatalog;
use crate::scheduling::clock::Clock;
use crate::scheduling::error::SchedulingError;
use crate::scheduling::lifecycle;
use crate::scheduling::model::{Appointment, AppointmentPatch, AppointmentStatus, Principal};
use crate::scheduling::store::AppointmentStore;

/// Update, cancel and status-transition entry points. Lifecycle and
/// authorization rules are enforced here, never in the HTTP handlers.
pub struct ManagementService {
    store: Arc<dyn AppointmentStore>,
    catalog: Arc<dyn ServiceCatalog>,
    clock: Arc<dyn Clock>,
    availability: AvailabilityChecker,
    write_lock: Arc<Mutex<()>>,
}

impl ManagementService {
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

    /// Admin-only partial update. A change to the date or either time
    /// re-validates availability, excluding the appointment itself, so
    /// rescheduling cannot create an overlap through the edit path.
    pub async fn update_appointment(
        &self,
        id: Uuid,
        caller: &Principal,
        patch: AppointmentPatch,
    ) -> Result<Appointment, SchedulingError> {
        if !caller.is_admin() {
            return Err(SchedulingError::Forbidden(
                "only admins may update appointments",
            ));
        }

        let _guard = self.write_lock.lock().await;
        let mut appointment = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound)?;

        if let Some(formula_id) = patch.formula_id {
            self.catalog
                .resolve(formula_id)
                .await?
                .ok_or(SchedulingError::FormulaNotFound)?;
            appointment.formula_id = formula_id;
        }

        let mut rescheduled = false;
        if let Some(new_date) = patch.date {
            rescheduled |= new_date != appointment.date;
            appointment.date = new_date;
        }
        if let Some(raw) = &patch.start_time {
            let start = raw.parse()?;
            rescheduled |= start != appointment.start_time;
            appointment.start_time = start;
        }
        if let Some(raw) = &patch.end_time {
            let end = raw.parse()?;
            rescheduled |= end != appointment.end_time;
            appointment.end_time = end;
        }
        // Post-patch invariant: whichever of the two was supplied, the
        // resulting interval must still be valid.
        if appointment.end_time <= appointment.start_time {
            return Err(SchedulingError::InvalidInterval);
        }
        if rescheduled
            && !self
                .availability
                .is_available(
                    appointment.date,
                    appointment.start_time,
                    appointment.end_time,
                    Some(id),
                )
                .await?
        {
            return Err(SchedulingError::SlotConflict);
        }

        if let Some(raw) = &patch.status {
            let next: AppointmentStatus = raw
                .parse()
                .map_err(|()| SchedulingError::InvalidStatus(raw.clone()))?;
            lifecycle::authorize_transition(&appointment, next, caller, self.clock.now())?;
            appointment.status = next;
        }
        if let Some(notes) = patch.admin_notes {
            appointment.admin_notes = Some(notes);
        }
        if let Some(reason) = patch.cancellation_reason {
            appointment.cancellation_reason = Some(reason);
        }

        appointment.processed_by = Some(caller.id);
        appointment.updated_at = self.clock.now();
        self.store.update(&appointment).await?;

        tracing::info!(appointment = %id, admin = %caller.id, "appointment updated");
        Ok(appointment)
    }

    /// Owner-or-admin cancellation. Clients may only cancel future,
    /// non-terminal appointments; admins may cancel regardless of time.
    pub async fn cancel_appointment(
        &self,
        id: Uuid,
        caller: &Principal,
        reason: Option<String>,
    ) -> Result<Appointment, SchedulingError> {
        let _guard = self.write_lock.lock().await;
        let mut appointment = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound)?;

        lifecycle::authorize_transition(
            &appointment,
            AppointmentStatus::Cancelled,
            caller,
            self.clock.now(),
        )?;

        // Only admins reach this point with an already-cancelled
        // appointment; re-cancelling is a no-op.
        if appointment.status == AppointmentStatus::Cancelled {
            return Ok(appointment);
        }

        appointment.status = AppointmentStatus::Cancelled;
        if let Some(reason) = reason {
            appointment.cancellation_reason = Some(reason);
        }
        if caller.is_admin() {
            appointment.processed_by = Some(caller.id);
        }
        appointment.updated_at = self.clock.now();
        self.store.update(&appointment).await?;

        tracing::info!(appointment = %id, caller = %caller.id, "appointment cancelled");
        Ok(appointment)
    }

    /// Admin-only direct status transition, with optional note update.
    pub async fn set_status(
        &self,
        id: Uuid,
        caller: &Principal,
        status: &str,
        admin_notes: Option<String>,
    ) -> Result<Appointment, SchedulingError> {
        if !caller.is_admin() {
            return Err(SchedulingError::Forbidden(
                "only admins may change appointment status",
            ));
        }
        let next: AppointmentStatus = status
            .parse()
            .map_err(|()| SchedulingError::InvalidStatus(status.to_string()))?;

        let _guard = self.write_lock.lock().await;
        let mut appointment = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound)?;

        lifecycle::authorize_transition(&appointment, next, caller, self.clock.now())?;

        // Re-applying the current terminal status is a no-op: nothing is
        // persisted, processed_by and updated_at keep their values.
        if next == appointment.status && next.is_terminal() {
            return Ok(appointment);
        }

        appointment.status = next;
        if let Some(notes) = admin_notes {
            appointment.admin_notes = Some(notes);
        }
        appointment.processed_by = Some(caller.id);
        appointment.updated_at = self.clock.now();
        self.store.update(&appointment).await?;

        tracing::info!(appointment = %id, status = %next, admin = %caller.id, "status set");
        Ok(appointment)
    }
}
