use std::sync::Arc;

use uuid::Uuid;

use crate::scheduling::error::SchedulingError;
use crate::scheduling::model::{Appointment, AppointmentFilter, AppointmentStatus, Principal};
use crate::scheduling::store::AppointmentStore;

/// Read side: operator listings and the ownership-gated single lookup.
/// All results are materialized vectors; re-requesting is always safe.
pub struct AdminQueryService {
    store: Arc<dyn AppointmentStore>,
}

impl AdminQueryService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// Admin-only filtered listing, ordered (date asc, start asc). A date
    /// filter matches the full UTC calendar day.
    pub async fn list_all(
        &self,
        caller: &Principal,
        filter: AppointmentFilter,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        if !caller.is_admin() {
            return Err(SchedulingError::Forbidden(
                "only admins may list all appointments",
            ));
        }
        self.store.list(&filter).await
    }

    /// A client's own appointments, newest first.
    pub async fn list_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.store.find_by_client(client_id).await
    }

    /// A client's completed appointments, newest first.
    pub async fn history_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let mut appointments = self.store.find_by_client(client_id).await?;
        appointments.retain(|a| a.status == AppointmentStatus::Completed);
        Ok(appointments)
    }

    /// Single lookup: the owner or any admin, everyone else is refused.
    pub async fn get(
        &self,
        id: Uuid,
        caller: &Principal,
    ) -> Result<Appointment, SchedulingError> {
        let appointment = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound)?;

        if !caller.is_admin() && appointment.client_id != caller.id {
            return Err(SchedulingError::Forbidden(
                "you are not allowed to view this appointment",
            ));
        }
        Ok(appointment)
    }
}
