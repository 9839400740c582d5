//! In-memory collaborators and fixtures shared by the scheduling tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::scheduling::booking::BookingService;
use crate::scheduling::catalog::{ServiceCatalog, ServiceOffering};
use crate::scheduling::clock::Clock;
use crate::scheduling::error::SchedulingError;
use crate::scheduling::management::ManagementService;
use crate::scheduling::model::{
    Appointment, AppointmentFilter, AppointmentStatus, BookingRequest, Principal, Role,
};
use crate::scheduling::queries::AdminQueryService;
use crate::scheduling::store::AppointmentStore;
use crate::scheduling::time_of_day::TimeOfDay;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

pub fn client() -> Principal {
    Principal {
        id: Uuid::new_v4(),
        role: Role::Client,
    }
}

pub fn admin() -> Principal {
    Principal {
        id: Uuid::new_v4(),
        role: Role::Admin,
    }
}

/// Pending appointment on `day` over `[start, end)` for a fresh client.
pub fn appointment_on(day: NaiveDate, start: &str, end: &str) -> Appointment {
    let created = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    Appointment {
        appointment_id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        formula_id: Uuid::new_v4(),
        date: day,
        start_time: time(start),
        end_time: time(end),
        status: AppointmentStatus::Pending,
        cancellation_reason: None,
        admin_notes: None,
        processed_by: None,
        created_at: created,
        updated_at: created,
    }
}

pub fn request(
    day: NaiveDate,
    start: &str,
    end: &str,
    formula_id: Uuid,
) -> BookingRequest {
    BookingRequest {
        date: Some(day),
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        formula_id: Some(formula_id),
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(rfc3339: &str) -> Self {
        Self(
            DateTime::parse_from_rfc3339(rfc3339)
                .unwrap()
                .with_timezone(&Utc),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Vec-backed store obeying the ordering contracts of `AppointmentStore`.
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<Vec<Appointment>>,
}

impl InMemoryStore {
    pub fn with(rows: Vec<Appointment>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub fn all(&self) -> Vec<Appointment> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, SchedulingError> {
        let mut out: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.date == date)
            .cloned()
            .collect();
        out.sort_by_key(|a| a.start_time);
        Ok(out)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, SchedulingError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.appointment_id == id)
            .cloned())
    }

    async fn find_by_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let mut out: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.client_id == client_id)
            .cloned()
            .collect();
        out.sort_by_key(|a| std::cmp::Reverse((a.date, a.start_time)));
        Ok(out)
    }

    async fn insert(&self, appointment: &Appointment) -> Result<(), SchedulingError> {
        self.rows.lock().unwrap().push(appointment.clone());
        Ok(())
    }

    async fn update(&self, appointment: &Appointment) -> Result<(), SchedulingError> {
        let mut rows = self.rows.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|a| a.appointment_id == appointment.appointment_id)
            .ok_or(SchedulingError::AppointmentNotFound)?;
        *slot = appointment.clone();
        Ok(())
    }

    async fn list(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let mut out: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .filter(|a| filter.date.is_none_or(|d| a.date == d))
            .filter(|a| filter.client_id.is_none_or(|c| a.client_id == c))
            .cloned()
            .collect();
        out.sort_by_key(|a| (a.date, a.start_time));
        Ok(out)
    }
}

/// Catalog with exactly one resolvable formula, exposed as `known`.
pub struct StaticCatalog {
    pub known: Uuid,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self {
            known: Uuid::new_v4(),
        }
    }
}

#[async_trait]
impl ServiceCatalog for StaticCatalog {
    async fn resolve(
        &self,
        formula_id: Uuid,
    ) -> Result<Option<ServiceOffering>, SchedulingError> {
        if formula_id == self.known {
            Ok(Some(ServiceOffering {
                formula_id,
                title: "Soin visage".into(),
                price_cents: 4500,
                duration_min: Some(60),
            }))
        } else {
            Ok(None)
        }
    }

    async fn list_active(&self) -> Result<Vec<ServiceOffering>, SchedulingError> {
        Ok(vec![ServiceOffering {
            formula_id: self.known,
            title: "Soin visage".into(),
            price_cents: 4500,
            duration_min: Some(60),
        }])
    }
}

/// Fully wired engine over in-memory collaborators, clock pinned to
/// 2025-03-01T12:00:00Z.
pub struct Engine {
    pub store: Arc<InMemoryStore>,
    pub catalog: Arc<StaticCatalog>,
    pub booking: BookingService,
    pub management: ManagementService,
    pub queries: AdminQueryService,
}

pub fn engine() -> Engine {
    engine_at("2025-03-01T12:00:00Z")
}

pub fn engine_at(now: &str) -> Engine {
    let store = Arc::new(InMemoryStore::default());
    let catalog = Arc::new(StaticCatalog::new());
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::at(now));
    let write_lock = Arc::new(tokio::sync::Mutex::new(()));

    Engine {
        booking: BookingService::new(
            store.clone(),
            catalog.clone(),
            clock.clone(),
            write_lock.clone(),
        ),
        management: ManagementService::new(
            store.clone(),
            catalog.clone(),
            clock.clone(),
            write_lock,
        ),
        queries: AdminQueryService::new(store.clone()),
        store,
        catalog,
    }
}
