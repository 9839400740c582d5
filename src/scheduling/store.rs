use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::scheduling::error::SchedulingError;
use crate::scheduling::model::{Appointment, AppointmentFilter, AppointmentStatus};
use crate::scheduling::time_of_day::TimeOfDay;

/// Persistence boundary for appointments. The engine only ever talks to
/// this trait; tests run against an in-memory implementation.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// All appointments on the given calendar day, any status.
    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, SchedulingError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, SchedulingError>;

    /// A client's appointments, newest first (date desc, start desc).
    async fn find_by_client(&self, client_id: Uuid)
        -> Result<Vec<Appointment>, SchedulingError>;

    async fn insert(&self, appointment: &Appointment) -> Result<(), SchedulingError>;

    async fn update(&self, appointment: &Appointment) -> Result<(), SchedulingError>;

    /// Filtered listing, oldest first (date asc, start asc).
    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, SchedulingError>;
}

pub struct PgAppointmentStore {
    pool: sqlx::PgPool,
}

impl PgAppointmentStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

const APPOINTMENT_COLUMNS: &str = r#"
    appointment_id,
    client_id,
    formula_id,
    date,
    start_time,
    end_time,
    status,
    cancellation_reason,
    admin_notes,
    processed_by,
    created_at,
    updated_at
"#;

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, SchedulingError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointment
            WHERE date = $1
            ORDER BY start_time ASC
            "#
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.iter().map(appointment_from_row).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, SchedulingError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointment
            WHERE appointment_id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.as_ref().map(appointment_from_row).transpose()
    }

    async fn find_by_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointment
            WHERE client_id = $1
            ORDER BY date DESC, start_time DESC
            "#
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.iter().map(appointment_from_row).collect()
    }

    async fn insert(&self, appointment: &Appointment) -> Result<(), SchedulingError> {
        sqlx::query(
            r#"
            INSERT INTO appointment (
              appointment_id,
              client_id,
              formula_id,
              date,
              start_time,
              end_time,
              status,
              cancellation_reason,
              admin_notes,
              processed_by,
              created_at,
              updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
            "#,
        )
        .bind(appointment.appointment_id)
        .bind(appointment.client_id)
        .bind(appointment.formula_id)
        .bind(appointment.date)
        .bind(appointment.start_time.minutes() as i16)
        .bind(appointment.end_time.minutes() as i16)
        .bind(appointment.status.as_str())
        .bind(appointment.cancellation_reason.as_deref())
        .bind(appointment.admin_notes.as_deref())
        .bind(appointment.processed_by)
        .bind(appointment.created_at)
        .bind(appointment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn update(&self, appointment: &Appointment) -> Result<(), SchedulingError> {
        let res = sqlx::query(
            r#"
            UPDATE appointment
            SET formula_id = $2,
                date = $3,
                start_time = $4,
                end_time = $5,
                status = $6,
                cancellation_reason = $7,
                admin_notes = $8,
                processed_by = $9,
                updated_at = $10
            WHERE appointment_id = $1
            "#,
        )
        .bind(appointment.appointment_id)
        .bind(appointment.formula_id)
        .bind(appointment.date)
        .bind(appointment.start_time.minutes() as i16)
        .bind(appointment.end_time.minutes() as i16)
        .bind(appointment.status.as_str())
        .bind(appointment.cancellation_reason.as_deref())
        .bind(appointment.admin_notes.as_deref())
        .bind(appointment.processed_by)
        .bind(appointment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if res.rows_affected() == 0 {
            return Err(SchedulingError::AppointmentNotFound);
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointment
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::date IS NULL OR date = $2)
              AND ($3::uuid IS NULL OR client_id = $3)
            ORDER BY date ASC, start_time ASC
            "#
        ))
        .bind(filter.status.map(AppointmentStatus::as_str))
        .bind(filter.date)
        .bind(filter.client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.iter().map(appointment_from_row).collect()
    }
}

fn appointment_from_row(row: &PgRow) -> Result<Appointment, SchedulingError> {
    let start_minutes: i16 = row.try_get("start_time").map_err(decode_err)?;
    let end_minutes: i16 = row.try_get("end_time").map_err(decode_err)?;
    let status_raw: String = row.try_get("status").map_err(decode_err)?;

    let start_time = TimeOfDay::from_minutes(start_minutes as u16)
        .ok_or_else(|| SchedulingError::Storage(format!("bad start_time: {start_minutes}")))?;
    let end_time = TimeOfDay::from_minutes(end_minutes as u16)
        .ok_or_else(|| SchedulingError::Storage(format!("bad end_time: {end_minutes}")))?;
    let status = status_raw
        .parse()
        .map_err(|_| SchedulingError::Storage(format!("bad status: {status_raw}")))?;

    Ok(Appointment {
        appointment_id: row.try_get("appointment_id").map_err(decode_err)?,
        client_id: row.try_get("client_id").map_err(decode_err)?,
        formula_id: row.try_get("formula_id").map_err(decode_err)?,
        date: row.try_get("date").map_err(decode_err)?,
        start_time,
        end_time,
        status,
        cancellation_reason: row.try_get("cancellation_reason").map_err(decode_err)?,
        admin_notes: row.try_get("admin_notes").map_err(decode_err)?,
        processed_by: row.try_get("processed_by").map_err(decode_err)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(decode_err)?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(decode_err)?,
    })
}

/// Exclusion/unique violations on the non-cancelled interval constraint are
/// the storage-level backstop for double booking.
fn map_db_err(e: sqlx::Error) -> SchedulingError {
    if let sqlx::Error::Database(db) = &e {
        if matches!(db.code().as_deref(), Some("23P01") | Some("23505")) {
            return SchedulingError::SlotConflict;
        }
    }
    SchedulingError::Storage(format!("db error: {e}"))
}

fn decode_err(e: sqlx::Error) -> SchedulingError {
    SchedulingError::Storage(format!("row decode error: {e}"))
}
