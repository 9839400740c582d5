// src/routes/appointment_routes.rs

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::AppState,
    scheduling::{
        Appointment, AppointmentFilter, AppointmentPatch, BookingRequest, SchedulingError,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_appointment))
        .route("/my", get(list_my_appointments))
        .route("/history", get(list_my_history))
        .route("/admin", get(list_all_appointments))
        .route("/{appointment_id}", get(get_appointment))
        .route("/{appointment_id}", put(update_appointment))
        .route("/{appointment_id}/cancel", put(cancel_appointment))
        .route("/{appointment_id}/status", put(set_status))
}

#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub data: T,
}

/* ============================================================
   POST / (client booking)
   ============================================================ */

pub async fn create_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<BookingRequest>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    let appointment = state
        .booking
        .create_appointment(auth.principal.id, req)
        .await?;
    Ok(Json(ApiOk { data: appointment }))
}

/* ============================================================
   GET /my and GET /history (client listings)
   ============================================================ */

pub async fn list_my_appointments(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<Vec<Appointment>>>, ApiError> {
    let appointments = state.queries.list_for_client(auth.principal.id).await?;
    Ok(Json(ApiOk { data: appointments }))
}

pub async fn list_my_history(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<Vec<Appointment>>>, ApiError> {
    let appointments = state.queries.history_for_client(auth.principal.id).await?;
    Ok(Json(ApiOk { data: appointments }))
}

/* ============================================================
   GET /admin (filtered listing)
   ============================================================ */

// Parameters arrive as raw strings so a malformed value gets the JSON
// error envelope instead of axum's plain-text Query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    pub status: Option<String>,
    pub date: Option<String>,
    pub client: Option<String>,
}

fn admin_filter(q: AdminListQuery) -> Result<AppointmentFilter, ApiError> {
    let status = q
        .status
        .map(|raw| {
            raw.parse()
                .map_err(|()| ApiError::from(SchedulingError::InvalidStatus(raw)))
        })
        .transpose()?;
    let date = q
        .date
        .map(|raw| {
            raw.parse::<NaiveDate>().map_err(|_| {
                ApiError::BadRequest(
                    "VALIDATION_ERROR",
                    format!("invalid date `{raw}` (expected YYYY-MM-DD)"),
                )
            })
        })
        .transpose()?;
    let client_id = q
        .client
        .map(|raw| {
            Uuid::parse_str(&raw).map_err(|_| {
                ApiError::BadRequest("VALIDATION_ERROR", format!("invalid client id `{raw}`"))
            })
        })
        .transpose()?;

    Ok(AppointmentFilter {
        status,
        date,
        client_id,
    })
}

pub async fn list_all_appointments(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(q): Query<AdminListQuery>,
) -> Result<Json<ApiOk<Vec<Appointment>>>, ApiError> {
    let filter = admin_filter(q)?;
    let appointments = state.queries.list_all(&auth.principal, filter).await?;
    Ok(Json(ApiOk { data: appointments }))
}

/* ============================================================
   GET /{id} (owner or admin)
   ============================================================ */

pub async fn get_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    let appointment = state.queries.get(appointment_id, &auth.principal).await?;
    Ok(Json(ApiOk { data: appointment }))
}

/* ============================================================
   PUT /{id} (admin partial update)
   ============================================================ */

pub async fn update_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
    Json(patch): Json<AppointmentPatch>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    let appointment = state
        .management
        .update_appointment(appointment_id, &auth.principal, patch)
        .await?;
    Ok(Json(ApiOk { data: appointment }))
}

/* ============================================================
   PUT /{id}/cancel (owner or admin)
   ============================================================ */

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub cancellation_reason: Option<String>,
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
    body: Option<Json<CancelRequest>>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    let reason = body.and_then(|Json(req)| req.cancellation_reason);
    let appointment = state
        .management
        .cancel_appointment(appointment_id, &auth.principal, reason)
        .await?;
    Ok(Json(ApiOk { data: appointment }))
}

/* ============================================================
   PUT /{id}/status (admin)
   ============================================================ */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub status: Option<String>,
    pub admin_notes: Option<String>,
}

pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<ApiOk<Appointment>>, ApiError> {
    let status = req
        .status
        .ok_or(SchedulingError::MissingField("status"))?;
    let appointment = state
        .management
        .set_status(appointment_id, &auth.principal, &status, req.admin_notes)
        .await?;
    Ok(Json(ApiOk { data: appointment }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::AppointmentStatus;

    #[test]
    fn admin_filter_parses_valid_parameters() {
        let id = Uuid::new_v4();
        let filter = admin_filter(AdminListQuery {
            status: Some("confirmed".into()),
            date: Some("2025-03-10".into()),
            client: Some(id.to_string()),
        })
        .unwrap();

        assert_eq!(filter.status, Some(AppointmentStatus::Confirmed));
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2025, 3, 10));
        assert_eq!(filter.client_id, Some(id));

        let empty = admin_filter(AdminListQuery::default()).unwrap();
        assert_eq!(empty.status, None);
        assert_eq!(empty.date, None);
        assert_eq!(empty.client_id, None);
    }

    #[test]
    fn admin_filter_maps_malformed_parameters_to_bad_request() {
        let err = admin_filter(AdminListQuery {
            date: Some("10/03/2025".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest("VALIDATION_ERROR", _)));

        let err = admin_filter(AdminListQuery {
            client: Some("not-a-uuid".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest("VALIDATION_ERROR", _)));

        let err = admin_filter(AdminListQuery {
            status: Some("done".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest("INVALID_STATUS", _)));
    }
}
