// src/routes/formula_routes.rs

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::AppState,
    scheduling::{SchedulingError, ServiceOffering},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_formulas))
        .route("/{formula_id}", get(get_formula))
}

pub async fn list_formulas(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<ServiceOffering>>, ApiError> {
    let offerings = state.catalog.list_active().await?;
    Ok(Json(offerings))
}

pub async fn get_formula(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(formula_id): Path<Uuid>,
) -> Result<Json<ServiceOffering>, ApiError> {
    let offering = state
        .catalog
        .resolve(formula_id)
        .await?
        .ok_or(SchedulingError::FormulaNotFound)?;
    Ok(Json(offering))
}
