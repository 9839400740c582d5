use crate::models::AppState;
use axum::Router;

pub mod appointment_routes;
pub mod auth_routes;
pub mod formula_routes;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1/auth", auth_routes::router())
        .nest("/api/v1/formulas", formula_routes::router())
        .nest("/api/v1/appointments", appointment_routes::router())
        .with_state(state)
}
