mod auth;
mod config;
mod identity;
mod middleware;

mod db;
mod error;
mod models;
mod routes;
mod scheduling;

use std::sync::Arc;

use crate::{config::Config, models::AppState};
use crate::identity::PgIdentityProvider;
use crate::scheduling::{
    AdminQueryService, BookingService, ManagementService, PgAppointmentStore, PgServiceCatalog,
    SystemClock,
};

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use axum::http::header;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cfg = Config::from_env()?;
    let pool = db::connect_pg(&cfg.database_url).await?;

    let store = Arc::new(PgAppointmentStore::new(pool.clone()));
    let catalog = Arc::new(PgServiceCatalog::new(pool.clone()));
    let clock = Arc::new(SystemClock);
    // One writer at a time across booking and management: the
    // availability check and the following write must be atomic.
    let write_lock = Arc::new(tokio::sync::Mutex::new(()));

    let state = AppState {
        db: pool.clone(),
        session_ttl_hours: cfg.session_ttl_hours,
        identity: Arc::new(PgIdentityProvider::new(pool)),
        catalog: catalog.clone(),
        booking: Arc::new(BookingService::new(
            store.clone(),
            catalog.clone(),
            clock.clone(),
            write_lock.clone(),
        )),
        management: Arc::new(ManagementService::new(
            store.clone(),
            catalog,
            clock,
            write_lock,
        )),
        queries: Arc::new(AdminQueryService::new(store)),
    };

    // Allow browser clients to call the API (OPTIONS preflight included).
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
