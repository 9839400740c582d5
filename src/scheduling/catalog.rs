use async_trait::async_trait;
use serde::Serialize;
use sqlx::Row;
use uuid::Uuid;

use crate::scheduling::error::SchedulingError;

/// A priced service offering (a "formula" in salon terms).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    pub formula_id: Uuid,
    pub title: String,
    pub price_cents: i32,
    pub duration_min: Option<i32>,
}

/// Resolves a formula id to a valid, priced offering. Inactive or unknown
/// formulas resolve to `None`.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn resolve(&self, formula_id: Uuid)
        -> Result<Option<ServiceOffering>, SchedulingError>;

    async fn list_active(&self) -> Result<Vec<ServiceOffering>, SchedulingError>;
}

pub struct PgServiceCatalog {
    pool: sqlx::PgPool,
}

impl PgServiceCatalog {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceCatalog for PgServiceCatalog {
    async fn resolve(
        &self,
        formula_id: Uuid,
    ) -> Result<Option<ServiceOffering>, SchedulingError> {
        let row = sqlx::query(
            r#"
            SELECT formula_id, title, price_cents, duration_min
            FROM formula
            WHERE formula_id = $1
              AND is_active = true
            "#,
        )
        .bind(formula_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SchedulingError::Storage(format!("db error: {e}")))?;

        row.map(|r| offering_from_row(&r)).transpose()
    }

    async fn list_active(&self) -> Result<Vec<ServiceOffering>, SchedulingError> {
        let rows = sqlx::query(
            r#"
            SELECT formula_id, title, price_cents, duration_min
            FROM formula
            WHERE is_active = true
            ORDER BY title ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SchedulingError::Storage(format!("db error: {e}")))?;

        rows.iter().map(offering_from_row).collect()
    }
}

fn offering_from_row(row: &sqlx::postgres::PgRow) -> Result<ServiceOffering, SchedulingError> {
    let decode = |e: sqlx::Error| SchedulingError::Storage(format!("row decode error: {e}"));
    Ok(ServiceOffering {
        formula_id: row.try_get("formula_id").map_err(decode)?,
        title: row.try_get("title").map_err(decode)?,
        price_cents: row.try_get("price_cents").map_err(decode)?,
        duration_min: row.try_get("duration_min").map_err(decode)?,
    })
}
