use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::hash_access_token;
use crate::error::ApiError;
use crate::scheduling::{Principal, Role};

/// An authenticated session: who is calling and under which token.
#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub session_token_id: Uuid,
}

/// Narrow identity boundary: turn a bearer token into a principal with a
/// role, or fail with 401. The engine never sees tokens, only principals.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<Session, ApiError>;
}

/// Session-token implementation backed by Postgres. Only a SHA-256 digest
/// of the token is stored, so lookup hashes before querying.
pub struct PgIdentityProvider {
    pool: sqlx::PgPool,
}

impl PgIdentityProvider {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionLookupRow {
    session_token_id: Uuid,
    user_id: Uuid,
    role: i16,
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn authenticate(&self, token: &str) -> Result<Session, ApiError> {
        let token_hash = hash_access_token(token);

        let row: SessionLookupRow = sqlx::query_as::<_, SessionLookupRow>(
            r#"
            SELECT st.session_token_id, st.user_id, u.role
            FROM session_token st
            JOIN app_user u ON u.user_id = st.user_id
            WHERE st.session_token_hash = $1
              AND st.revoked_at IS NULL
              AND st.expires_at > now()
              AND u.is_active = true
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?
        .ok_or_else(ApiError::session_expired)?;

        let role = Role::from_db(row.role).ok_or_else(|| {
            ApiError::Internal(format!("unknown role {} for user {}", row.role, row.user_id))
        })?;

        // Touch last_seen_at (best-effort)
        let _ = sqlx::query(
            r#"
            UPDATE session_token
            SET last_seen_at = now()
            WHERE session_token_id = $1
            "#,
        )
        .bind(row.session_token_id)
        .execute(&self.pool)
        .await;

        Ok(Session {
            principal: Principal {
                id: row.user_id,
                role,
            },
            session_token_id: row.session_token_id,
        })
    }
}
