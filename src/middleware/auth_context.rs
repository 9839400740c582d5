use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::AppState;
use crate::scheduling::Principal;

/// Extractor that resolves `Authorization: Bearer <token>` into a
/// principal via the configured identity provider.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal: Principal,
    pub session_token_id: Uuid,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let TypedHeader(authz): TypedHeader<Authorization<Bearer>> =
                TypedHeader::from_request_parts(parts, state)
                    .await
                    .map_err(|_| ApiError::session_expired())?;

            let session = state.identity.authenticate(authz.token()).await?;

            Ok(AuthContext {
                principal: session.principal,
                session_token_id: session.session_token_id,
            })
        }
    }
}
