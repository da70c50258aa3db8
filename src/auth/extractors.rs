use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the bearer token to a full user row. Pure lookup against the
/// users table; no store side effects, no expiry to check.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(ApiError::Unauthenticated)?;

        let user = User::find_by_token(&state.db, token)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::InvalidToken)?;

        Ok(AuthUser(user))
    }
}
