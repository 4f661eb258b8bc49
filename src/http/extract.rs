use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{error::AppError, AppState};
use crate::auth::{AuthError, Claims};

/// A caller holding a valid bearer token.
pub struct AuthUser(pub Claims);

/// A caller holding a valid bearer token with the admin role.
pub struct AdminUser(pub Claims);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;

        let claims = state.tokens.verify(token).map_err(|e| {
            warn!(error = %e, "Token verification failed");
            e
        })?;

        Ok(Self(claims))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        if !claims.is_admin() {
            warn!(user_id = claims.id, "Admin route refused");
            return Err(AppError::Forbidden);
        }

        Ok(Self(claims))
    }
}
