use axum::{
    extract::{FromRef, FromRequestParts},
    http::header,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    entity::users::{Column as UserCol, Entity as Users},
    error::AppError,
    state::AppState,
};

/// The authenticated caller, resolved from a bearer token. Extracting this in
/// a handler is what makes the route protected.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub fullname: String,
    pub email: String,
}

/// Validate a raw token and resolve its identity claim to a stored user.
/// Every sub-failure (bad signature, expiry, missing claim, unknown email)
/// collapses into the same `Unauthorized` so responses never reveal which
/// check failed.
pub async fn authorize_token(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let claims = state.tokens.validate(token).ok_or(AppError::Unauthorized)?;

    let user = Users::find()
        .filter(UserCol::Email.eq(claims.email.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id: user.id,
        fullname: user.fullname,
        email: user.email,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthorized);
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        authorize_token(&state, token).await
    }
}
