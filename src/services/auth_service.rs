use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    auth::credentials::{hash_password, verify_password},
    dto::auth::{LoginRequest, SignupRequest, TokenResponse},
    entity::users::{self, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn signup_user(
    state: &AppState,
    payload: SignupRequest,
) -> AppResult<ApiResponse<TokenResponse>> {
    let SignupRequest {
        fullname,
        email,
        password,
    } = payload;

    let exists = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        fullname: Set(fullname),
        email: Set(email),
        password_hash: Set(password_hash),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let token = state
        .tokens
        .issue(&user.email, &user.fullname, state.token_ttl)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_signup",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User created",
        TokenResponse::bearer(token),
        Some(Meta::empty()),
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<TokenResponse>> {
    let LoginRequest { email, password } = payload;

    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    // Unknown email and wrong password take the same exit so the response
    // does not reveal which one it was.
    let user = user.ok_or(AppError::Unauthorized)?;
    if !verify_password(&password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let token = state
        .tokens
        .issue(&user.email, &user.fullname, state.token_ttl)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Logged in",
        TokenResponse::bearer(token),
        Some(Meta::empty()),
    ))
}
