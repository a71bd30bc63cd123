use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::receipts::{CreateReceiptRequest, ReceiptList, ReceiptText},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Receipt,
    response::ApiResponse,
    routes::params::ReceiptListQuery,
    services::receipt_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_receipt).get(list_receipts))
        .route("/{id}", get(get_receipt_text))
}

#[utoipa::path(
    post,
    path = "/api/receipts",
    request_body = CreateReceiptRequest,
    responses(
        (status = 200, description = "Receipt created with computed totals", body = ApiResponse<Receipt>),
        (status = 400, description = "Negative price or quantity"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Receipts"
)]
pub async fn create_receipt(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateReceiptRequest>,
) -> AppResult<Json<ApiResponse<Receipt>>> {
    let resp = receipt_service::create_receipt(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/receipts",
    responses(
        (status = 200, description = "Page of the caller's receipts", body = ApiResponse<ReceiptList>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Receipts"
)]
pub async fn list_receipts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReceiptListQuery>,
) -> AppResult<Json<ApiResponse<ReceiptList>>> {
    let resp = receipt_service::list_receipts(&state, &user, query).await?;
    Ok(Json(resp))
}

// No auth on purpose: holding the id is the capability.
#[utoipa::path(
    get,
    path = "/api/receipts/{id}",
    responses(
        (status = 200, description = "Receipt rendered as a text slip", body = ApiResponse<ReceiptText>),
        (status = 404, description = "Wrong receipt id")
    ),
    tag = "Receipts"
)]
pub async fn get_receipt_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ReceiptText>>> {
    let resp = receipt_service::get_receipt_text(&state, id).await?;
    Ok(Json(resp))
}
