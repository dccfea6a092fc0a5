use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::payment::{CreateIntentResponse, OrderWithItems, SaveOrderRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-intent", post(create_intent))
        .route("/save-order", post(save_order))
}

#[utoipa::path(
    post,
    path = "/api/payment/create-intent",
    responses(
        (status = 200, description = "Payment intent for the caller's cart total", body = ApiResponse<CreateIntentResponse>),
        (status = 400, description = "Empty cart"),
        (status = 502, description = "Payment gateway failure")
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn create_intent(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CreateIntentResponse>>> {
    let resp = payment_service::create_intent(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payment/save-order",
    request_body = SaveOrderRequest,
    responses(
        (status = 200, description = "Order persisted as pending", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty cart, stock shortfall, or total mismatch")
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn save_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaveOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = payment_service::save_order(&state, &user, payload).await?;
    Ok(Json(resp))
}
