use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::admin::AdvertisementList,
    dto::catalog::MedicineList,
    dto::seller::{
        CreateAdvertisementRequest, CreateMedicineRequest, SellerDashboard, SellerPaymentHistory,
        UpdateMedicineRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Advertisement, Medicine},
    response::ApiResponse,
    routes::params::{MedicineQuery, Pagination},
    services::seller_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/medicines", get(list_medicines).post(create_medicine))
        .route(
            "/medicines/{id}",
            put(update_medicine).delete(delete_medicine),
        )
        .route(
            "/advertisements",
            get(list_advertisements).post(create_advertisement),
        )
        .route("/dashboard", get(dashboard))
        .route("/payment-history", get(payment_history))
}

#[utoipa::path(
    get,
    path = "/api/seller/medicines",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search term"),
        ("sort_by" = Option<String>, Query, description = "Sort by: created_at, price, name"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Caller's inventory", body = ApiResponse<MedicineList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn list_medicines(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MedicineQuery>,
) -> AppResult<Json<ApiResponse<MedicineList>>> {
    let resp = seller_service::list_medicines(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/seller/medicines",
    request_body = CreateMedicineRequest,
    responses(
        (status = 200, description = "Medicine created", body = ApiResponse<Medicine>),
        (status = 400, description = "Unknown category or invalid fields"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn create_medicine(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMedicineRequest>,
) -> AppResult<Json<ApiResponse<Medicine>>> {
    let resp = seller_service::create_medicine(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/seller/medicines/{id}",
    params(
        ("id" = Uuid, Path, description = "Medicine ID")
    ),
    request_body = UpdateMedicineRequest,
    responses(
        (status = 200, description = "Medicine updated", body = ApiResponse<Medicine>),
        (status = 403, description = "Owned by another seller"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn update_medicine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMedicineRequest>,
) -> AppResult<Json<ApiResponse<Medicine>>> {
    let resp = seller_service::update_medicine(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/seller/medicines/{id}",
    params(
        ("id" = Uuid, Path, description = "Medicine ID")
    ),
    responses(
        (status = 200, description = "Medicine deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Owned by another seller"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn delete_medicine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = seller_service::delete_medicine(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/seller/advertisements",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Caller's advertisement requests", body = ApiResponse<AdvertisementList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn list_advertisements(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<AdvertisementList>>> {
    let resp = seller_service::list_advertisements(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/seller/advertisements",
    request_body = CreateAdvertisementRequest,
    responses(
        (status = 200, description = "Advertisement requested, pending approval", body = ApiResponse<Advertisement>),
        (status = 400, description = "Unknown medicine or duplicate pending request"),
        (status = 403, description = "Medicine owned by another seller")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn create_advertisement(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAdvertisementRequest>,
) -> AppResult<Json<ApiResponse<Advertisement>>> {
    let resp = seller_service::create_advertisement(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/seller/dashboard",
    responses(
        (status = 200, description = "Seller revenue summary", body = ApiResponse<SellerDashboard>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SellerDashboard>>> {
    let resp = seller_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/seller/payment-history",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Orders containing the caller's items", body = ApiResponse<SellerPaymentHistory>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn payment_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<SellerPaymentHistory>>> {
    let resp = seller_service::payment_history(&state, &user, pagination).await?;
    Ok(Json(resp))
}
