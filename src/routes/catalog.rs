use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{ActiveAdvertisementList, CategoryList, MedicineList},
    error::AppResult,
    models::Medicine,
    response::ApiResponse,
    routes::params::{MedicineQuery, Pagination},
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{name}/medicines", get(list_category_medicines))
        .route("/medicines", get(list_medicines))
        .route("/medicines/discount-products", get(list_discount_medicines))
        .route("/medicines/{id}", get(get_medicine))
        .route("/advertisements/active", get(active_advertisements))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List categories with medicine counts", body = ApiResponse<CategoryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = catalog_service::list_categories(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/{name}/medicines",
    params(
        ("name" = String, Path, description = "Category name"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search term"),
        ("sort_by" = Option<String>, Query, description = "Sort by: created_at, price, name"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Medicines in category", body = ApiResponse<MedicineList>),
        (status = 404, description = "Category not found")
    ),
    tag = "Catalog"
)]
pub async fn list_category_medicines(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<MedicineQuery>,
) -> AppResult<Json<ApiResponse<MedicineList>>> {
    let resp = catalog_service::list_category_medicines(&state, &name, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/medicines",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search over item name, generic name, company"),
        ("sort_by" = Option<String>, Query, description = "Sort by: created_at, price, name"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Paginated catalog", body = ApiResponse<MedicineList>)
    ),
    tag = "Catalog"
)]
pub async fn list_medicines(
    State(state): State<AppState>,
    Query(query): Query<MedicineQuery>,
) -> AppResult<Json<ApiResponse<MedicineList>>> {
    let resp = catalog_service::list_medicines(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/medicines/discount-products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Discounted medicines", body = ApiResponse<MedicineList>)
    ),
    tag = "Catalog"
)]
pub async fn list_discount_medicines(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<MedicineList>>> {
    let resp = catalog_service::list_discount_medicines(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/medicines/{id}",
    params(
        ("id" = Uuid, Path, description = "Medicine ID")
    ),
    responses(
        (status = 200, description = "Medicine", body = ApiResponse<Medicine>),
        (status = 404, description = "Medicine not found")
    ),
    tag = "Catalog"
)]
pub async fn get_medicine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Medicine>>> {
    let resp = catalog_service::get_medicine(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/advertisements/active",
    responses(
        (status = 200, description = "Active slider advertisements in priority order", body = ApiResponse<ActiveAdvertisementList>)
    ),
    tag = "Catalog"
)]
pub async fn active_advertisements(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ActiveAdvertisementList>>> {
    let resp = catalog_service::active_advertisements(&state).await?;
    Ok(Json(resp))
}
