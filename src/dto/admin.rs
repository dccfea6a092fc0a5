use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Role, User};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdAction {
    Approve,
    Reject,
    Activate,
    Deactivate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleAdvertisementRequest {
    pub action: AdAction,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct AdminStats {
    pub paid_total: i64,
    pub pending_total: i64,
    pub order_count: i64,
    pub user_count: i64,
    pub seller_count: i64,
    pub medicine_count: i64,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct SalesReportRow {
    pub order_number: String,
    pub created_at: DateTime<Utc>,
    pub buyer_email: String,
    pub seller_email: String,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub line_total: i64,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesReport {
    pub items: Vec<SalesReportRow>,
}

/// Advertisement joined with medicine and seller info for moderation lists.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct AdvertisementDetail {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub item_name: String,
    pub image_url: String,
    pub description: String,
    pub seller_id: Uuid,
    pub seller_email: String,
    pub admin_status: String,
    pub is_active: bool,
    pub priority: i32,
    pub requested_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdvertisementList {
    pub items: Vec<AdvertisementDetail>,
}
