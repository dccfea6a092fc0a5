use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMedicineRequest {
    pub item_name: String,
    pub generic_name: String,
    pub short_description: Option<String>,
    pub image_url: String,
    pub category: String,
    pub company: String,
    pub mass_unit: String,
    pub per_unit_price: i64,
    pub discount_percent: Option<i32>,
    pub stock: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMedicineRequest {
    pub item_name: Option<String>,
    pub generic_name: Option<String>,
    pub short_description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub company: Option<String>,
    pub mass_unit: Option<String>,
    pub per_unit_price: Option<i64>,
    pub discount_percent: Option<i32>,
    pub stock: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdvertisementRequest {
    pub medicine_id: Uuid,
    pub description: String,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct SellerDashboard {
    pub paid_total: i64,
    pub pending_total: i64,
    pub medicine_count: i64,
    pub units_sold: i64,
}

/// One order that contains the seller's items, with the slice of the total
/// credited to this seller.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct SellerPaymentRow {
    pub order_id: Uuid,
    pub order_number: String,
    pub buyer_email: String,
    pub seller_subtotal: i64,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerPaymentHistory {
    pub items: Vec<SellerPaymentRow>,
}
