use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::pricing::OrderTotals;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub medicine_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

/// Cart row joined with its medicine; `current_price` is the discounted
/// unit price computed server-side, never a client snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDto {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub item_name: String,
    pub image_url: String,
    pub per_unit_price: i64,
    pub discount_percent: i32,
    pub current_price: i64,
    pub quantity: i32,
    pub line_total: i64,
    pub seller_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TotalsDto {
    pub subtotal: i64,
    pub tax: i64,
    pub delivery_charge: i64,
    pub total_amount: i64,
}

impl From<OrderTotals> for TotalsDto {
    fn from(t: OrderTotals) -> Self {
        Self {
            subtotal: t.subtotal,
            tax: t.tax,
            delivery_charge: t.delivery_charge,
            total_amount: t.total_amount,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartItemDto>,
    pub totals: TotalsDto,
}
