use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::cart::TotalsDto,
    models::{Order, OrderItem},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
    pub totals: TotalsDto,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveOrderRequest {
    pub payment_intent_id: String,
    pub transaction_id: Option<String>,
    pub payment_method: String,
    /// Total the client showed the buyer. Verified against the server's own
    /// computation when present; a mismatch rejects the order.
    pub expected_total: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
