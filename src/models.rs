use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Role held by a user, one at a time. Stored as text, parsed at the auth
/// boundary so route code can match exhaustively instead of comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "user" => Ok(Role::User),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            other => Err(AppError::BadRequest(format!("unknown role '{other}'"))),
        }
    }

    /// Dashboard menu entries per role, as a static table so adding a role
    /// forces every match in the crate to be revisited.
    pub fn menu(&self) -> &'static [&'static str] {
        match self {
            Role::User => &["payment-history"],
            Role::Seller => &["medicines", "advertisements", "payment-history", "dashboard"],
            Role::Admin => &[
                "users",
                "categories",
                "payments",
                "advertisements",
                "sales-report",
                "stats",
            ],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Medicine {
    pub id: Uuid,
    pub item_name: String,
    pub generic_name: String,
    pub short_description: Option<String>,
    pub image_url: String,
    pub category: String,
    pub company: String,
    pub mass_unit: String,
    pub per_unit_price: i64,
    pub discount_percent: i32,
    pub seller_id: Uuid,
    pub stock: i32,
    pub sales: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub medicine_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub medicine_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub payment_intent_id: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_method: String,
    pub subtotal: i64,
    pub tax: i64,
    pub delivery_charge: i64,
    pub total_amount: i64,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub medicine_id: Uuid,
    pub seller_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Advertisement {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub seller_id: Uuid,
    pub description: String,
    pub admin_status: String,
    pub is_active: bool,
    pub priority: i32,
    pub requested_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
}
