use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, Medicine};

#[derive(Debug, Serialize, ToSchema)]
pub struct MedicineList {
    pub items: Vec<Medicine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

/// Homepage slider entry: an activated advertisement joined with the
/// medicine it promotes.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct ActiveAdvertisement {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub item_name: String,
    pub image_url: String,
    pub description: String,
    pub seller_email: String,
    pub priority: i32,
    pub activated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveAdvertisementList {
    pub items: Vec<ActiveAdvertisement>,
}
