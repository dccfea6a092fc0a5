use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::admin::{AdvertisementDetail, AdvertisementList},
    dto::catalog::MedicineList,
    dto::seller::{
        CreateAdvertisementRequest, CreateMedicineRequest, SellerDashboard, SellerPaymentHistory,
        SellerPaymentRow, UpdateMedicineRequest,
    },
    entity::{
        advertisements::{ActiveModel as AdActive, Column as AdCol, Entity as Advertisements},
        cart_items::{Column as CartCol, Entity as CartItems},
        categories::{Column as CategoryCol, Entity as Categories},
        medicines::{ActiveModel as MedicineActive, Column as MedicineCol, Entity as Medicines},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller},
    models::{Advertisement, Medicine},
    response::{ApiResponse, Meta},
    routes::params::{MedicineQuery, MedicineSortBy, Pagination, SortOrder},
    services::catalog_service::medicine_from_entity,
    state::AppState,
};

pub async fn list_medicines(
    state: &AppState,
    user: &AuthUser,
    query: MedicineQuery,
) -> AppResult<ApiResponse<MedicineList>> {
    ensure_seller(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(MedicineCol::SellerId.eq(user.user_id));
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(MedicineCol::ItemName).ilike(pattern.clone()))
                .add(Expr::col(MedicineCol::GenericName).ilike(pattern)),
        );
    }

    let sort_by = query.sort_by.unwrap_or(MedicineSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        MedicineSortBy::CreatedAt => MedicineCol::CreatedAt,
        MedicineSortBy::Price => MedicineCol::PerUnitPrice,
        MedicineSortBy::Name => MedicineCol::ItemName,
    };

    let mut finder = Medicines::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(medicine_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Medicines",
        MedicineList { items },
        Some(meta),
    ))
}

pub async fn create_medicine(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMedicineRequest,
) -> AppResult<ApiResponse<Medicine>> {
    ensure_seller(user)?;
    validate_medicine_fields(payload.per_unit_price, payload.discount_percent, payload.stock)?;

    let txn = state.orm.begin().await?;

    let category = Categories::find()
        .filter(CategoryCol::Name.eq(payload.category.as_str()))
        .one(&txn)
        .await?;
    if category.is_none() {
        return Err(AppError::BadRequest(format!(
            "unknown category '{}'",
            payload.category
        )));
    }

    let medicine = MedicineActive {
        id: Set(Uuid::new_v4()),
        item_name: Set(payload.item_name),
        generic_name: Set(payload.generic_name),
        short_description: Set(payload.short_description),
        image_url: Set(payload.image_url),
        category: Set(payload.category.clone()),
        company: Set(payload.company),
        mass_unit: Set(payload.mass_unit),
        per_unit_price: Set(payload.per_unit_price),
        discount_percent: Set(payload.discount_percent.unwrap_or(0)),
        seller_id: Set(user.user_id),
        stock: Set(payload.stock),
        sales: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    bump_category_count(&txn, &payload.category, 1).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "medicine_create",
        Some("medicines"),
        Some(serde_json::json!({ "medicine_id": medicine.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Medicine created",
        medicine_from_entity(medicine),
        Some(Meta::empty()),
    ))
}

pub async fn update_medicine(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMedicineRequest,
) -> AppResult<ApiResponse<Medicine>> {
    ensure_seller(user)?;

    let existing = Medicines::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };
    if existing.seller_id != user.user_id {
        return Err(AppError::Forbidden(
            "medicine belongs to another seller".into(),
        ));
    }

    let per_unit_price = payload.per_unit_price.unwrap_or(existing.per_unit_price);
    let discount_percent = payload.discount_percent.unwrap_or(existing.discount_percent);
    let stock = payload.stock.unwrap_or(existing.stock);
    validate_medicine_fields(per_unit_price, Some(discount_percent), stock)?;

    let txn = state.orm.begin().await?;

    let old_category = existing.category.clone();
    let new_category = payload.category.clone().unwrap_or_else(|| old_category.clone());
    if new_category != old_category {
        let category = Categories::find()
            .filter(CategoryCol::Name.eq(new_category.as_str()))
            .one(&txn)
            .await?;
        if category.is_none() {
            return Err(AppError::BadRequest(format!(
                "unknown category '{new_category}'"
            )));
        }
    }

    let mut active: MedicineActive = existing.clone().into();
    if let Some(item_name) = payload.item_name {
        active.item_name = Set(item_name);
    }
    if let Some(generic_name) = payload.generic_name {
        active.generic_name = Set(generic_name);
    }
    if payload.short_description.is_some() {
        active.short_description = Set(payload.short_description);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(image_url);
    }
    if let Some(company) = payload.company {
        active.company = Set(company);
    }
    if let Some(mass_unit) = payload.mass_unit {
        active.mass_unit = Set(mass_unit);
    }
    active.category = Set(new_category.clone());
    active.per_unit_price = Set(per_unit_price);
    active.discount_percent = Set(discount_percent);
    active.stock = Set(stock);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    if new_category != old_category {
        bump_category_count(&txn, &old_category, -1).await?;
        bump_category_count(&txn, &new_category, 1).await?;
    }
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Medicine updated",
        medicine_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_medicine(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_seller(user)?;

    let existing = Medicines::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };
    if existing.seller_id != user.user_id {
        return Err(AppError::Forbidden(
            "medicine belongs to another seller".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    // Order items keep pointing at the medicine forever; once sold it can
    // only go out of stock, not disappear from past invoices.
    let ordered = OrderItems::find()
        .filter(OrderItemCol::MedicineId.eq(id))
        .count(&txn)
        .await?;
    if ordered > 0 {
        return Err(AppError::BadRequest(format!(
            "cannot delete '{}': {} order items reference it",
            existing.item_name, ordered
        )));
    }

    // Cart rows and advertisement requests go with the medicine.
    CartItems::delete_many()
        .filter(CartCol::MedicineId.eq(id))
        .exec(&txn)
        .await?;
    Advertisements::delete_many()
        .filter(AdCol::MedicineId.eq(id))
        .exec(&txn)
        .await?;

    let category = existing.category.clone();
    Medicines::delete_by_id(id).exec(&txn).await?;
    bump_category_count(&txn, &category, -1).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "medicine_delete",
        Some("medicines"),
        Some(serde_json::json!({ "medicine_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Medicine deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_advertisements(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<AdvertisementList>> {
    ensure_seller(user)?;
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, AdvertisementDetail>(
        r#"
        SELECT a.id, a.medicine_id, m.item_name, m.image_url, a.description,
               a.seller_id, u.email AS seller_email, a.admin_status, a.is_active,
               a.priority, a.requested_at, a.activated_at
        FROM advertisements a
        JOIN medicines m ON m.id = a.medicine_id
        JOIN users u ON u.id = a.seller_id
        WHERE a.seller_id = $1
        ORDER BY a.requested_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM advertisements WHERE seller_id = $1")
            .bind(user.user_id)
            .fetch_one(&state.pool)
            .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Advertisements",
        AdvertisementList { items },
        Some(meta),
    ))
}

/// New requests always enter the moderation queue: pending, inactive,
/// priority unassigned.
pub async fn create_advertisement(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAdvertisementRequest,
) -> AppResult<ApiResponse<Advertisement>> {
    ensure_seller(user)?;

    let medicine = Medicines::find_by_id(payload.medicine_id)
        .one(&state.orm)
        .await?;
    let medicine = match medicine {
        Some(m) => m,
        None => return Err(AppError::BadRequest("medicine not found".into())),
    };
    if medicine.seller_id != user.user_id {
        return Err(AppError::Forbidden(
            "medicine belongs to another seller".into(),
        ));
    }

    let duplicate = Advertisements::find()
        .filter(
            Condition::all()
                .add(AdCol::MedicineId.eq(payload.medicine_id))
                .add(AdCol::AdminStatus.eq("pending")),
        )
        .one(&state.orm)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::BadRequest(
            "a pending advertisement already exists for this medicine".into(),
        ));
    }

    let ad = AdActive {
        id: Set(Uuid::new_v4()),
        medicine_id: Set(payload.medicine_id),
        seller_id: Set(user.user_id),
        description: Set(payload.description),
        admin_status: Set("pending".into()),
        is_active: Set(false),
        priority: Set(0),
        requested_at: NotSet,
        activated_at: Set(None),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Advertisement requested",
        advertisement_from_entity(ad),
        Some(Meta::empty()),
    ))
}

pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<SellerDashboard>> {
    ensure_seller(user)?;

    let dashboard = sqlx::query_as::<_, SellerDashboard>(
        r#"
        SELECT
            COALESCE(SUM(oi.unit_price * oi.quantity)
                FILTER (WHERE o.status = 'paid'), 0)::bigint AS paid_total,
            COALESCE(SUM(oi.unit_price * oi.quantity)
                FILTER (WHERE o.status = 'pending'), 0)::bigint AS pending_total,
            (SELECT COUNT(*) FROM medicines WHERE seller_id = $1) AS medicine_count,
            COALESCE(SUM(oi.quantity), 0)::bigint AS units_sold
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        WHERE oi.seller_id = $1
        "#,
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Dashboard",
        dashboard,
        Some(Meta::empty()),
    ))
}

pub async fn payment_history(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<SellerPaymentHistory>> {
    ensure_seller(user)?;
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, SellerPaymentRow>(
        r#"
        SELECT o.id AS order_id, o.order_number, buyer.email AS buyer_email,
               SUM(oi.unit_price * oi.quantity)::bigint AS seller_subtotal,
               o.status, o.paid_at, o.created_at
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        JOIN users buyer ON buyer.id = o.user_id
        WHERE oi.seller_id = $1
        GROUP BY o.id, o.order_number, buyer.email, o.status, o.paid_at, o.created_at
        ORDER BY o.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(DISTINCT order_id) FROM order_items WHERE seller_id = $1",
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Payment history",
        SellerPaymentHistory { items },
        Some(meta),
    ))
}

fn validate_medicine_fields(
    per_unit_price: i64,
    discount_percent: Option<i32>,
    stock: i32,
) -> Result<(), AppError> {
    if per_unit_price <= 0 {
        return Err(AppError::BadRequest("price must be greater than 0".into()));
    }
    if let Some(discount) = discount_percent {
        if !(0..=100).contains(&discount) {
            return Err(AppError::BadRequest(
                "discount must be between 0 and 100".into(),
            ));
        }
    }
    if stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }
    Ok(())
}

async fn bump_category_count<C: sea_orm::ConnectionTrait>(
    conn: &C,
    category_name: &str,
    delta: i64,
) -> Result<(), AppError> {
    Categories::update_many()
        .col_expr(
            CategoryCol::MedicineCount,
            Expr::col(CategoryCol::MedicineCount).add(delta),
        )
        .filter(CategoryCol::Name.eq(category_name))
        .exec(conn)
        .await?;
    Ok(())
}

fn advertisement_from_entity(model: crate::entity::advertisements::Model) -> Advertisement {
    Advertisement {
        id: model.id,
        medicine_id: model.medicine_id,
        seller_id: model.seller_id,
        description: model.description,
        admin_status: model.admin_status,
        is_active: model.is_active,
        priority: model.priority,
        requested_at: model.requested_at.with_timezone(&Utc),
        activated_at: model.activated_at.map(|dt| dt.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nonpositive_price() {
        assert!(validate_medicine_fields(0, None, 10).is_err());
        assert!(validate_medicine_fields(-5, None, 10).is_err());
        assert!(validate_medicine_fields(100, None, 10).is_ok());
    }

    #[test]
    fn rejects_out_of_range_discount() {
        assert!(validate_medicine_fields(100, Some(-1), 10).is_err());
        assert!(validate_medicine_fields(100, Some(101), 10).is_err());
        assert!(validate_medicine_fields(100, Some(100), 10).is_ok());
    }

    #[test]
    fn rejects_negative_stock() {
        assert!(validate_medicine_fields(100, None, -1).is_err());
        assert!(validate_medicine_fields(100, None, 0).is_ok());
    }
}
