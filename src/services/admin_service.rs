use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::admin::{
        AdAction, AdminStats, AdvertisementDetail, AdvertisementList, CreateCategoryRequest,
        SalesReport, SalesReportRow, ToggleAdvertisementRequest, UpdateCategoryRequest,
        UpdatePaymentStatusRequest, UpdateRoleRequest, UserList,
    },
    dto::payment::OrderList,
    entity::{
        advertisements::{ActiveModel as AdActive, Entity as Advertisements},
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Order, Role, User},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Pagination, SalesReportQuery, SortOrder},
    services::{catalog_service::category_from_entity, order_service::order_from_entity},
    state::AppState,
};

pub async fn stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<AdminStats>> {
    ensure_admin(user)?;

    let stats = sqlx::query_as::<_, AdminStats>(
        r#"
        SELECT
            COALESCE((SELECT SUM(total_amount) FROM orders WHERE status = 'paid'), 0)::bigint
                AS paid_total,
            COALESCE((SELECT SUM(total_amount) FROM orders WHERE status = 'pending'), 0)::bigint
                AS pending_total,
            (SELECT COUNT(*) FROM orders) AS order_count,
            (SELECT COUNT(*) FROM users WHERE role = 'user') AS user_count,
            (SELECT COUNT(*) FROM users WHERE role = 'seller') AS seller_count,
            (SELECT COUNT(*) FROM medicines) AS medicine_count
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success("Stats", stats, Some(Meta::empty())))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find().order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn update_role(
    state: &AppState,
    user: &AuthUser,
    target_id: Uuid,
    payload: UpdateRoleRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    // An admin may not demote their own account.
    if target_id == user.user_id && payload.role != Role::Admin {
        return Err(AppError::BadRequest(
            "admins cannot demote their own account".into(),
        ));
    }

    let target = Users::find_by_id(target_id).one(&state.orm).await?;
    let target = match target {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    if target.role == Role::Admin.as_str() && payload.role != Role::Admin {
        let admin_count = Users::find()
            .filter(UserCol::Role.eq(Role::Admin.as_str()))
            .count(&state.orm)
            .await?;
        if admin_count <= 1 {
            return Err(AppError::BadRequest(
                "cannot demote the last remaining admin".into(),
            ));
        }
    }

    let mut active: UserActive = target.into();
    active.role = Set(payload.role.as_str().to_string());
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "role_update",
        Some("users"),
        Some(serde_json::json!({ "target_id": target_id, "role": payload.role.as_str() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Role updated",
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("category name must not be empty".into()));
    }

    let exists = Categories::find()
        .filter(CategoryCol::Name.eq(payload.name.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest(format!(
            "category '{}' already exists",
            payload.name
        )));
    }

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        image_url: Set(payload.image_url),
        medicine_count: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;

    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    // Renaming updates every medicine still pointing at the old name, since
    // medicines reference categories by name.
    let txn = state.orm.begin().await?;
    let old_name = existing.name.clone();
    let name = payload.name.unwrap_or_else(|| old_name.clone());
    let image_url = payload.image_url.unwrap_or_else(|| existing.image_url.clone());

    let mut active: CategoryActive = existing.into();
    active.name = Set(name.clone());
    active.image_url = Set(image_url);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    if name != old_name {
        use crate::entity::medicines::{Column as MedicineCol, Entity as Medicines};
        use sea_orm::sea_query::Expr;
        Medicines::update_many()
            .col_expr(MedicineCol::Category, Expr::value(name.clone()))
            .filter(MedicineCol::Category.eq(old_name))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Category updated",
        category_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    if existing.medicine_count > 0 {
        return Err(AppError::BadRequest(format!(
            "cannot delete category '{}': {} medicines still linked",
            existing.name, existing.medicine_count
        )));
    }

    Categories::delete_by_id(id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_payments(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let mut finder = Orders::find().filter(condition);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Payments",
        OrderList { items },
        Some(meta),
    ))
}

pub async fn update_payment_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePaymentStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    validate_payment_transition(&existing.status, &payload.status)?;

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status.clone());
    active.paid_at = Set(Some(Utc::now().into()));
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_accept",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn list_advertisements(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<AdvertisementList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, AdvertisementDetail>(
        r#"
        SELECT a.id, a.medicine_id, m.item_name, m.image_url, a.description,
               a.seller_id, u.email AS seller_email, a.admin_status, a.is_active,
               a.priority, a.requested_at, a.activated_at
        FROM advertisements a
        JOIN medicines m ON m.id = a.medicine_id
        JOIN users u ON u.id = a.seller_id
        ORDER BY a.requested_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM advertisements")
        .fetch_one(&state.pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Advertisements",
        AdvertisementList { items },
        Some(meta),
    ))
}

pub async fn toggle_advertisement(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ToggleAdvertisementRequest,
) -> AppResult<ApiResponse<crate::models::Advertisement>> {
    ensure_admin(user)?;

    let existing = Advertisements::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    let change = apply_ad_action(&existing.admin_status, existing.is_active, payload.action)?;

    let updated = match change.set_active {
        Some(true) => {
            // Activation appends to the end of the slider. The priority is
            // computed inside the update statement so two concurrent
            // activations cannot be handed the same slot.
            sqlx::query_as::<_, crate::models::Advertisement>(
                r#"
                UPDATE advertisements
                SET is_active = TRUE,
                    priority = COALESCE(
                        (SELECT MAX(priority) FROM advertisements WHERE is_active), 0) + 1,
                    activated_at = now()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(id)
            .fetch_one(&state.pool)
            .await?
        }
        _ => {
            let mut active: AdActive = existing.into();
            if let Some(status) = change.new_status {
                active.admin_status = Set(status.to_string());
            }
            if change.set_active == Some(false) {
                active.is_active = Set(false);
            }
            advertisement_from_entity(active.update(&state.orm).await?)
        }
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "advertisement_toggle",
        Some("advertisements"),
        Some(serde_json::json!({
            "advertisement_id": id,
            "admin_status": updated.admin_status,
            "is_active": updated.is_active,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Advertisement updated",
        updated,
        Some(Meta::empty()),
    ))
}

pub async fn sales_report(
    state: &AppState,
    user: &AuthUser,
    query: SalesReportQuery,
) -> AppResult<ApiResponse<SalesReport>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let items = sqlx::query_as::<_, SalesReportRow>(
        r#"
        SELECT o.order_number, o.created_at, buyer.email AS buyer_email,
               seller.email AS seller_email, oi.item_name, oi.quantity,
               oi.unit_price, (oi.unit_price * oi.quantity)::bigint AS line_total,
               o.status
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        JOIN users buyer ON buyer.id = o.user_id
        JOIN users seller ON seller.id = oi.seller_id
        WHERE ($1::date IS NULL OR o.created_at >= $1::date)
          AND ($2::date IS NULL OR o.created_at < $2::date + interval '1 day')
        ORDER BY o.created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(query.from)
    .bind(query.to)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        WHERE ($1::date IS NULL OR o.created_at >= $1::date)
          AND ($2::date IS NULL OR o.created_at < $2::date + interval '1 day')
        "#,
    )
    .bind(query.from)
    .bind(query.to)
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Sales report",
        SalesReport { items },
        Some(meta),
    ))
}

/// Payments move pending -> paid once, by explicit admin action. Everything
/// else is rejected, including re-accepting a paid order.
fn validate_payment_transition(current: &str, requested: &str) -> Result<(), AppError> {
    match (current, requested) {
        ("pending", "paid") => Ok(()),
        ("paid", _) => Err(AppError::BadRequest("order is already paid".into())),
        (_, other) => Err(AppError::BadRequest(format!(
            "invalid payment status '{other}'"
        ))),
    }
}

#[derive(Debug, PartialEq)]
struct AdChange {
    new_status: Option<&'static str>,
    set_active: Option<bool>,
}

fn apply_ad_action(
    admin_status: &str,
    is_active: bool,
    action: AdAction,
) -> Result<AdChange, AppError> {
    match action {
        AdAction::Approve => match admin_status {
            "pending" => Ok(AdChange {
                new_status: Some("approved"),
                set_active: None,
            }),
            other => Err(AppError::BadRequest(format!(
                "cannot approve an advertisement in status '{other}'"
            ))),
        },
        AdAction::Reject => match admin_status {
            "pending" => Ok(AdChange {
                new_status: Some("rejected"),
                set_active: None,
            }),
            other => Err(AppError::BadRequest(format!(
                "cannot reject an advertisement in status '{other}'"
            ))),
        },
        AdAction::Activate => {
            if admin_status != "approved" {
                return Err(AppError::BadRequest(
                    "only approved advertisements can be activated".into(),
                ));
            }
            if is_active {
                return Err(AppError::BadRequest(
                    "advertisement is already active".into(),
                ));
            }
            Ok(AdChange {
                new_status: None,
                set_active: Some(true),
            })
        }
        AdAction::Deactivate => {
            if !is_active {
                return Err(AppError::BadRequest(
                    "advertisement is not active".into(),
                ));
            }
            Ok(AdChange {
                new_status: None,
                set_active: Some(false),
            })
        }
    }
}

fn user_from_entity(model: crate::entity::users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        photo_url: model.photo_url,
        role: model.role,
        password_hash: model.password_hash,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn advertisement_from_entity(
    model: crate::entity::advertisements::Model,
) -> crate::models::Advertisement {
    crate::models::Advertisement {
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
    fn payment_only_moves_pending_to_paid() {
        assert!(validate_payment_transition("pending", "paid").is_ok());
        assert!(validate_payment_transition("paid", "pending").is_err());
        assert!(validate_payment_transition("paid", "paid").is_err());
        assert!(validate_payment_transition("pending", "shipped").is_err());
    }

    #[test]
    fn approve_only_from_pending() {
        let change = apply_ad_action("pending", false, AdAction::Approve).unwrap();
        assert_eq!(change.new_status, Some("approved"));
        assert_eq!(change.set_active, None);

        assert!(apply_ad_action("approved", false, AdAction::Approve).is_err());
        assert!(apply_ad_action("rejected", false, AdAction::Approve).is_err());
    }

    #[test]
    fn activate_requires_approved_and_inactive() {
        let change = apply_ad_action("approved", false, AdAction::Activate).unwrap();
        assert_eq!(change.set_active, Some(true));

        assert!(apply_ad_action("pending", false, AdAction::Activate).is_err());
        assert!(apply_ad_action("approved", true, AdAction::Activate).is_err());
    }

    #[test]
    fn deactivate_requires_active() {
        assert!(apply_ad_action("approved", true, AdAction::Deactivate).is_ok());
        assert!(apply_ad_action("approved", false, AdAction::Deactivate).is_err());
    }
}
