use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, CartItemDto, CartView, UpdateCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
    pricing::{discounted_unit_price, order_totals},
    response::{ApiResponse, Meta},
};

#[derive(FromRow)]
struct CartWithMedicineRow {
    cart_id: Uuid,
    quantity: i32,
    medicine_id: Uuid,
    item_name: String,
    image_url: String,
    per_unit_price: i64,
    discount_percent: i32,
    seller_id: Uuid,
}

pub async fn view_cart(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let rows = sqlx::query_as::<_, CartWithMedicineRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity,
               m.id AS medicine_id, m.item_name, m.image_url,
               m.per_unit_price, m.discount_percent, m.seller_id
        FROM cart_items ci
        JOIN medicines m ON m.id = ci.medicine_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    let mut subtotal = 0_i64;
    let items: Vec<CartItemDto> = rows
        .into_iter()
        .map(|row| {
            let current_price = discounted_unit_price(row.per_unit_price, row.discount_percent);
            let line_total = current_price * i64::from(row.quantity);
            subtotal += line_total;
            CartItemDto {
                id: row.cart_id,
                medicine_id: row.medicine_id,
                item_name: row.item_name,
                image_url: row.image_url,
                per_unit_price: row.per_unit_price,
                discount_percent: row.discount_percent,
                current_price,
                quantity: row.quantity,
                line_total,
                seller_id: row.seller_id,
            }
        })
        .collect();

    let view = CartView {
        items,
        totals: order_totals(subtotal).into(),
    };

    Ok(ApiResponse::success("Cart", view, None))
}

/// Adding a medicine already in the cart increments the existing row; the
/// unique (user_id, medicine_id) index guarantees at most one row per pair.
pub async fn add_to_cart(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let medicine: Option<(i32,)> = sqlx::query_as("SELECT stock FROM medicines WHERE id = $1")
        .bind(payload.medicine_id)
        .fetch_optional(pool)
        .await?;
    let stock = match medicine {
        Some((stock,)) => stock,
        None => return Err(AppError::BadRequest("medicine not found".to_string())),
    };

    let exist: Option<CartItem> =
        sqlx::query_as("SELECT * FROM cart_items WHERE user_id = $1 AND medicine_id = $2")
            .bind(user.user_id)
            .bind(payload.medicine_id)
            .fetch_optional(pool)
            .await?;

    let requested = exist.as_ref().map_or(0, |i| i.quantity) + payload.quantity;
    if requested > stock {
        return Err(AppError::BadRequest(format!(
            "only {stock} in stock, {requested} requested"
        )));
    }

    let cart_item = if let Some(item) = exist {
        sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items
            SET quantity = quantity + $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(user.user_id)
        .bind(payload.quantity)
        .fetch_one(pool)
        .await?
    } else {
        sqlx::query_as(
            r#"
            INSERT INTO cart_items (id, user_id, medicine_id, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(payload.medicine_id)
        .bind(payload.quantity)
        .fetch_one(pool)
        .await?
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({ "medicine_id": payload.medicine_id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
    Ok(ApiResponse::success("Added to cart", cart_item, None))
}

pub async fn update_quantity(
    pool: &DbPool,
    user: &AuthUser,
    cart_item_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let stock: Option<(i32,)> = sqlx::query_as(
        r#"
        SELECT m.stock
        FROM cart_items ci
        JOIN medicines m ON m.id = ci.medicine_id
        WHERE ci.id = $1 AND ci.user_id = $2
        "#,
    )
    .bind(cart_item_id)
    .bind(user.user_id)
    .fetch_optional(pool)
    .await?;
    let stock = match stock {
        Some((stock,)) => stock,
        None => return Err(AppError::NotFound),
    };

    if payload.quantity > stock {
        return Err(AppError::BadRequest(format!(
            "only {stock} in stock, {} requested",
            payload.quantity
        )));
    }

    let cart_item = sqlx::query_as::<_, CartItem>(
        r#"
        UPDATE cart_items
        SET quantity = $3, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(cart_item_id)
    .bind(user.user_id)
    .bind(payload.quantity)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success("Quantity updated", cart_item, None))
}

pub async fn remove_item(
    pool: &DbPool,
    user: &AuthUser,
    cart_item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
        .bind(cart_item_id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "cart_item_id": cart_item_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Idempotent: clearing an already-empty cart succeeds.
pub async fn clear_cart(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Cart cleared",
        serde_json::json!({ "removed": result.rows_affected() }),
        Some(Meta::empty()),
    ))
}
