use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DbBackend, EntityTrait, FromQueryResult, QueryFilter, Set, Statement,
    TransactionTrait,
};
use sea_orm::ActiveModelTrait;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::payment::{CreateIntentResponse, OrderWithItems, SaveOrderRequest},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        medicines::{Column as MedicineCol, Entity as Medicines},
        order_items::ActiveModel as OrderItemActive,
        orders::ActiveModel as OrderActive,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::OrderItem,
    pricing::{OrderTotals, discounted_unit_price, order_totals},
    response::{ApiResponse, Meta},
    services::order_service::{order_from_entity, order_item_from_entity},
    state::AppState,
};

#[derive(Debug, FromQueryResult)]
struct CartLine {
    medicine_id: Uuid,
    seller_id: Uuid,
    item_name: String,
    quantity: i32,
    per_unit_price: i64,
    discount_percent: i32,
    stock: i32,
}

const CART_LINES_SQL: &str = r#"
    SELECT ci.medicine_id, m.seller_id, m.item_name, ci.quantity,
           m.per_unit_price, m.discount_percent, m.stock
    FROM cart_items ci
    JOIN medicines m ON m.id = ci.medicine_id
    WHERE ci.user_id = $1
    ORDER BY ci.created_at
"#;

fn totals_for(lines: &[CartLine]) -> AppResult<OrderTotals> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    let mut subtotal = 0_i64;
    for line in lines {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        let unit = discounted_unit_price(line.per_unit_price, line.discount_percent);
        subtotal += unit * i64::from(line.quantity);
    }
    Ok(order_totals(subtotal))
}

/// Create a Stripe PaymentIntent for the caller's cart. The amount is the
/// server's own computation; the client only receives the secret plus the
/// breakdown it should display.
pub async fn create_intent(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CreateIntentResponse>> {
    let lines = CartLine::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        CART_LINES_SQL,
        [user.user_id.into()],
    ))
    .all(&state.orm)
    .await?;

    let totals = totals_for(&lines)?;

    let intent = state
        .stripe
        .create_payment_intent(totals.total_amount, "usd")
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_intent_created",
        Some("orders"),
        Some(serde_json::json!({ "payment_intent_id": intent.id, "amount": totals.total_amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment intent created",
        CreateIntentResponse {
            client_secret: intent.client_secret,
            payment_intent_id: intent.id,
            totals: totals.into(),
        },
        Some(Meta::empty()),
    ))
}

/// Persist the order after the client confirmed the payment. Everything is
/// recomputed from the cart inside one transaction: stock is checked and
/// decremented, sales counters bumped, the cart emptied. The order starts
/// as "pending" until an admin accepts the payment.
pub async fn save_order(
    state: &AppState,
    user: &AuthUser,
    payload: SaveOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    // Lock the joined medicine rows so concurrent checkouts cannot
    // oversell the same stock.
    let locked_sql = format!("{CART_LINES_SQL} FOR UPDATE OF m");
    let lines = CartLine::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        locked_sql.as_str(),
        [user.user_id.into()],
    ))
    .all(&txn)
    .await?;

    let totals = totals_for(&lines)?;

    if let Some(expected) = payload.expected_total {
        if expected != totals.total_amount {
            return Err(AppError::BadRequest(format!(
                "total mismatch: client sent {expected}, server computed {}",
                totals.total_amount
            )));
        }
    }

    for line in &lines {
        if line.stock < line.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                line.item_name
            )));
        }
    }

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        order_number: Set(build_order_number(order_id)),
        user_id: Set(user.user_id),
        payment_intent_id: Set(Some(payload.payment_intent_id.clone())),
        transaction_id: Set(payload.transaction_id.clone()),
        payment_method: Set(payload.payment_method.clone()),
        subtotal: Set(totals.subtotal),
        tax: Set(totals.tax),
        delivery_charge: Set(totals.delivery_charge),
        total_amount: Set(totals.total_amount),
        status: Set("pending".into()),
        paid_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::new();
    for line in &lines {
        let unit_price = discounted_unit_price(line.per_unit_price, line.discount_percent);
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            medicine_id: Set(line.medicine_id),
            seller_id: Set(line.seller_id),
            item_name: Set(line.item_name.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(unit_price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        order_items.push(order_item_from_entity(item));

        Medicines::update_many()
            .col_expr(
                MedicineCol::Stock,
                Expr::col(MedicineCol::Stock).sub(line.quantity),
            )
            .col_expr(
                MedicineCol::Sales,
                Expr::col(MedicineCol::Sales).add(line.quantity),
            )
            .filter(MedicineCol::Id.eq(line.medicine_id))
            .exec(&txn)
            .await?;
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_saved",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "payment_intent_id": payload.payment_intent_id,
            "total_amount": order.total_amount,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order saved",
        OrderWithItems {
            order: order_from_entity(order),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

fn build_order_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.to_string();
    let short = &suffix[..8];
    format!("OSH-{}-{}", date, short)
}
