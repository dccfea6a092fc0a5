use axum::{Json, extract::State, http::StatusCode};
use oshudh_api::{
    db::{create_orm_conn, create_pool},
    dto::{
        admin::UpdatePaymentStatusRequest, auth::RegisterRequest, cart::AddToCartRequest,
        payment::SaveOrderRequest,
    },
    entity::{medicines::ActiveModel as MedicineActive, users::ActiveModel as UserActive},
    middleware::auth::AuthUser,
    models::Role,
    routes::auth,
    services::{admin_service, cart_service, payment_service, seller_service, stripe::StripeClient},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: user fills a cart -> order is saved as pending with
// server-computed totals -> admin accepts the payment.
#[tokio::test]
async fn checkout_and_payment_accept_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let state = setup_state(&database_url).await?;

    // Registration creates the account with 201.
    let (status, registered) = auth::register(
        State(state.clone()),
        Json(RegisterRequest {
            username: "newbie".into(),
            email: "newbie@example.com".into(),
            password: "pw123456".into(),
            photo_url: None,
            role: None,
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered.0.data.unwrap().role, "user");

    let buyer_id = create_user(&state, "user", "buyer@example.com").await?;
    let seller_id = create_user(&state, "seller", "seller@example.com").await?;
    let admin_id = create_user(&state, "admin", "admin@example.com").await?;

    let medicine = MedicineActive {
        id: Set(Uuid::new_v4()),
        item_name: Set("Napa Extra".into()),
        generic_name: Set("Paracetamol".into()),
        short_description: Set(None),
        image_url: Set("https://images.example/napa.jpg".into()),
        category: Set("Tablet".into()),
        company: Set("Beximco".into()),
        mass_unit: Set("500mg".into()),
        per_unit_price: Set(10_000),
        discount_percent: Set(10),
        seller_id: Set(seller_id),
        stock: Set(10),
        sales: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let buyer = AuthUser {
        user_id: buyer_id,
        email: "buyer@example.com".into(),
        role: Role::User,
    };
    let admin = AuthUser {
        user_id: admin_id,
        email: "admin@example.com".into(),
        role: Role::Admin,
    };

    // Adding the same medicine twice increments the existing row.
    cart_service::add_to_cart(
        &state.pool,
        &buyer,
        AddToCartRequest {
            medicine_id: medicine.id,
            quantity: 2,
        },
    )
    .await?;
    let second = cart_service::add_to_cart(
        &state.pool,
        &buyer,
        AddToCartRequest {
            medicine_id: medicine.id,
            quantity: 2,
        },
    )
    .await?;
    assert_eq!(second.data.unwrap().quantity, 4);

    // 4 x (10000 - 10%) = 36000; 5% tax = 1800; below the free-delivery
    // threshold so delivery is 5000.
    let cart = cart_service::view_cart(&state.pool, &buyer).await?;
    let view = cart.data.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.totals.subtotal, 36_000);
    assert_eq!(view.totals.tax, 1_800);
    assert_eq!(view.totals.delivery_charge, 5_000);
    assert_eq!(view.totals.total_amount, 42_800);

    // A wrong client-side total is rejected before anything is written.
    let mismatch = payment_service::save_order(
        &state,
        &buyer,
        SaveOrderRequest {
            payment_intent_id: "pi_test_1".into(),
            transaction_id: None,
            payment_method: "card".into(),
            expected_total: Some(42_700),
        },
    )
    .await;
    assert!(mismatch.is_err(), "expected total mismatch to be rejected");

    let saved = payment_service::save_order(
        &state,
        &buyer,
        SaveOrderRequest {
            payment_intent_id: "pi_test_1".into(),
            transaction_id: Some("txn_1".into()),
            payment_method: "card".into(),
            expected_total: Some(42_800),
        },
    )
    .await?;
    let order_view = saved.data.unwrap();
    assert_eq!(order_view.order.status, "pending");
    assert_eq!(order_view.order.total_amount, 42_800);
    assert_eq!(order_view.items.len(), 1);
    assert_eq!(order_view.items[0].unit_price, 9_000);

    // Stock decremented, sales bumped, cart emptied.
    let stock_row: (i32, i64) =
        sqlx::query_as("SELECT stock, sales FROM medicines WHERE id = $1")
            .bind(medicine.id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(stock_row, (6, 4));

    let emptied = cart_service::view_cart(&state.pool, &buyer).await?;
    assert!(emptied.data.unwrap().items.is_empty());

    // A sold medicine can no longer be deleted; past orders reference it.
    let seller = AuthUser {
        user_id: seller_id,
        email: "seller@example.com".into(),
        role: Role::Seller,
    };
    let undeletable = seller_service::delete_medicine(&state, &seller, medicine.id).await;
    assert!(
        undeletable.is_err(),
        "expected delete of an ordered medicine to be rejected"
    );

    // Clearing an already-empty cart still succeeds.
    cart_service::clear_cart(&state.pool, &buyer).await?;

    // Admin accepts the payment.
    let accepted = admin_service::update_payment_status(
        &state,
        &admin,
        order_view.order.id,
        UpdatePaymentStatusRequest {
            status: "paid".into(),
        },
    )
    .await?;
    let paid = accepted.data.unwrap();
    assert_eq!(paid.status, "paid");
    assert!(paid.paid_at.is_some());

    // Accepting twice is rejected.
    let again = admin_service::update_payment_status(
        &state,
        &admin,
        paid.id,
        UpdatePaymentStatusRequest {
            status: "paid".into(),
        },
    )
    .await;
    assert!(again.is_err(), "expected paid -> paid to be rejected");

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, cart_items, advertisements, audit_logs, medicines, categories, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        stripe: StripeClient::new("sk_test_dummy"),
    })
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(email.split('@').next().unwrap_or("user").to_string()),
        email: Set(email.to_string()),
        photo_url: Set(None),
        role: Set(role.into()),
        password_hash: Set("dummy".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}
