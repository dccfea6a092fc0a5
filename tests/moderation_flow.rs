use oshudh_api::{
    db::{create_orm_conn, create_pool},
    dto::admin::{
        AdAction, CreateCategoryRequest, ToggleAdvertisementRequest, UpdateRoleRequest,
    },
    dto::seller::{CreateAdvertisementRequest, CreateMedicineRequest},
    middleware::auth::AuthUser,
    models::Role,
    services::{admin_service, catalog_service, seller_service, stripe::StripeClient},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

use oshudh_api::entity::users::ActiveModel as UserActive;

// Moderation flow: seller requests an advertisement -> admin approves and
// activates it -> it shows up in the public slider. Plus the category and
// role guard rails.
#[tokio::test]
async fn advertisement_category_and_role_guards() -> anyhow::Result<()> {
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

    let seller_id = create_user(&state, "seller", "seller@example.com").await?;
    let admin_id = create_user(&state, "admin", "admin@example.com").await?;

    let seller = AuthUser {
        user_id: seller_id,
        email: "seller@example.com".into(),
        role: Role::Seller,
    };
    let admin = AuthUser {
        user_id: admin_id,
        email: "admin@example.com".into(),
        role: Role::Admin,
    };

    // A seller cannot reach admin surfaces.
    let forbidden = admin_service::stats(&state, &seller).await;
    assert!(forbidden.is_err(), "expected seller to be rejected");

    let category = admin_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Syrup".into(),
            image_url: "https://images.example/syrup.jpg".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let medicine = seller_service::create_medicine(
        &state,
        &seller,
        CreateMedicineRequest {
            item_name: "Tuska Syrup".into(),
            generic_name: "Dextromethorphan".into(),
            short_description: None,
            image_url: "https://images.example/tuska.jpg".into(),
            category: "Syrup".into(),
            company: "Square".into(),
            mass_unit: "100ml".into(),
            per_unit_price: 9_000,
            discount_percent: None,
            stock: 50,
        },
    )
    .await?
    .data
    .unwrap();

    // The category now carries a medicine, so deleting it is rejected.
    let blocked = admin_service::delete_category(&state, &admin, category.id).await;
    assert!(blocked.is_err(), "expected delete of non-empty category to fail");

    let ad = seller_service::create_advertisement(
        &state,
        &seller,
        CreateAdvertisementRequest {
            medicine_id: medicine.id,
            description: "Monsoon cough relief".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(ad.admin_status, "pending");
    assert!(!ad.is_active);

    // A second pending request for the same medicine is rejected.
    let duplicate = seller_service::create_advertisement(
        &state,
        &seller,
        CreateAdvertisementRequest {
            medicine_id: medicine.id,
            description: "Again".into(),
        },
    )
    .await;
    assert!(duplicate.is_err(), "expected duplicate pending ad to be rejected");

    // Activating before approval is rejected.
    let premature = admin_service::toggle_advertisement(
        &state,
        &admin,
        ad.id,
        ToggleAdvertisementRequest {
            action: AdAction::Activate,
        },
    )
    .await;
    assert!(premature.is_err(), "expected activate of pending ad to fail");

    let approved = admin_service::toggle_advertisement(
        &state,
        &admin,
        ad.id,
        ToggleAdvertisementRequest {
            action: AdAction::Approve,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(approved.admin_status, "approved");
    assert!(!approved.is_active);

    let activated = admin_service::toggle_advertisement(
        &state,
        &admin,
        ad.id,
        ToggleAdvertisementRequest {
            action: AdAction::Activate,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(activated.is_active);
    assert_eq!(activated.priority, 1);
    assert!(activated.activated_at.is_some());

    // The public slider picks it up.
    let slider = catalog_service::active_advertisements(&state).await?.data.unwrap();
    assert!(slider.items.iter().any(|a| a.id == ad.id));

    // A second activation lands behind the first one.
    let second_med = seller_service::create_medicine(
        &state,
        &seller,
        CreateMedicineRequest {
            item_name: "Remedil Syrup".into(),
            generic_name: "Ambroxol".into(),
            short_description: None,
            image_url: "https://images.example/remedil.jpg".into(),
            category: "Syrup".into(),
            company: "Renata".into(),
            mass_unit: "100ml".into(),
            per_unit_price: 7_500,
            discount_percent: None,
            stock: 30,
        },
    )
    .await?
    .data
    .unwrap();
    let second_ad = seller_service::create_advertisement(
        &state,
        &seller,
        CreateAdvertisementRequest {
            medicine_id: second_med.id,
            description: "New on the shelf".into(),
        },
    )
    .await?
    .data
    .unwrap();
    admin_service::toggle_advertisement(
        &state,
        &admin,
        second_ad.id,
        ToggleAdvertisementRequest {
            action: AdAction::Approve,
        },
    )
    .await?;
    let second_active = admin_service::toggle_advertisement(
        &state,
        &admin,
        second_ad.id,
        ToggleAdvertisementRequest {
            action: AdAction::Activate,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(second_active.priority, 2);

    // Deleting an unsold medicine sweeps its advertisement rows along.
    seller_service::delete_medicine(&state, &seller, second_med.id).await?;
    let slider_after = catalog_service::active_advertisements(&state).await?.data.unwrap();
    assert!(slider_after.items.iter().all(|a| a.id != second_ad.id));

    // Admins cannot demote themselves, and the last admin cannot be demoted.
    let self_demotion = admin_service::update_role(
        &state,
        &admin,
        admin_id,
        UpdateRoleRequest { role: Role::User },
    )
    .await;
    assert!(self_demotion.is_err(), "expected self-demotion to be rejected");

    // With two admins a demotion goes through; once only one is left, a
    // still-valid admin token may not take that account down too.
    let second_admin_id = create_user(&state, "admin", "admin2@example.com").await?;
    let second_admin = AuthUser {
        user_id: second_admin_id,
        email: "admin2@example.com".into(),
        role: Role::Admin,
    };
    let demoted = admin_service::update_role(
        &state,
        &second_admin,
        admin_id,
        UpdateRoleRequest { role: Role::User },
    )
    .await?;
    assert_eq!(demoted.data.unwrap().role, "user");

    let last_admin = admin_service::update_role(
        &state,
        &admin,
        second_admin_id,
        UpdateRoleRequest { role: Role::User },
    )
    .await;
    assert!(
        last_admin.is_err(),
        "expected demotion of the last remaining admin to be rejected"
    );

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
