use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use oshudh_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin", "admin@oshudh.example", "admin123", "admin").await?;
    let seller_id =
        ensure_user(&pool, "pharma-one", "seller@oshudh.example", "seller123", "seller").await?;
    let user_id = ensure_user(&pool, "customer", "user@oshudh.example", "user123", "user").await?;

    seed_categories(&pool).await?;
    seed_medicines(&pool, seller_id).await?;

    println!("Seed completed. Admin: {admin_id}, Seller: {seller_id}, User: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_categories(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = vec![
        ("Tablet", "https://images.oshudh.example/cat-tablet.jpg"),
        ("Syrup", "https://images.oshudh.example/cat-syrup.jpg"),
        ("Capsule", "https://images.oshudh.example/cat-capsule.jpg"),
        ("Injection", "https://images.oshudh.example/cat-injection.jpg"),
        ("Others", "https://images.oshudh.example/cat-others.jpg"),
    ];

    for (name, image_url) in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, image_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(image_url)
        .execute(pool)
        .await?;
    }

    println!("Seeded categories");
    Ok(())
}

async fn seed_medicines(pool: &sqlx::PgPool, seller_id: Uuid) -> anyhow::Result<()> {
    // Prices in cents.
    let medicines = vec![
        ("Napa Extra", "Paracetamol", "Tablet", "Beximco", "500mg", 1_200_i64, 10, 500),
        ("Seclo 20", "Omeprazole", "Capsule", "Square", "20mg", 3_500, 0, 300),
        ("Tuska Syrup", "Dextromethorphan", "Syrup", "Square", "100ml", 9_000, 15, 120),
        ("Maxpro 20", "Esomeprazole", "Capsule", "Renata", "20mg", 4_000, 5, 250),
        ("Insulin N", "Insulin isophane", "Injection", "Novo", "10ml", 55_000, 0, 40),
    ];

    for (item_name, generic_name, category, company, mass_unit, price, discount, stock) in medicines
    {
        let inserted = sqlx::query(
            r#"
            INSERT INTO medicines
                (id, item_name, generic_name, short_description, image_url, category,
                 company, mass_unit, per_unit_price, discount_percent, seller_id, stock)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12
            WHERE NOT EXISTS (SELECT 1 FROM medicines WHERE item_name = $2)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(item_name)
        .bind(generic_name)
        .bind(format!("{generic_name} by {company}"))
        .bind("https://images.oshudh.example/medicine.jpg")
        .bind(category)
        .bind(company)
        .bind(mass_unit)
        .bind(price)
        .bind(discount)
        .bind(seller_id)
        .bind(stock)
        .execute(pool)
        .await?;

        if inserted.rows_affected() > 0 {
            sqlx::query("UPDATE categories SET medicine_count = medicine_count + 1 WHERE name = $1")
                .bind(category)
                .execute(pool)
                .await?;
        }
    }

    println!("Seeded medicines");
    Ok(())
}
