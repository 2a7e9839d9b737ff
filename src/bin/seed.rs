use axum_pos_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    middleware::auth::issue_token,
};
use rust_decimal::Decimal;
use uuid::Uuid;

const TOKEN_TTL_HOURS: i64 = 24 * 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let owner_id = ensure_user(&pool, "owner@example.com", "Demo Owner").await?;
    let employee_id = ensure_user(&pool, "cashier@example.com", "Demo Cashier").await?;
    let store_id = ensure_store(&pool, "Demo Store", Decimal::from(16)).await?;
    ensure_member(&pool, store_id, owner_id, "owner").await?;
    ensure_member(&pool, store_id, employee_id, "employee").await?;
    seed_products(&pool, store_id).await?;

    let owner_token = issue_token(owner_id, &config.jwt_secret, TOKEN_TTL_HOURS)?;
    let employee_token = issue_token(employee_id, &config.jwt_secret, TOKEN_TTL_HOURS)?;

    println!("Seed completed. Store ID: {store_id}");
    println!("Owner    {owner_id}\n  Bearer {owner_token}");
    println!("Employee {employee_id}\n  Bearer {employee_token}");
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, name: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email}");
    Ok(id)
}

async fn ensure_store(pool: &sqlx::PgPool, name: &str, tax_rate: Decimal) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM stores WHERE name = $1 LIMIT 1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO stores (id, name, currency, tax_rate) VALUES ($1, $2, 'usd', $3) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(tax_rate)
    .fetch_one(pool)
    .await?;

    println!("Created store {name} (tax {tax_rate}%)");
    Ok(id)
}

async fn ensure_member(
    pool: &sqlx::PgPool,
    store_id: Uuid,
    user_id: Uuid,
    role: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO store_users (store_id, user_id, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (store_id, user_id) DO UPDATE SET role = EXCLUDED.role
        "#,
    )
    .bind(store_id)
    .bind(user_id)
    .bind(role)
    .execute(pool)
    .await?;
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool, store_id: Uuid) -> anyhow::Result<()> {
    // (name, sku, barcode, price, cost, stock_venta, stock_deposito)
    let products = [
        ("Coffee Beans 1kg", "COF-001", "7501000000011", "18.50", "11.00", 40, 120),
        ("Ceramic Mug", "MUG-001", "7501000000028", "10.00", "4.25", 5, 30),
        ("Paper Filters x100", "FIL-100", "7501000000035", "3.99", "1.20", 3, 10),
        ("Milk Frother", "FRO-001", "7501000000042", "24.90", "15.00", 8, 0),
    ];

    for (name, sku, barcode, price, cost, venta, deposito) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, store_id, name, sku, barcode, price, cost, stock_venta, stock_deposito)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (store_id, sku) WHERE sku IS NOT NULL DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(store_id)
        .bind(name)
        .bind(sku)
        .bind(barcode)
        .bind(price.parse::<Decimal>()?)
        .bind(cost.parse::<Decimal>()?)
        .bind(venta)
        .bind(deposito)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
