//! Create or reset the admin account from ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD.

use catalog_server::auth::hash_password;
use catalog_server::store::{upsert_user, ADMIN_ROLE};
use catalog_server::{ensure_auth_tables, ensure_database_exists, Settings};

fn required_env(key: &str) -> Result<String, Box<dyn std::error::Error>> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(format!("{} must be set", key).into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("catalog_server=info,create_admin=info")),
        )
        .init();

    let username = required_env("ADMIN_USERNAME")?;
    let password = required_env("ADMIN_PASSWORD")?;
    let email = std::env::var("ADMIN_EMAIL").ok().filter(|e| !e.trim().is_empty());

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect(&settings.database_url)
        .await?;
    ensure_auth_tables(&pool).await?;

    let hash = hash_password(&password)?;
    let user = upsert_user(&pool, username.trim(), email.as_deref(), &hash, ADMIN_ROLE).await?;
    tracing::info!(id = user.id, username = %user.username, "admin account ready");
    pool.close().await;
    Ok(())
}
