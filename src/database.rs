//! database (db) union structure.
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "training";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Profile table, matching [`crate::user::LocalUser`].
///
/// List columns are JSONB arrays.
const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    account_id BIGINT PRIMARY KEY,
    account_name TEXT NOT NULL UNIQUE,
    account_names JSONB,
    avatar TEXT,
    background TEXT,
    vip TEXT,
    social_credits DOUBLE PRECISION,
    kills BIGINT,
    deaths BIGINT,
    cop_chase_rating BIGINT,
    punishments JSONB,
    verification TEXT,
    achievement TEXT,
    telegram TEXT,
    prefix TEXT,
    star TEXT,
    application_verification TEXT
)
"#;

/// Custom db structure to pass to Axum.
#[derive(Clone)]
pub struct Database {
    pub postgres: PgPool,
}

impl Database {
    /// Init database connections.
    pub async fn new(
        hostname: &str,
        username: &str,
        password: &str,
        db: &str,
        pool: u32,
    ) -> Result<Self, sqlx::Error> {
        let addr = format!("postgres://{username}:{password}@{hostname}/{db}");
        let pool = PgPoolOptions::new().max_connections(pool);
        let postgres = pool.connect(&addr).await?;

        tracing::info!(%hostname, %db, "postgres connected");

        Ok(Self { postgres })
    }

    /// Wrap an existing pool.
    pub fn from_pool(postgres: PgPool) -> Self {
        Self { postgres }
    }

    /// Create the profile table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_USERS).execute(&self.postgres).await?;
        tracing::trace!("profile table ready");
        Ok(())
    }
}
