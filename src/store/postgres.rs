//! Postgres store backend.
//!
//! One row per order in `orders(order_uid TEXT PRIMARY KEY, data JSONB)`.
//! Pool sizing and acquire timeouts are explicit so a database outage fails
//! calls quickly instead of hanging the ingestion loop or request handlers.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;

use super::OrderStore;
use crate::config::Config;
use crate::error::StoreError;

/// Connection settings for [`PgOrderStore`].
#[derive(Debug, Clone)]
pub struct PgStoreConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
}

impl From<&Config> for PgStoreConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.db_host.clone(),
            port: config.db_port,
            user: config.db_user.clone(),
            password: config.db_password.clone(),
            database: config.db_name.clone(),
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout: Duration::from_secs(5),
            max_lifetime: Duration::from_secs(2 * 60 * 60),
            idle_timeout: Duration::from_secs(10 * 60),
        }
    }
}

/// [`OrderStore`] backed by a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Opens a pool and verifies the database is reachable.
    pub async fn connect(config: &PgStoreConfig) -> Result<Self, StoreError> {
        // Credentials stay in the options struct and out of the logs.
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .max_lifetime(config.max_lifetime)
            .idle_timeout(config.idle_timeout)
            .connect_with(options)
            .await
            .map_err(unavailable)?;

        info!(host = %config.host, database = %config.database, "Connected to Postgres");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|err| StoreError::Unavailable(format!("migration failed: {}", err)))?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn upsert(&self, order_uid: &str, data: &[u8]) -> Result<bool, StoreError> {
        let json = String::from_utf8_lossy(data);
        let result = sqlx::query(
            "INSERT INTO orders (order_uid, data) VALUES ($1, $2::jsonb) \
             ON CONFLICT (order_uid) DO NOTHING",
        )
        .bind(order_uid)
        .bind(json.as_ref())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(result.rows_affected() == 1)
    }

    async fn get(&self, order_uid: &str) -> Result<Vec<u8>, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT data::text FROM orders WHERE order_uid = $1")
            .bind(order_uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?
            .map(String::into_bytes)
            .ok_or_else(|| StoreError::NotFound(order_uid.to_string()))
    }

    async fn scan_all(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        let rows = sqlx::query_scalar::<_, String>("SELECT data::text FROM orders")
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        Ok(rows.into_iter().map(String::into_bytes).collect())
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::fixtures::sample_order;
    use crate::models::Order;

    #[test]
    fn test_config_from_app_config() {
        let config = PgStoreConfig::from(&Config::default());
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.database, "orders_db");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
    }

    /// Needs a reachable database in `DATABASE_URL`.
    #[tokio::test]
    #[ignore]
    async fn test_upsert_get_and_scan_against_postgres() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PgOrderStore::from_pool(PgPool::connect(&url).await.unwrap());
        store.migrate().await.unwrap();

        let order_uid = format!("pg-test-{}-{}", std::process::id(), chrono::Utc::now().timestamp_micros());
        let order = sample_order(&order_uid);
        let data = serde_json::to_vec(&order).unwrap();

        assert!(store.upsert(&order_uid, &data).await.unwrap());
        assert!(!store.upsert(&order_uid, &data).await.unwrap());

        let fetched: Order = serde_json::from_slice(&store.get(&order_uid).await.unwrap()).unwrap();
        assert_eq!(fetched, order);

        let scanned: Vec<Order> = store
            .scan_all()
            .await
            .unwrap()
            .iter()
            .map(|row| serde_json::from_slice(row).unwrap())
            .filter(|o: &Order| o.order_uid == order_uid)
            .collect();
        assert_eq!(scanned, vec![order]);

        assert!(matches!(
            store.get("pg-test-missing").await,
            Err(StoreError::NotFound(_))
        ));

        sqlx::query("DELETE FROM orders WHERE order_uid = $1")
            .bind(&order_uid)
            .execute(&store.pool)
            .await
            .unwrap();
        store.close().await;
    }
}
