//! PostgreSQL client for the conditional-write store.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, postgres::PgPoolOptions};

use super::client::{ClientError, ConditionalStore, PutItem};
use super::condition::Condition;
use super::record::Attributes;

/// PostgreSQL-backed [`ConditionalStore`].
///
/// Items live in the `kv_items` table as JSONB documents keyed by
/// `(table_name, pk)`. Each put is a single statement, so the condition and
/// the write are evaluated atomically by the database.
#[derive(Clone)]
pub struct PostgresTable {
    pool: PgPool,
}

impl PostgresTable {
    /// Creates a new client over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

#[async_trait]
impl ConditionalStore for PostgresTable {
    async fn get_item(&self, table: &str, key: &str) -> Result<Option<Attributes>, ClientError> {
        let item: Option<Value> =
            sqlx::query_scalar("SELECT item FROM kv_items WHERE table_name = $1 AND pk = $2")
                .bind(table)
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(ClientError::backend)?;

        match item {
            None => Ok(None),
            Some(Value::Object(attributes)) => Ok(Some(attributes)),
            Some(other) => Err(ClientError::backend(format!(
                "item {key:?} in table {table:?} is not an object: {other}"
            ))),
        }
    }

    async fn put_item(&self, request: PutItem) -> Result<(), ClientError> {
        let PutItem {
            table,
            key,
            item,
            condition,
        } = request;
        let item = Value::Object(item);

        let result = match condition {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO kv_items (table_name, pk, item)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (table_name, pk) DO UPDATE SET item = EXCLUDED.item
                    "#,
                )
                .bind(&table)
                .bind(&key)
                .bind(&item)
                .execute(&self.pool)
                .await
            }
            Some(Condition::AttributeNotEquals { name, value }) => {
                // A missing row inserts; an existing row is replaced only
                // when its attribute differs.
                sqlx::query(
                    r#"
                    INSERT INTO kv_items (table_name, pk, item)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (table_name, pk) DO UPDATE SET item = EXCLUDED.item
                    WHERE (kv_items.item -> $4) IS DISTINCT FROM $5
                    "#,
                )
                .bind(&table)
                .bind(&key)
                .bind(&item)
                .bind(&name)
                .bind(&value)
                .execute(&self.pool)
                .await
            }
            Some(Condition::AttributeEquals { name, value }) => {
                sqlx::query(
                    r#"
                    UPDATE kv_items SET item = $3
                    WHERE table_name = $1 AND pk = $2 AND (item -> $4) = $5
                    "#,
                )
                .bind(&table)
                .bind(&key)
                .bind(&item)
                .bind(&name)
                .bind(&value)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(ClientError::backend)?;

        if result.rows_affected() == 0 {
            return Err(ClientError::ConditionalCheckFailed);
        }

        Ok(())
    }
}
