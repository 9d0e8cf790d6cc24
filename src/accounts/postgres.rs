use super::{AccountRecord, AccountStore};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use std::error::Error;

#[derive(Clone)]
pub struct PostgresAccounts {
    pool: PgPool,
}

impl PostgresAccounts {
    /// Create a new Postgres account store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let pool = PgPoolOptions::new().max_connections(5).connect(uri).await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                    username TEXT PRIMARY KEY,
                    password TEXT NOT NULL,
                    expiry TEXT NOT NULL
                )",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl AccountStore for PostgresAccounts {
    async fn fetch(
        &self,
        username: &str,
    ) -> Result<Option<AccountRecord>, Box<dyn Error + Send + Sync>> {
        if let Some(row) = sqlx::query("SELECT password, expiry FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
        {
            Ok(Some(AccountRecord {
                username: username.to_string(),
                password: row.try_get("password")?,
                expiry: row.try_get("expiry")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn insert(&self, record: &AccountRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        sqlx::query("INSERT INTO users (username, password, expiry) VALUES ($1, $2, $3)")
            .bind(&record.username)
            .bind(&record.password)
            .bind(&record.expiry)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_expiry(
        &self,
        username: &str,
        expiry: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        sqlx::query("UPDATE users SET expiry = $1 WHERE username = $2")
            .bind(expiry)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AccountRecord>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query("SELECT username, password, expiry FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        let mut accounts = Vec::with_capacity(rows.len());
        for row in rows {
            accounts.push(AccountRecord {
                username: row.try_get("username")?,
                password: row.try_get("password")?,
                expiry: row.try_get("expiry")?,
            });
        }
        Ok(accounts)
    }
}
