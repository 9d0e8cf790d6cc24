use super::{AccountRecord, AccountStore};
use async_trait::async_trait;
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{error::Error, str::FromStr};

// Passwords are stored in cleartext and compared by equality; that is the
// behavior of the system this service keeps the books for.
const USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
        username TEXT PRIMARY KEY,
        password TEXT NOT NULL,
        expiry TEXT NOT NULL
    )";

#[derive(Clone)]
pub struct SqliteAccounts {
    pool: SqlitePool,
}

impl SqliteAccounts {
    /// Create a new `SQLite` account store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let options = SqliteConnectOptions::from_str(uri)
            .map_err(|e| format!("bad accounts database URI '{uri}': {e}"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| format!("cannot open accounts database '{uri}': {e}"))?;
        sqlx::query(USERS_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl AccountStore for SqliteAccounts {
    async fn fetch(
        &self,
        username: &str,
    ) -> Result<Option<AccountRecord>, Box<dyn Error + Send + Sync>> {
        if let Some(row) = sqlx::query("SELECT password, expiry FROM users WHERE username = ?")
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
        sqlx::query("INSERT INTO users (username, password, expiry) VALUES (?, ?, ?)")
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
        sqlx::query("UPDATE users SET expiry = ? WHERE username = ?")
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
