use async_trait::async_trait;
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;

/// One row of the `users` table, verbatim. The expiry stays a string at this
/// layer; the ledger owns parsing and every date decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountRecord {
    pub username: String,
    pub password: String,
    pub expiry: String,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetch the row for `username`, if any. Exact, case-sensitive match.
    async fn fetch(
        &self,
        username: &str,
    ) -> Result<Option<AccountRecord>, Box<dyn Error + Send + Sync>>;

    /// Insert a new row. The username is the primary key, so a raced
    /// duplicate surfaces as a backend error rather than a second row.
    async fn insert(&self, record: &AccountRecord) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Overwrite the stored expiry for `username`.
    async fn update_expiry(
        &self,
        username: &str,
        expiry: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Retrieve every account row.
    async fn list(&self) -> Result<Vec<AccountRecord>, Box<dyn Error + Send + Sync>>;
}

pub type DynAccounts = Arc<dyn AccountStore>;

#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sqlite;

/// Create an account store backend from a connection URI.
pub async fn open(uri: &str) -> Result<DynAccounts, Box<dyn Error + Send + Sync>> {
    if uri.starts_with("sqlite:") {
        Ok(Arc::new(sqlite::SqliteAccounts::new(uri).await?))
    } else if uri.starts_with("postgres:") {
        #[cfg(feature = "postgres")]
        {
            Ok(Arc::new(postgres::PostgresAccounts::new(uri).await?))
        }
        #[cfg(not(feature = "postgres"))]
        {
            Err("postgres backend not enabled".into())
        }
    } else {
        Err("unknown accounts backend".into())
    }
}
