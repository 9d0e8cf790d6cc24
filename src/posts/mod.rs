use async_trait::async_trait;
use smallvec::SmallVec;
use std::error::Error;
use std::sync::Arc;

/// A published post. Image references travel as a list in memory and are
/// stored comma-joined in the single `img` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub date: String,
    pub title: String,
    pub body: String,
    pub image_refs: SmallVec<[String; 4]>,
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Append `post` and return the number the backend assigned to it.
    /// Nothing is validated; duplicate titles and empty bodies are stored
    /// as given.
    async fn append(&self, post: &Post) -> Result<u64, Box<dyn Error + Send + Sync>>;

    /// Retrieve every post in append order, re-read from the store on each
    /// call. Callers reverse for newest-first display.
    async fn list_all(&self) -> Result<Vec<(u64, Post)>, Box<dyn Error + Send + Sync>>;

    /// Retrieve a single post by its assigned number.
    async fn get(&self, number: u64) -> Result<Option<Post>, Box<dyn Error + Send + Sync>>;
}

pub type DynPosts = Arc<dyn PostStore>;

pub mod common;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sqlite;

/// Create a post store backend from a connection URI.
pub async fn open(uri: &str) -> Result<DynPosts, Box<dyn Error + Send + Sync>> {
    if uri.starts_with("sqlite:") {
        Ok(Arc::new(sqlite::SqlitePosts::new(uri).await?))
    } else if uri.starts_with("postgres:") {
        #[cfg(feature = "postgres")]
        {
            Ok(Arc::new(postgres::PostgresPosts::new(uri).await?))
        }
        #[cfg(not(feature = "postgres"))]
        {
            Err("postgres backend not enabled".into())
        }
    } else {
        Err("unknown posts backend".into())
    }
}
