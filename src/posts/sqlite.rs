use super::{
    Post, PostStore,
    common::{join_image_refs, split_image_refs},
};
use async_trait::async_trait;
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{error::Error, str::FromStr};

// Numbers are assigned by the store so display order never depends on the
// backend preserving insertion order.
const POSTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS posts (
        number INTEGER PRIMARY KEY,
        date TEXT NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        img TEXT NOT NULL DEFAULT ''
    )";

#[derive(Clone)]
pub struct SqlitePosts {
    pool: SqlitePool,
}

impl SqlitePosts {
    /// Create a new `SQLite` post store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let options = SqliteConnectOptions::from_str(uri)
            .map_err(|e| format!("bad posts database URI '{uri}': {e}"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| format!("cannot open posts database '{uri}': {e}"))?;
        sqlx::query(POSTS_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

fn post_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Post, Box<dyn Error + Send + Sync>> {
    let img: String = row.try_get("img")?;
    Ok(Post {
        date: row.try_get("date")?,
        title: row.try_get("title")?,
        body: row.try_get("content")?,
        image_refs: split_image_refs(&img),
    })
}

#[async_trait]
impl PostStore for SqlitePosts {
    #[tracing::instrument(skip_all)]
    async fn append(&self, post: &Post) -> Result<u64, Box<dyn Error + Send + Sync>> {
        let next: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(number),0)+1 FROM posts")
            .fetch_one(&self.pool)
            .await?;

        sqlx::query("INSERT INTO posts (number, date, title, content, img) VALUES (?, ?, ?, ?, ?)")
            .bind(next)
            .bind(&post.date)
            .bind(&post.title)
            .bind(&post.body)
            .bind(join_image_refs(&post.image_refs))
            .execute(&self.pool)
            .await?;

        Ok(u64::try_from(next).unwrap_or(0))
    }

    #[tracing::instrument(skip_all)]
    async fn list_all(&self) -> Result<Vec<(u64, Post)>, Box<dyn Error + Send + Sync>> {
        let rows =
            sqlx::query("SELECT number, date, title, content, img FROM posts ORDER BY number")
                .fetch_all(&self.pool)
                .await?;
        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            let number: i64 = row.try_get("number")?;
            posts.push((u64::try_from(number).unwrap_or(0), post_from_row(&row)?));
        }
        Ok(posts)
    }

    #[tracing::instrument(skip_all)]
    async fn get(&self, number: u64) -> Result<Option<Post>, Box<dyn Error + Send + Sync>> {
        if let Some(row) =
            sqlx::query("SELECT number, date, title, content, img FROM posts WHERE number = ?")
                .bind(i64::try_from(number).unwrap_or(-1))
                .fetch_optional(&self.pool)
                .await?
        {
            Ok(Some(post_from_row(&row)?))
        } else {
            Ok(None)
        }
    }
}
