//! Blog post repository
//!
//! This module provides:
//! - `PostRepository` trait defining the interface for post data access
//! - `SqlxPostRepository` implementing the trait for SQLite and MySQL
//!
//! The view counter and the cascade delete run inside a transaction so that
//! concurrent callers serialize through the database.

use crate::config::DatabaseDriver;
use crate::db::repositories::{timestamp_now, BindValue, WhereClause};
use crate::db::DynDatabasePool;
use crate::models::{BlogPost, CreatePostInput, PostFilter, UpdatePostInput, DEFAULT_AUTHOR};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Columns matched by the free-text `q` filter
pub const SEARCH_COLUMNS: &[&str] = &["title", "content", "author"];

const POST_COLUMNS: &str =
    "id, title, content, author, created_at, updated_at, is_published, view_count";

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post. Inputs are expected to be validated already.
    async fn create(&self, input: &CreatePostInput) -> Result<BlogPost>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<BlogPost>>;

    /// Check whether a post exists
    async fn exists(&self, id: i64) -> Result<bool>;

    /// List posts newest first
    async fn list(&self, filter: &PostFilter) -> Result<Vec<BlogPost>>;

    /// Count all posts
    async fn count(&self) -> Result<i64>;

    /// Apply the present fields and refresh `updated_at`.
    /// Returns `None` when the post does not exist.
    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Option<BlogPost>>;

    /// Add one view and refresh `updated_at`.
    /// Returns `None` when the post does not exist.
    async fn increment_views(&self, id: i64) -> Result<Option<BlogPost>>;

    /// Like `increment_views`, but only for a published post.
    /// Returns `None` when the post does not exist or is unpublished.
    async fn increment_published_views(&self, id: i64) -> Result<Option<BlogPost>>;

    /// Delete a post together with its comments.
    /// Returns `false` when the post does not exist.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput) -> Result<BlogPost> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_post_sqlite(self.pool.require_sqlite()?, input).await,
            DatabaseDriver::Mysql => create_post_mysql(self.pool.require_mysql()?, input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<BlogPost>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_by_id_sqlite(self.pool.require_sqlite()?, id).await,
            DatabaseDriver::Mysql => get_post_by_id_mysql(self.pool.require_mysql()?, id).await,
        }
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => post_exists_sqlite(self.pool.require_sqlite()?, id).await,
            DatabaseDriver::Mysql => post_exists_mysql(self.pool.require_mysql()?, id).await,
        }
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<BlogPost>> {
        let clause = build_where(filter);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_posts_sqlite(self.pool.require_sqlite()?, &clause).await,
            DatabaseDriver::Mysql => list_posts_mysql(self.pool.require_mysql()?, &clause).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_posts_sqlite(self.pool.require_sqlite()?).await,
            DatabaseDriver::Mysql => count_posts_mysql(self.pool.require_mysql()?).await,
        }
    }

    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Option<BlogPost>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_post_sqlite(self.pool.require_sqlite()?, id, input).await,
            DatabaseDriver::Mysql => update_post_mysql(self.pool.require_mysql()?, id, input).await,
        }
    }

    async fn increment_views(&self, id: i64) -> Result<Option<BlogPost>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => increment_views_sqlite(self.pool.require_sqlite()?, id, false).await,
            DatabaseDriver::Mysql => increment_views_mysql(self.pool.require_mysql()?, id, false).await,
        }
    }

    async fn increment_published_views(&self, id: i64) -> Result<Option<BlogPost>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => increment_views_sqlite(self.pool.require_sqlite()?, id, true).await,
            DatabaseDriver::Mysql => increment_views_mysql(self.pool.require_mysql()?, id, true).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_post_sqlite(self.pool.require_sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_post_mysql(self.pool.require_mysql()?, id).await,
        }
    }
}

fn build_where(filter: &PostFilter) -> WhereClause {
    let mut clause = WhereClause::new();
    if let Some(q) = &filter.q {
        clause.search(SEARCH_COLUMNS, q);
    }
    if let Some(is_published) = filter.is_published {
        clause.push("is_published = ?", BindValue::Bool(is_published));
    }
    if let Some(author) = &filter.author {
        clause.push("author = ?", BindValue::Text(author.clone()));
    }
    clause.time_range("created_at", filter.created_from, filter.created_to);
    clause
}

fn author_or_default(input: &CreatePostInput) -> String {
    input
        .author
        .clone()
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string())
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, input: &CreatePostInput) -> Result<BlogPost> {
    let now = timestamp_now();
    let author = author_or_default(input);

    let result = sqlx::query(
        r#"
        INSERT INTO blog_posts (title, content, author, created_at, updated_at, is_published, view_count)
        VALUES (?, ?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(&author)
    .bind(now)
    .bind(now)
    .bind(input.is_published)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(BlogPost {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        content: input.content.clone(),
        author,
        created_at: now,
        updated_at: now,
        is_published: input.is_published,
        view_count: 0,
    })
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<BlogPost>> {
    let sql = format!("SELECT {} FROM blog_posts WHERE id = ?", POST_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    row.map(|row| row_to_post_sqlite(&row)).transpose()
}

async fn post_exists_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM blog_posts WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .context("Failed to check post existence")?;

    let count: i64 = row.try_get("count")?;
    Ok(count > 0)
}

async fn list_posts_sqlite(pool: &SqlitePool, clause: &WhereClause) -> Result<Vec<BlogPost>> {
    let sql = format!(
        "SELECT {} FROM blog_posts{} ORDER BY created_at DESC, id DESC",
        POST_COLUMNS,
        clause.sql()
    );
    let rows = clause
        .bind_sqlite(sqlx::query(&sql))
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    rows.iter().map(row_to_post_sqlite).collect()
}

async fn count_posts_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM blog_posts")
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.try_get("count")?)
}

async fn update_post_sqlite(
    pool: &SqlitePool,
    id: i64,
    input: &UpdatePostInput,
) -> Result<Option<BlogPost>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        UPDATE blog_posts
        SET title = COALESCE(?, title),
            content = COALESCE(?, content),
            author = COALESCE(?, author),
            is_published = COALESCE(?, is_published),
            updated_at = MAX(?, created_at)
        WHERE id = ?
        "#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(&input.author)
    .bind(input.is_published)
    .bind(timestamp_now())
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to update post")?;

    if result.rows_affected() == 0 {
        tx.rollback().await.context("Failed to roll back transaction")?;
        return Ok(None);
    }

    let sql = format!("SELECT {} FROM blog_posts WHERE id = ?", POST_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read post after update")?;
    let post = row_to_post_sqlite(&row)?;

    tx.commit().await.context("Failed to commit post update")?;
    Ok(Some(post))
}

/// Extra condition restricting a view increment to published posts
fn published_condition(published_only: bool) -> &'static str {
    if published_only {
        " AND is_published = TRUE"
    } else {
        ""
    }
}

async fn increment_views_sqlite(
    pool: &SqlitePool,
    id: i64,
    published_only: bool,
) -> Result<Option<BlogPost>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let sql = format!(
        "UPDATE blog_posts SET view_count = view_count + 1, updated_at = MAX(?, created_at) WHERE id = ?{}",
        published_condition(published_only)
    );
    let result = sqlx::query(&sql)
        .bind(timestamp_now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to increment view count")?;

    if result.rows_affected() == 0 {
        tx.rollback().await.context("Failed to roll back transaction")?;
        return Ok(None);
    }

    let sql = format!("SELECT {} FROM blog_posts WHERE id = ?", POST_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read post after view increment")?;
    let post = row_to_post_sqlite(&row)?;

    tx.commit().await.context("Failed to commit view increment")?;
    Ok(Some(post))
}

async fn delete_post_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("DELETE FROM comments WHERE post_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete post comments")?;

    let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete post")?;

    if result.rows_affected() == 0 {
        tx.rollback().await.context("Failed to roll back transaction")?;
        return Ok(false);
    }

    tx.commit().await.context("Failed to commit post deletion")?;
    Ok(true)
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<BlogPost> {
    Ok(BlogPost {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        is_published: row.try_get("is_published")?,
        view_count: row.try_get("view_count")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, input: &CreatePostInput) -> Result<BlogPost> {
    let now = timestamp_now();
    let author = author_or_default(input);

    let result = sqlx::query(
        r#"
        INSERT INTO blog_posts (title, content, author, created_at, updated_at, is_published, view_count)
        VALUES (?, ?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(&author)
    .bind(now)
    .bind(now)
    .bind(input.is_published)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(BlogPost {
        id: result.last_insert_id() as i64,
        title: input.title.clone(),
        content: input.content.clone(),
        author,
        created_at: now,
        updated_at: now,
        is_published: input.is_published,
        view_count: 0,
    })
}

async fn get_post_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<BlogPost>> {
    let sql = format!("SELECT {} FROM blog_posts WHERE id = ?", POST_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    row.map(|row| row_to_post_mysql(&row)).transpose()
}

async fn post_exists_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM blog_posts WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .context("Failed to check post existence")?;

    let count: i64 = row.try_get("count")?;
    Ok(count > 0)
}

async fn list_posts_mysql(pool: &MySqlPool, clause: &WhereClause) -> Result<Vec<BlogPost>> {
    let sql = format!(
        "SELECT {} FROM blog_posts{} ORDER BY created_at DESC, id DESC",
        POST_COLUMNS,
        clause.sql()
    );
    let rows = clause
        .bind_mysql(sqlx::query(&sql))
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    rows.iter().map(row_to_post_mysql).collect()
}

async fn count_posts_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM blog_posts")
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.try_get("count")?)
}

/// MySQL reports changed rows rather than matched rows, so existence is
/// checked with a locking read before writing.
async fn lock_post_mysql(
    tx: &mut sqlx::Transaction<'_, sqlx::MySql>,
    id: i64,
) -> Result<bool> {
    let row = sqlx::query("SELECT id FROM blog_posts WHERE id = ? FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .context("Failed to lock post")?;
    Ok(row.is_some())
}

async fn update_post_mysql(
    pool: &MySqlPool,
    id: i64,
    input: &UpdatePostInput,
) -> Result<Option<BlogPost>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    if !lock_post_mysql(&mut tx, id).await? {
        tx.rollback().await.context("Failed to roll back transaction")?;
        return Ok(None);
    }

    sqlx::query(
        r#"
        UPDATE blog_posts
        SET title = COALESCE(?, title),
            content = COALESCE(?, content),
            author = COALESCE(?, author),
            is_published = COALESCE(?, is_published),
            updated_at = GREATEST(?, created_at)
        WHERE id = ?
        "#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(&input.author)
    .bind(input.is_published)
    .bind(timestamp_now())
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to update post")?;

    let sql = format!("SELECT {} FROM blog_posts WHERE id = ?", POST_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read post after update")?;
    let post = row_to_post_mysql(&row)?;

    tx.commit().await.context("Failed to commit post update")?;
    Ok(Some(post))
}

async fn increment_views_mysql(
    pool: &MySqlPool,
    id: i64,
    published_only: bool,
) -> Result<Option<BlogPost>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    if !lock_post_mysql(&mut tx, id).await? {
        tx.rollback().await.context("Failed to roll back transaction")?;
        return Ok(None);
    }

    // view_count always changes, so changed rows equal matched rows here
    let sql = format!(
        "UPDATE blog_posts SET view_count = view_count + 1, updated_at = GREATEST(?, created_at) WHERE id = ?{}",
        published_condition(published_only)
    );
    let result = sqlx::query(&sql)
        .bind(timestamp_now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to increment view count")?;

    if result.rows_affected() == 0 {
        tx.rollback().await.context("Failed to roll back transaction")?;
        return Ok(None);
    }

    let sql = format!("SELECT {} FROM blog_posts WHERE id = ?", POST_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read post after view increment")?;
    let post = row_to_post_mysql(&row)?;

    tx.commit().await.context("Failed to commit view increment")?;
    Ok(Some(post))
}

async fn delete_post_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("DELETE FROM comments WHERE post_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete post comments")?;

    let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete post")?;

    if result.rows_affected() == 0 {
        tx.rollback().await.context("Failed to roll back transaction")?;
        return Ok(false);
    }

    tx.commit().await.context("Failed to commit post deletion")?;
    Ok(true)
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Result<BlogPost> {
    Ok(BlogPost {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        is_published: row.try_get("is_published")?,
        view_count: row.try_get("view_count")?,
    })
}
