//! Comment repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::repositories::{timestamp_now, BindValue, WhereClause};
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentFilter, CreateCommentInput};

/// Columns matched by the free-text `q` filter
pub const SEARCH_COLUMNS: &[&str] = &["name", "email", "text"];

const COMMENT_COLUMNS: &str = "id, post_id, name, email, text, created_at, is_approved";

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a new, unapproved comment
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment>;

    /// Get a comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Comments of one post, oldest first
    async fn list_by_post(&self, post_id: i64, approved_only: bool) -> Result<Vec<Comment>>;

    /// Comments across all posts, oldest first
    async fn list(&self, filter: &CommentFilter) -> Result<Vec<Comment>>;

    /// Set the approval flag. Returns `None` when the comment does not exist.
    async fn set_approval(&self, id: i64, approved: bool) -> Result<Option<Comment>>;

    /// Delete a comment
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.require_sqlite()?, input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.require_mysql()?, input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.require_sqlite()?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.require_mysql()?, id).await,
        }
    }

    async fn list_by_post(&self, post_id: i64, approved_only: bool) -> Result<Vec<Comment>> {
        let filter = CommentFilter {
            post_id: Some(post_id),
            is_approved: approved_only.then_some(true),
            ..CommentFilter::default()
        };
        self.list(&filter).await
    }

    async fn list(&self, filter: &CommentFilter) -> Result<Vec<Comment>> {
        let clause = build_where(filter);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.require_sqlite()?, &clause).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.require_mysql()?, &clause).await,
        }
    }

    async fn set_approval(&self, id: i64, approved: bool) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                set_approval_sqlite(self.pool.require_sqlite()?, id, approved).await
            }
            DatabaseDriver::Mysql => {
                set_approval_mysql(self.pool.require_mysql()?, id, approved).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.require_sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.require_mysql()?, id).await,
        }
    }
}

fn build_where(filter: &CommentFilter) -> WhereClause {
    let mut clause = WhereClause::new();
    if let Some(q) = &filter.q {
        clause.search(SEARCH_COLUMNS, q);
    }
    if let Some(post_id) = filter.post_id {
        clause.push("post_id = ?", BindValue::Int(post_id));
    }
    if let Some(is_approved) = filter.is_approved {
        clause.push("is_approved = ?", BindValue::Bool(is_approved));
    }
    clause.time_range("created_at", filter.created_from, filter.created_to);
    clause
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, input: &CreateCommentInput) -> Result<Comment> {
    let now = timestamp_now();

    let result = sqlx::query(
        "INSERT INTO comments (post_id, name, email, text, created_at, is_approved) VALUES (?, ?, ?, ?, ?, 0)",
    )
    .bind(input.post_id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.text)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        post_id: input.post_id,
        name: input.name.clone(),
        email: input.email.clone(),
        text: input.text.clone(),
        created_at: now,
        is_approved: false,
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let sql = format!("SELECT {} FROM comments WHERE id = ?", COMMENT_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment by ID")?;

    row.map(|row| row_to_comment_sqlite(&row)).transpose()
}

async fn list_sqlite(pool: &SqlitePool, clause: &WhereClause) -> Result<Vec<Comment>> {
    let sql = format!(
        "SELECT {} FROM comments{} ORDER BY created_at ASC, id ASC",
        COMMENT_COLUMNS,
        clause.sql()
    );
    let rows = clause
        .bind_sqlite(sqlx::query(&sql))
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    rows.iter().map(row_to_comment_sqlite).collect()
}

async fn set_approval_sqlite(pool: &SqlitePool, id: i64, approved: bool) -> Result<Option<Comment>> {
    sqlx::query("UPDATE comments SET is_approved = ? WHERE id = ?")
        .bind(approved)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment approval")?;

    get_by_id_sqlite(pool, id).await
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        text: row.try_get("text")?,
        created_at: row.try_get("created_at")?,
        is_approved: row.try_get("is_approved")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, input: &CreateCommentInput) -> Result<Comment> {
    let now = timestamp_now();

    let result = sqlx::query(
        "INSERT INTO comments (post_id, name, email, text, created_at, is_approved) VALUES (?, ?, ?, ?, ?, FALSE)",
    )
    .bind(input.post_id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.text)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        post_id: input.post_id,
        name: input.name.clone(),
        email: input.email.clone(),
        text: input.text.clone(),
        created_at: now,
        is_approved: false,
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Comment>> {
    let sql = format!("SELECT {} FROM comments WHERE id = ?", COMMENT_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment by ID")?;

    row.map(|row| row_to_comment_mysql(&row)).transpose()
}

async fn list_mysql(pool: &MySqlPool, clause: &WhereClause) -> Result<Vec<Comment>> {
    let sql = format!(
        "SELECT {} FROM comments{} ORDER BY created_at ASC, id ASC",
        COMMENT_COLUMNS,
        clause.sql()
    );
    let rows = clause
        .bind_mysql(sqlx::query(&sql))
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    rows.iter().map(row_to_comment_mysql).collect()
}

async fn set_approval_mysql(pool: &MySqlPool, id: i64, approved: bool) -> Result<Option<Comment>> {
    sqlx::query("UPDATE comments SET is_approved = ? WHERE id = ?")
        .bind(approved)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment approval")?;

    get_by_id_mysql(pool, id).await
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        text: row.try_get("text")?,
        created_at: row.try_get("created_at")?,
        is_approved: row.try_get("is_approved")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{PostRepository, SqlxPostRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreatePostInput;

    async fn setup() -> (SqlxCommentRepository, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let post = SqlxPostRepository::new(pool.clone())
            .create(&CreatePostInput::new("Intro", "Hi"))
            .await
            .expect("Failed to create post");
        (SqlxCommentRepository::new(pool), post.id)
    }

    #[tokio::test]
    async fn test_create_comment_is_unapproved() {
        let (repo, post_id) = setup().await;

        let comment = repo
            .create(&CreateCommentInput::new(post_id, "Ann", "ann@x.com", "Nice!"))
            .await
            .expect("Failed to create comment");

        assert!(comment.id > 0);
        assert!(!comment.is_approved);
        assert_eq!(repo.get_by_id(comment.id).await.unwrap(), Some(comment));
    }

    #[tokio::test]
    async fn test_create_comment_for_missing_post_fails() {
        let (repo, _post_id) = setup().await;
        let result = repo
            .create(&CreateCommentInput::new(999, "Ann", "ann@x.com", "Nice!"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_by_post_is_chronological_and_filtered() {
        let (repo, post_id) = setup().await;

        let first = repo
            .create(&CreateCommentInput::new(post_id, "A", "a@x.com", "one"))
            .await
            .unwrap();
        let second = repo
            .create(&CreateCommentInput::new(post_id, "B", "b@x.com", "two"))
            .await
            .unwrap();

        let all = repo.list_by_post(post_id, false).await.unwrap();
        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![first.id, second.id]);

        assert!(repo.list_by_post(post_id, true).await.unwrap().is_empty());

        repo.set_approval(second.id, true).await.unwrap();
        let approved = repo.list_by_post(post_id, true).await.unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, second.id);
    }

    #[tokio::test]
    async fn test_set_approval_is_idempotent() {
        let (repo, post_id) = setup().await;
        let comment = repo
            .create(&CreateCommentInput::new(post_id, "Ann", "ann@x.com", "Nice!"))
            .await
            .unwrap();

        let once = repo.set_approval(comment.id, true).await.unwrap().unwrap();
        let twice = repo.set_approval(comment.id, true).await.unwrap().unwrap();
        assert_eq!(once, twice);
        assert!(twice.is_approved);

        let back = repo.set_approval(comment.id, false).await.unwrap().unwrap();
        assert!(!back.is_approved);

        assert!(repo.set_approval(999, true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_search() {
        let (repo, post_id) = setup().await;
        repo.create(&CreateCommentInput::new(post_id, "Ann", "ann@x.com", "Great read"))
            .await
            .unwrap();
        repo.create(&CreateCommentInput::new(post_id, "Bob", "bob@y.org", "meh"))
            .await
            .unwrap();

        let filter = CommentFilter {
            q: Some("GREAT".to_string()),
            ..CommentFilter::default()
        };
        let found = repo.list(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ann");

        let filter = CommentFilter {
            q: Some("y.org".to_string()),
            ..CommentFilter::default()
        };
        assert_eq!(repo.list(&filter).await.unwrap()[0].name, "Bob");
    }

    #[tokio::test]
    async fn test_delete_comment() {
        let (repo, post_id) = setup().await;
        let comment = repo
            .create(&CreateCommentInput::new(post_id, "Ann", "ann@x.com", "Nice!"))
            .await
            .unwrap();

        assert!(repo.delete(comment.id).await.unwrap());
        assert!(!repo.delete(comment.id).await.unwrap());
        assert!(repo.get_by_id(comment.id).await.unwrap().is_none());
    }
}
