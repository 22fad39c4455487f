//! Category repository
//!
//! Database operations for categories.
//!
//! This module provides:
//! - `CategoryRepository` trait defining the interface for category data access
//! - `SqlxCategoryRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::repositories::WhereClause;
use crate::db::DynDatabasePool;
use crate::models::{Category, CategoryFilter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Columns matched by the free-text `q` filter
pub const SEARCH_COLUMNS: &[&str] = &["name"];

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category; `category.id` is ignored
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List categories ordered by name
    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>>;

    /// Overwrite name, slug and description. Returns `None` when missing.
    async fn update(&self, category: &Category) -> Result<Option<Category>>;

    /// Delete a category
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Check if a category name is taken, optionally ignoring one record
    async fn exists_by_name(&self, name: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// Check if a category slug is taken, optionally ignoring one record
    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;
}

/// SQLx-based category repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_category_sqlite(self.pool.require_sqlite()?, category).await
            }
            DatabaseDriver::Mysql => {
                create_category_mysql(self.pool.require_mysql()?, category).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_category_by_id_sqlite(self.pool.require_sqlite()?, id).await
            }
            DatabaseDriver::Mysql => {
                get_category_by_id_mysql(self.pool.require_mysql()?, id).await
            }
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_category_by_slug_sqlite(self.pool.require_sqlite()?, slug).await
            }
            DatabaseDriver::Mysql => {
                get_category_by_slug_mysql(self.pool.require_mysql()?, slug).await
            }
        }
    }

    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>> {
        let mut clause = WhereClause::new();
        if let Some(q) = &filter.q {
            clause.search(SEARCH_COLUMNS, q);
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_categories_sqlite(self.pool.require_sqlite()?, &clause).await
            }
            DatabaseDriver::Mysql => {
                list_categories_mysql(self.pool.require_mysql()?, &clause).await
            }
        }
    }

    async fn update(&self, category: &Category) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_category_sqlite(self.pool.require_sqlite()?, category).await
            }
            DatabaseDriver::Mysql => {
                update_category_mysql(self.pool.require_mysql()?, category).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_category_sqlite(self.pool.require_sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_category_mysql(self.pool.require_mysql()?, id).await,
        }
    }

    async fn exists_by_name(&self, name: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.exists_by_column("name", name, exclude_id).await
    }

    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.exists_by_column("slug", slug, exclude_id).await
    }
}

impl SqlxCategoryRepository {
    async fn exists_by_column(
        &self,
        column: &'static str,
        value: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        // id 0 is never assigned, so it stands in for "exclude nothing"
        let sql = format!(
            "SELECT COUNT(*) as count FROM categories WHERE {} = ? AND id <> ?",
            column
        );
        let exclude = exclude_id.unwrap_or(0);

        let count: i64 = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(&sql)
                .bind(value)
                .bind(exclude)
                .fetch_one(self.pool.require_sqlite()?)
                .await
                .with_context(|| format!("Failed to check category {} existence", column))?
                .try_get("count")?,
            DatabaseDriver::Mysql => sqlx::query(&sql)
                .bind(value)
                .bind(exclude)
                .fetch_one(self.pool.require_mysql()?)
                .await
                .with_context(|| format!("Failed to check category {} existence", column))?
                .try_get("count")?,
        };

        Ok(count > 0)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    let result = sqlx::query("INSERT INTO categories (name, slug, description) VALUES (?, ?, ?)")
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .execute(pool)
        .await
        .context("Failed to create category")?;

    Ok(Category {
        id: result.last_insert_rowid(),
        ..category.clone()
    })
}

async fn get_category_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT id, name, slug, description FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by ID")?;

    row.map(|row| row_to_category_sqlite(&row)).transpose()
}

async fn get_category_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT id, name, slug, description FROM categories WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by slug")?;

    row.map(|row| row_to_category_sqlite(&row)).transpose()
}

async fn list_categories_sqlite(pool: &SqlitePool, clause: &WhereClause) -> Result<Vec<Category>> {
    let sql = format!(
        "SELECT id, name, slug, description FROM categories{} ORDER BY name ASC, id ASC",
        clause.sql()
    );
    let rows = clause
        .bind_sqlite(sqlx::query(&sql))
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    rows.iter().map(row_to_category_sqlite).collect()
}

async fn update_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Option<Category>> {
    let result = sqlx::query(
        "UPDATE categories SET name = ?, slug = ?, description = ? WHERE id = ?",
    )
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(category.id)
    .execute(pool)
    .await
    .context("Failed to update category")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_category_by_id_sqlite(pool, category.id).await
}

async fn delete_category_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    let result = sqlx::query("INSERT INTO categories (name, slug, description) VALUES (?, ?, ?)")
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .execute(pool)
        .await
        .context("Failed to create category")?;

    Ok(Category {
        id: result.last_insert_id() as i64,
        ..category.clone()
    })
}

async fn get_category_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT id, name, slug, description FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by ID")?;

    row.map(|row| row_to_category_mysql(&row)).transpose()
}

async fn get_category_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT id, name, slug, description FROM categories WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by slug")?;

    row.map(|row| row_to_category_mysql(&row)).transpose()
}

async fn list_categories_mysql(pool: &MySqlPool, clause: &WhereClause) -> Result<Vec<Category>> {
    let sql = format!(
        "SELECT id, name, slug, description FROM categories{} ORDER BY name ASC, id ASC",
        clause.sql()
    );
    let rows = clause
        .bind_mysql(sqlx::query(&sql))
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    rows.iter().map(row_to_category_mysql).collect()
}

async fn update_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Option<Category>> {
    // Changed-rows semantics: an unchanged record reports 0, so read back instead
    sqlx::query("UPDATE categories SET name = ?, slug = ?, description = ? WHERE id = ?")
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.id)
        .execute(pool)
        .await
        .context("Failed to update category")?;

    get_category_by_id_mysql(pool, category.id).await
}

async fn delete_category_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxCategoryRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxCategoryRepository::new(pool)
    }

    fn category(name: &str, slug: &str) -> Category {
        Category {
            id: 0,
            name: name.to_string(),
            slug: slug.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_category() {
        let repo = setup_test_repo().await;

        let created = repo.create(&category("Rust", "rust")).await.expect("Failed to create");
        assert!(created.id > 0);

        assert_eq!(repo.get_by_id(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(repo.get_by_slug("rust").await.unwrap(), Some(created));
        assert!(repo.get_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let repo = setup_test_repo().await;
        repo.create(&category("Zeta", "zeta")).await.unwrap();
        repo.create(&category("Alpha", "alpha")).await.unwrap();
        repo.create(&category("Mid", "mid")).await.unwrap();

        let names: Vec<String> = repo
            .list(&CategoryFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);

        let filtered = repo
            .list(&CategoryFilter { q: Some("ALP".to_string()) })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[tokio::test]
    async fn test_exists_checks_respect_exclusion() {
        let repo = setup_test_repo().await;
        let created = repo.create(&category("Rust", "rust")).await.unwrap();

        assert!(repo.exists_by_name("Rust", None).await.unwrap());
        assert!(!repo.exists_by_name("Rust", Some(created.id)).await.unwrap());
        assert!(repo.exists_by_slug("rust", None).await.unwrap());
        assert!(!repo.exists_by_slug("rust", Some(created.id)).await.unwrap());
        assert!(!repo.exists_by_slug("go", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_slug_violates_constraint() {
        let repo = setup_test_repo().await;
        repo.create(&category("Rust", "rust")).await.unwrap();
        assert!(repo.create(&category("Rust 2", "rust")).await.is_err());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = setup_test_repo().await;
        let mut created = repo.create(&category("Rust", "rust")).await.unwrap();

        created.description = "Systems".to_string();
        let updated = repo.update(&created).await.unwrap().expect("Category should exist");
        assert_eq!(updated.description, "Systems");

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.update(&created).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());
    }
}
