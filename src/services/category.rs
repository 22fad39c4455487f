//! Category service
//!
//! Implements business logic for category management:
//! - Create, read, update, delete categories
//! - Name and slug uniqueness validation
//! - Slug generation from name

use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CategoryFilter, CreateCategoryInput, UpdateCategoryInput};
use crate::services::{validation, ContentError};
use std::sync::Arc;

/// Category service for managing blog categories
#[derive(Clone)]
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Create a new category
    ///
    /// # Errors
    /// - `Validation` if the name is blank or too long, or the slug (given or
    ///   derived from the name) is empty, too long or has invalid characters
    /// - `Conflict` if another category already uses the name or the slug
    pub async fn create(&self, input: CreateCategoryInput) -> Result<Category, ContentError> {
        let name = validation::category_name(&input.name)?;
        let slug = match input.slug {
            Some(slug) => validation::slug(&slug)?,
            None => derived_slug(&name)?,
        };

        self.ensure_unique(&name, &slug, None).await?;

        let category = Category {
            id: 0,
            name,
            slug,
            description: input.description.unwrap_or_default(),
        };
        let created = self.repo.create(&category).await?;
        tracing::debug!(category_id = created.id, slug = %created.slug, "Created category");
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Category, ContentError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, ContentError> {
        self.repo
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("Category '{}' not found", slug)))
    }

    /// List categories by name
    pub async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>, ContentError> {
        Ok(self.repo.list(filter).await?)
    }

    /// Change the name and/or slug.
    ///
    /// A new name without a new slug keeps the existing slug. Uniqueness is
    /// checked against every other category.
    pub async fn rename(
        &self,
        id: i64,
        name: Option<String>,
        slug: Option<String>,
    ) -> Result<Category, ContentError> {
        self.update(
            id,
            UpdateCategoryInput {
                name,
                slug,
                description: None,
            },
        )
        .await
    }

    /// Update name, slug and description
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Category, ContentError> {
        let name = input.name.as_deref().map(validation::category_name).transpose()?;
        let slug = input.slug.as_deref().map(validation::slug).transpose()?;

        let mut category = self.get(id).await?;
        if let Some(name) = name {
            category.name = name;
        }
        if let Some(slug) = slug {
            category.slug = slug;
        }
        if let Some(description) = input.description {
            category.description = description;
        }

        self.ensure_unique(&category.name, &category.slug, Some(id))
            .await?;

        let updated = self
            .repo
            .update(&category)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::debug!(category_id = id, "Updated category");
        Ok(updated)
    }

    /// Delete a category. Posts are not linked to categories, so nothing cascades.
    pub async fn delete(&self, id: i64) -> Result<(), ContentError> {
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::debug!(category_id = id, "Deleted category");
        Ok(())
    }

    async fn ensure_unique(
        &self,
        name: &str,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), ContentError> {
        if self.repo.exists_by_name(name, exclude_id).await? {
            return Err(ContentError::conflict(format!(
                "Category name already exists: {}",
                name
            )));
        }
        if self.repo.exists_by_slug(slug, exclude_id).await? {
            return Err(ContentError::conflict(format!(
                "Category slug already exists: {}",
                slug
            )));
        }
        Ok(())
    }
}

fn not_found(id: i64) -> ContentError {
    ContentError::not_found(format!("Category {} not found", id))
}

fn derived_slug(name: &str) -> Result<String, ContentError> {
    let slug = generate_slug(name);
    if slug.is_empty() {
        return Err(ContentError::validation(format!(
            "Cannot derive a slug from '{}'; provide one explicitly",
            name
        )));
    }
    // Truncation keeps derived slugs within the column limit
    let slug: String = slug.chars().take(validation::SLUG_MAX_CHARS).collect();
    validation::slug(slug.trim_end_matches('-'))
}

/// Generate a URL-friendly slug from a name.
///
/// Letters are transliterated to ASCII first (`Café` becomes `cafe`), then
/// lower-cased; every run of other characters becomes a single hyphen and
/// hyphens are trimmed from both ends. A name with no letters or digits
/// yields an empty slug.
pub fn generate_slug(name: &str) -> String {
    slug::slugify(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCategoryRepository;
    use crate::db::{create_test_pool, migrations};
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static PROPERTY_TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_suffix() -> u64 {
        PROPERTY_TEST_COUNTER.fetch_add(1, Ordering::SeqCst)
    }

    async fn setup_test_service() -> CategoryService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        CategoryService::new(SqlxCategoryRepository::boxed(pool))
    }

    #[test]
    fn test_generate_slug() {
        assert_eq!(generate_slug("Hello, World!"), "hello-world");
        assert_eq!(generate_slug("  Rust   Tips  "), "rust-tips");
        assert_eq!(generate_slug("already-a-slug"), "already-a-slug");
        assert_eq!(generate_slug("C++ & Rust"), "c-rust");
        assert_eq!(generate_slug("Café déjà vu"), "cafe-deja-vu");
        assert_eq!(generate_slug("Crème Brûlée"), "creme-brulee");
        assert_eq!(generate_slug("!!!"), "");
    }

    #[test]
    fn test_generate_slug_transliterates_non_latin() {
        let slug = generate_slug("日本語");
        assert!(!slug.is_empty());
        assert!(validation::slug(&slug).is_ok());
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let service = setup_test_service().await;

        let category = service
            .create(CreateCategoryInput::new("Hello, World!"))
            .await
            .expect("Failed to create category");

        assert_eq!(category.slug, "hello-world");
        assert_eq!(category.description, "");
        assert_eq!(service.get_by_slug("hello-world").await.unwrap(), category);
    }

    #[tokio::test]
    async fn test_create_with_underivable_slug() {
        let service = setup_test_service().await;
        let result = service.create(CreateCategoryInput::new("!!!")).await;
        assert!(matches!(result, Err(ContentError::Validation(_))));

        // An explicit slug makes the same name acceptable
        service
            .create(CreateCategoryInput::new("!!!").with_slug("bang"))
            .await
            .expect("Explicit slug should be accepted");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_slug() {
        let service = setup_test_service().await;
        let result = service
            .create(CreateCategoryInput::new("News").with_slug("not a slug"))
            .await;
        assert!(matches!(result, Err(ContentError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let service = setup_test_service().await;
        service
            .create(CreateCategoryInput::new("Rust").with_slug("rust"))
            .await
            .unwrap();

        let result = service
            .create(CreateCategoryInput::new("Rust").with_slug("rust-lang"))
            .await;
        assert!(matches!(result, Err(ContentError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let service = setup_test_service().await;
        service
            .create(CreateCategoryInput::new("Rust").with_slug("rust"))
            .await
            .unwrap();

        let result = service
            .create(CreateCategoryInput::new("Rust Lang").with_slug("rust"))
            .await;
        assert!(matches!(result, Err(ContentError::Conflict(_))));
        assert_eq!(service.list(&CategoryFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_excludes_self() {
        let service = setup_test_service().await;
        let rust = service.create(CreateCategoryInput::new("Rust")).await.unwrap();
        service.create(CreateCategoryInput::new("Go")).await.unwrap();

        // Same name on itself is fine
        let same = service
            .rename(rust.id, Some("Rust".to_string()), None)
            .await
            .unwrap();
        assert_eq!(same.slug, "rust");

        let renamed = service
            .rename(rust.id, Some("Rust Lang".to_string()), Some("rust-lang".to_string()))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Rust Lang");
        assert_eq!(renamed.slug, "rust-lang");

        let clash = service.rename(rust.id, Some("Go".to_string()), None).await;
        assert!(matches!(clash, Err(ContentError::Conflict(_))));

        let clash = service.rename(rust.id, None, Some("go".to_string())).await;
        assert!(matches!(clash, Err(ContentError::Conflict(_))));

        let missing = service.rename(999, Some("X".to_string()), None).await;
        assert!(matches!(missing, Err(ContentError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_description_and_delete() {
        let service = setup_test_service().await;
        let news = service.create(CreateCategoryInput::new("News")).await.unwrap();

        let updated = service
            .update(
                news.id,
                UpdateCategoryInput {
                    description: Some("Daily".to_string()),
                    ..UpdateCategoryInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description, "Daily");
        assert_eq!(updated.name, "News");

        service.delete(news.id).await.unwrap();
        assert!(matches!(service.get(news.id).await, Err(ContentError::NotFound(_))));
        assert!(matches!(service.delete(news.id).await, Err(ContentError::NotFound(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Derived slugs always satisfy the slug rule or are empty
        #[test]
        fn generated_slugs_are_well_formed(name in "\\PC{0,60}") {
            let slug = generate_slug(&name);
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            if name.chars().any(|c| c.is_ascii_alphanumeric()) {
                prop_assert!(!slug.is_empty());
            }
            if !slug.is_empty() && slug.len() <= validation::SLUG_MAX_CHARS {
                prop_assert!(validation::slug(&slug).is_ok());
            }
        }

        /// Slug generation is idempotent on its own output
        #[test]
        fn generate_slug_is_idempotent(name in "[A-Za-z0-9 ,.!_-]{0,40}") {
            let slug = generate_slug(&name);
            prop_assert_eq!(generate_slug(&slug), slug);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// A second category with an existing name conflicts regardless of slug
        #[test]
        fn names_stay_unique(base in "[A-Za-z]{3,20}") {
            let result: Result<(), TestCaseError> = tokio_test::block_on(async {
                let service = setup_test_service().await;
                let suffix = unique_suffix();
                let name = format!("{} {}", base, suffix);

                service
                    .create(CreateCategoryInput::new(name.clone()))
                    .await
                    .expect("first create should succeed");

                let again = service
                    .create(CreateCategoryInput::new(name).with_slug(format!("other-{}", suffix)))
                    .await;
                prop_assert!(matches!(again, Err(ContentError::Conflict(_))));
                prop_assert_eq!(
                    service.list(&CategoryFilter::default()).await.expect("list should succeed").len(),
                    1
                );
                Ok(())
            });
            result?;
        }
    }
}
