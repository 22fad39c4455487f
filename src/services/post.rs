//! Blog post service
//!
//! Implements the post lifecycle:
//! - Create with defaults (author, unpublished, zero views)
//! - Read, list and filter
//! - Partial updates that always refresh `updated_at`
//! - View counting as a single in-store increment
//! - Deletion that removes the post's comments in the same transaction

use crate::db::repositories::PostRepository;
use crate::models::{BlogPost, CreatePostInput, PostFilter, UpdatePostInput};
use crate::services::{validation, ContentError};
use std::sync::Arc;

/// Service for managing blog posts
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    /// Create a new post service
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Create a new post.
    ///
    /// # Errors
    /// - `Validation` if the title is blank or over 200 characters, the content
    ///   is blank, or a given author is blank or over 100 characters
    pub async fn create(&self, input: CreatePostInput) -> Result<BlogPost, ContentError> {
        let input = CreatePostInput {
            title: validation::title(&input.title)?,
            content: validation::content(&input.content)?,
            author: input.author.as_deref().map(validation::author).transpose()?,
            is_published: input.is_published,
        };

        let post = self.repo.create(&input).await?;
        tracing::debug!(post_id = post.id, "Created post");
        Ok(post)
    }

    /// Get a post by ID
    pub async fn get(&self, id: i64) -> Result<BlogPost, ContentError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// List posts newest first
    pub async fn list(&self, filter: &PostFilter) -> Result<Vec<BlogPost>, ContentError> {
        Ok(self.repo.list(filter).await?)
    }

    /// List published posts newest first
    pub async fn list_published(&self) -> Result<Vec<BlogPost>, ContentError> {
        self.list(&PostFilter::published()).await
    }

    /// Count all posts
    pub async fn count(&self) -> Result<i64, ContentError> {
        Ok(self.repo.count().await?)
    }

    /// Apply the fields present in `input`.
    ///
    /// `updated_at` is refreshed even when `input` is empty.
    /// `created_at` and `view_count` are never written here.
    pub async fn update(&self, id: i64, input: UpdatePostInput) -> Result<BlogPost, ContentError> {
        let input = UpdatePostInput {
            title: input.title.as_deref().map(validation::title).transpose()?,
            content: input.content.as_deref().map(validation::content).transpose()?,
            author: input.author.as_deref().map(validation::author).transpose()?,
            is_published: input.is_published,
        };

        let post = self
            .repo
            .update(id, &input)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::debug!(post_id = id, "Updated post");
        Ok(post)
    }

    /// Record one view.
    ///
    /// The increment happens inside the database, so concurrent calls on the
    /// same post never lose updates.
    pub async fn increment_views(&self, id: i64) -> Result<BlogPost, ContentError> {
        self.repo
            .increment_views(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Record one view of a published post.
    ///
    /// The publication check and the increment are one statement, so a post
    /// unpublished concurrently is never counted. Drafts are `NotFound`.
    pub async fn view_published(&self, id: i64) -> Result<BlogPost, ContentError> {
        self.repo
            .increment_published_views(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Delete a post and all of its comments atomically
    pub async fn delete(&self, id: i64) -> Result<(), ContentError> {
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::debug!(post_id = id, "Deleted post");
        Ok(())
    }
}

fn not_found(id: i64) -> ContentError {
    ContentError::not_found(format!("Post {} not found", id))
}
