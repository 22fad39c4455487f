//! Comment service
//!
//! Comments start unapproved and only become publicly visible once a
//! moderator approves them. Approval can be toggled back and forth.

use std::sync::Arc;

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{Comment, CommentFilter, CreateCommentInput};
use crate::services::{validation, ContentError};

/// Comment moderation service
#[derive(Clone)]
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { repo, posts }
    }

    /// Submit a comment on a post.
    ///
    /// Fields are validated before the post is looked up, so a bad email on
    /// a missing post is reported as `Validation`.
    pub async fn create(&self, input: CreateCommentInput) -> Result<Comment, ContentError> {
        let input = CreateCommentInput {
            post_id: input.post_id,
            name: validation::commenter_name(&input.name)?,
            email: validation::email(&input.email)?,
            text: validation::comment_text(&input.text)?,
        };

        self.ensure_post_exists(input.post_id).await?;

        let comment = self.repo.create(&input).await?;
        tracing::debug!(comment_id = comment.id, post_id = comment.post_id, "Created comment");
        Ok(comment)
    }

    pub async fn get(&self, id: i64) -> Result<Comment, ContentError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Approve or unapprove a comment. Repeating the same value is a no-op.
    pub async fn set_approval(&self, id: i64, approved: bool) -> Result<Comment, ContentError> {
        let comment = self
            .repo
            .set_approval(id, approved)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::debug!(comment_id = id, approved, "Changed comment approval");
        Ok(comment)
    }

    /// Comments of one post, oldest first.
    ///
    /// Returns `NotFound` when the post itself does not exist, and an empty
    /// list when it exists but has no matching comments.
    pub async fn list_for_post(
        &self,
        post_id: i64,
        approved_only: bool,
    ) -> Result<Vec<Comment>, ContentError> {
        self.ensure_post_exists(post_id).await?;
        Ok(self.repo.list_by_post(post_id, approved_only).await?)
    }

    /// Comments across all posts for moderation
    pub async fn list(&self, filter: &CommentFilter) -> Result<Vec<Comment>, ContentError> {
        Ok(self.repo.list(filter).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ContentError> {
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::debug!(comment_id = id, "Deleted comment");
        Ok(())
    }

    async fn ensure_post_exists(&self, post_id: i64) -> Result<(), ContentError> {
        if self.posts.exists(post_id).await? {
            Ok(())
        } else {
            Err(ContentError::not_found(format!("Post {} not found", post_id)))
        }
    }
}

fn not_found(id: i64) -> ContentError {
    ContentError::not_found(format!("Comment {} not found", id))
}
