//! Blog post model
//!
//! This module provides:
//! - `BlogPost` entity, the primary content unit
//! - Input types for creating and updating posts
//! - `PostFilter` for list queries on the administrative surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author used when a post is created without one
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Blog post entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Body text
    pub content: String,
    /// Free-text author name
    pub author: String,
    /// Creation timestamp, never changes
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
    /// Whether the post is visible on the public site
    pub is_published: bool,
    /// Number of recorded views
    pub view_count: i64,
}

impl fmt::Display for BlogPost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    /// Defaults to [`DEFAULT_AUTHOR`]
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

impl CreatePostInput {
    /// Create a new unpublished post input with the default author
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author: None,
            is_published: false,
        }
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the publication flag
    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = is_published;
        self
    }
}

/// Input for updating an existing post.
///
/// Timestamps and the view counter are not part of this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub is_published: Option<bool>,
}

impl UpdatePostInput {
    /// Create a new empty UpdatePostInput
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = Some(is_published);
        self
    }
}

/// Filters for listing posts. Empty filter lists everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostFilter {
    /// Case-insensitive search over title, content and author
    pub q: Option<String>,
    pub is_published: Option<bool>,
    /// Exact author match
    pub author: Option<String>,
    /// Inclusive lower bound on `created_at`
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub created_to: Option<DateTime<Utc>>,
}

impl PostFilter {
    /// Only published posts
    pub fn published() -> Self {
        Self {
            is_published: Some(true),
            ..Self::default()
        }
    }

    /// Set the search term
    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// Restrict to one author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Restrict `created_at` to an inclusive range
    pub fn with_created_range(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_from = from;
        self.created_to = to;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_displays_as_title() {
        let now = Utc::now();
        let post = BlogPost {
            id: 1,
            title: "Intro".to_string(),
            content: "Hi".to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            created_at: now,
            updated_at: now,
            is_published: false,
            view_count: 0,
        };
        assert_eq!(post.to_string(), "Intro");
    }

    #[test]
    fn test_create_input_builder() {
        let input = CreatePostInput::new("Title", "Body")
            .with_author("Ann")
            .with_published(true);
        assert_eq!(input.author.as_deref(), Some("Ann"));
        assert!(input.is_published);
    }

    #[test]
    fn test_update_input_rejects_read_only_fields() {
        let result: Result<UpdatePostInput, _> =
            serde_json::from_str(r#"{"title": "x", "view_count": 99}"#);
        assert!(result.is_err());

        let result: Result<CreatePostInput, _> =
            serde_json::from_str(r#"{"title": "x", "content": "y", "created_at": "2020-01-01T00:00:00Z"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_input_defaults() {
        let input: CreatePostInput =
            serde_json::from_str(r#"{"title": "x", "content": "y"}"#).unwrap();
        assert!(input.author.is_none());
        assert!(!input.is_published);
    }
}
