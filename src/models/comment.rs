//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reader comment attached to exactly one post.
///
/// New comments start unapproved; moderation flips `is_approved` either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub is_approved: bool,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comment by {} on post #{}", self.name, self.post_id)
    }
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentInput {
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub text: String,
}

impl CreateCommentInput {
    pub fn new(
        post_id: i64,
        name: impl Into<String>,
        email: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            post_id,
            name: name.into(),
            email: email.into(),
            text: text.into(),
        }
    }
}

/// Moderation request body
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCommentApproval {
    pub approved: bool,
}

/// Filters for the administrative comment list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentFilter {
    /// Case-insensitive search over name, email and text
    pub q: Option<String>,
    pub is_approved: Option<bool>,
    pub post_id: Option<i64>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}
