//! Data models
//!
//! Entities of the blog content model and the input/filter types used by the
//! services and the web layer:
//! - `BlogPost`, the primary content unit
//! - `Comment`, moderated reader feedback on one post
//! - `Category`, a standalone named slug

mod category;
mod comment;
mod post;

pub use category::{Category, CategoryFilter, CreateCategoryInput, UpdateCategoryInput};
pub use comment::{Comment, CommentFilter, CreateCommentInput, UpdateCommentApproval};
pub use post::{BlogPost, CreatePostInput, PostFilter, UpdatePostInput, DEFAULT_AUTHOR};
