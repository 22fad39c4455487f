//! Services layer - Business logic
//!
//! Services enforce the content rules on top of the repositories:
//! - Field validation before any write
//! - Not-found and uniqueness checks
//! - Translation of storage failures into [`ContentError`]
//!
//! Every service is cheap to clone and safe to share across tasks.

pub mod category;
pub mod comment;
pub mod error;
pub mod post;
pub mod validation;

pub use category::{generate_slug, CategoryService};
pub use comment::CommentService;
pub use error::ContentError;
pub use post::PostService;
