//! Field rules shared by the services.
//!
//! Lengths are counted in characters, not bytes. Each function returns the
//! value to store (trimmed where the rule trims).

use once_cell::sync::Lazy;
use regex::Regex;

use super::ContentError;

pub const TITLE_MAX_CHARS: usize = 200;
pub const AUTHOR_MAX_CHARS: usize = 100;
pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 254;
pub const CATEGORY_NAME_MAX_CHARS: usize = 100;
pub const SLUG_MAX_CHARS: usize = 100;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email regex is valid")
});

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("slug regex is valid"));

/// Non-blank and at most `max` characters once trimmed
fn bounded(field: &str, value: &str, max: usize) -> Result<String, ContentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContentError::validation(format!("{} cannot be empty", field)));
    }
    if trimmed.chars().count() > max {
        return Err(ContentError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(trimmed.to_string())
}

/// Rejects blank text, stores it unchanged
fn required(field: &str, value: &str) -> Result<String, ContentError> {
    if value.trim().is_empty() {
        return Err(ContentError::validation(format!("{} cannot be empty", field)));
    }
    Ok(value.to_string())
}

pub fn title(value: &str) -> Result<String, ContentError> {
    bounded("Title", value, TITLE_MAX_CHARS)
}

pub fn content(value: &str) -> Result<String, ContentError> {
    required("Content", value)
}

pub fn author(value: &str) -> Result<String, ContentError> {
    bounded("Author", value, AUTHOR_MAX_CHARS)
}

pub fn commenter_name(value: &str) -> Result<String, ContentError> {
    bounded("Name", value, NAME_MAX_CHARS)
}

pub fn comment_text(value: &str) -> Result<String, ContentError> {
    required("Comment text", value)
}

pub fn email(value: &str) -> Result<String, ContentError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > EMAIL_MAX_CHARS {
        return Err(ContentError::validation(format!(
            "Email must be at most {} characters",
            EMAIL_MAX_CHARS
        )));
    }
    if !EMAIL_RE.is_match(trimmed) {
        return Err(ContentError::validation("Enter a valid email address"));
    }
    Ok(trimmed.to_string())
}

pub fn category_name(value: &str) -> Result<String, ContentError> {
    bounded("Category name", value, CATEGORY_NAME_MAX_CHARS)
}

pub fn slug(value: &str) -> Result<String, ContentError> {
    if value.is_empty() {
        return Err(ContentError::validation("Slug cannot be empty"));
    }
    if value.chars().count() > SLUG_MAX_CHARS {
        return Err(ContentError::validation(format!(
            "Slug must be at most {} characters",
            SLUG_MAX_CHARS
        )));
    }
    if !SLUG_RE.is_match(value) {
        return Err(ContentError::validation(
            "Slug may only contain letters, numbers and hyphens",
        ));
    }
    Ok(value.to_string())
}
