//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the queries for one entity on both drivers.

pub mod category;
pub mod comment;
pub mod post;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use post::{PostRepository, SqlxPostRepository};

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// Current time at the precision both backends store (microseconds),
/// so values handed back to callers match what a later read returns.
pub(crate) fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A value bound to a `?` placeholder of a dynamically built query
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BindValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Time(DateTime<Utc>),
}

/// `WHERE` clause assembled from optional filters.
///
/// Both drivers use `?` placeholders, so the SQL is shared and only the
/// binding step differs.
#[derive(Debug, Default)]
pub(crate) struct WhereClause {
    conditions: Vec<String>,
    binds: Vec<BindValue>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition with exactly one placeholder
    pub fn push(&mut self, condition: &str, value: BindValue) -> &mut Self {
        self.conditions.push(condition.to_string());
        self.binds.push(value);
        self
    }

    /// Case-insensitive substring match over any of `columns`.
    /// Blank terms add nothing.
    pub fn search(&mut self, columns: &[&str], term: &str) -> &mut Self {
        let term = term.trim();
        if term.is_empty() || columns.is_empty() {
            return self;
        }

        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let parts: Vec<String> = columns
            .iter()
            .map(|column| format!("LOWER({}) LIKE ? ESCAPE '!'", column))
            .collect();

        self.conditions.push(format!("({})", parts.join(" OR ")));
        for _ in columns {
            self.binds.push(BindValue::Text(pattern.clone()));
        }
        self
    }

    /// Inclusive range on a timestamp column
    pub fn time_range(
        &mut self,
        column: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> &mut Self {
        if let Some(from) = from {
            self.push(&format!("{} >= ?", column), BindValue::Time(from));
        }
        if let Some(to) = to {
            self.push(&format!("{} <= ?", column), BindValue::Time(to));
        }
        self
    }

    /// The clause including the leading `WHERE`, or empty
    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn bind_sqlite<'q>(
        &self,
        mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        for value in &self.binds {
            query = match value {
                BindValue::Text(v) => query.bind(v.clone()),
                BindValue::Bool(v) => query.bind(*v),
                BindValue::Int(v) => query.bind(*v),
                BindValue::Time(v) => query.bind(*v),
            };
        }
        query
    }

    pub fn bind_mysql<'q>(
        &self,
        mut query: Query<'q, MySql, MySqlArguments>,
    ) -> Query<'q, MySql, MySqlArguments> {
        for value in &self.binds {
            query = match value {
                BindValue::Text(v) => query.bind(v.clone()),
                BindValue::Bool(v) => query.bind(*v),
                BindValue::Int(v) => query.bind(*v),
                BindValue::Time(v) => query.bind(*v),
            };
        }
        query
    }
}

/// Escape LIKE wildcards using `!` as the escape character
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '!' | '%' | '_') {
            escaped.push('!');
        }
        escaped.push(c);
    }
    escaped
}
