//! Database layer
//!
//! Storage for posts, comments and categories. Two backends are supported:
//! - SQLite (default, single-file deployment)
//! - MySQL
//!
//! The driver is chosen from configuration. Everything above this layer talks
//! to the `DatabasePool` trait and the repository traits, never to a concrete
//! backend.
//!
//! # Usage
//!
//! ```ignore
//! use quire::config::DatabaseConfig;
//! use quire::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
