//! Quire - a small blog content backend
//!
//! Blog posts with view counting, moderated comments, a category registry,
//! a handful of rendered site pages and an administrative JSON API.

pub mod admin;
pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod templates;
