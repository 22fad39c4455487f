//! Page rendering
//!
//! The public pages are Tera templates compiled into the binary. Every page
//! extends `base.html` and receives a set of standard variables (site title,
//! tagline, current year, request path) on top of its own context.

use chrono::{Datelike, Utc};
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};
use thiserror::Error;

use crate::config::SiteConfig;

/// Embedded templates as (name, source) pairs
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("about.html", include_str!("../../templates/about.html")),
    ("contact.html", include_str!("../../templates/contact.html")),
];

/// Template errors
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A template failed to parse at startup
    #[error("Invalid template: {0}")]
    Invalid(String),

    /// Rendering failed
    #[error("Failed to render '{template}': {message}")]
    Render { template: String, message: String },
}

/// Variables injected into every page
#[derive(Debug, Clone)]
pub struct StandardVars {
    pub site_title: String,
    pub tagline: String,
    pub request_path: String,
    pub year: i32,
}

impl StandardVars {
    pub fn new(site: &SiteConfig, request_path: impl Into<String>) -> Self {
        Self {
            site_title: site.title.clone(),
            tagline: site.tagline.clone(),
            request_path: request_path.into(),
            year: Utc::now().year(),
        }
    }
}

/// Renders the embedded site pages
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    /// Compile the embedded templates
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .map_err(|e| TemplateError::Invalid(error_chain(&e)))?;
        Ok(Self { tera })
    }

    /// Render a template with the standard variables added
    pub fn render(
        &self,
        template: &str,
        context: &TeraContext,
        vars: &StandardVars,
    ) -> Result<String, TemplateError> {
        let mut full_context = context.clone();
        full_context.insert("site_title", &vars.site_title);
        full_context.insert("tagline", &vars.tagline);
        full_context.insert("request_path", &vars.request_path);
        full_context.insert("year", &vars.year);

        self.tera
            .render(template, &full_context)
            .map_err(|e| TemplateError::Render {
                template: template.to_string(),
                message: error_chain(&e),
            })
    }

    /// Names of all loaded templates
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }
}

/// Tera nests the useful detail in `source()`
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!("\n  Caused by: {}", cause));
        source = cause.source();
    }
    message
}
