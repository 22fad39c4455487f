//! Administrative registry
//!
//! Declares, per entity, how the administrative surface presents it: list
//! columns, search and filter fields, fields editable straight from the list,
//! read-only fields and default ordering. The admin API serves this registry
//! as-is. The list endpoints search the repositories' `SEARCH_COLUMNS` and
//! filter through the `*Filter` query types; tests keep both in line with the
//! fields declared here.

use serde::Serialize;

/// A titled group of fields on the edit form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fieldset {
    /// Section heading; `None` for the untitled leading section
    pub title: Option<&'static str>,
    pub fields: Vec<&'static str>,
    /// Rendered collapsed by default
    pub collapsed: bool,
}

/// Admin configuration for one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityAdmin {
    /// Entity name as used in admin URLs (`posts`, `comments`, `categories`)
    pub name: &'static str,
    pub verbose_name: &'static str,
    pub list_columns: Vec<&'static str>,
    pub searchable_fields: Vec<&'static str>,
    pub filterable_fields: Vec<&'static str>,
    pub editable_in_list: Vec<&'static str>,
    pub readonly_fields: Vec<&'static str>,
    /// Sort keys; a leading `-` means descending
    pub ordering: Vec<&'static str>,
    /// Timestamp used for date drill-down navigation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_hierarchy: Option<&'static str>,
    /// Fields filled from others on the edit form, e.g. slug from name
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prepopulated_fields: Vec<(&'static str, Vec<&'static str>)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fieldsets: Vec<Fieldset>,
}

impl EntityAdmin {
    pub fn is_readonly(&self, field: &str) -> bool {
        self.readonly_fields.contains(&field)
    }

    pub fn is_searchable(&self, field: &str) -> bool {
        self.searchable_fields.contains(&field)
    }

    pub fn is_filterable(&self, field: &str) -> bool {
        self.filterable_fields.contains(&field)
    }
}

/// Registry of all administered entities
#[derive(Debug, Clone, Serialize)]
pub struct AdminSite {
    entities: Vec<EntityAdmin>,
}

impl AdminSite {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Register an entity, replacing any previous entry of the same name
    pub fn register(&mut self, admin: EntityAdmin) {
        self.entities.retain(|existing| existing.name != admin.name);
        self.entities.push(admin);
    }

    pub fn get(&self, name: &str) -> Option<&EntityAdmin> {
        self.entities.iter().find(|admin| admin.name == name)
    }

    pub fn entities(&self) -> &[EntityAdmin] {
        &self.entities
    }
}

impl Default for AdminSite {
    /// The registry for posts, comments and categories
    fn default() -> Self {
        let mut site = Self::new();
        site.register(post_admin());
        site.register(comment_admin());
        site.register(category_admin());
        site
    }
}

fn post_admin() -> EntityAdmin {
    EntityAdmin {
        name: "posts",
        verbose_name: "Blog post",
        list_columns: vec![
            "title",
            "author",
            "is_published",
            "view_count",
            "created_at",
            "updated_at",
        ],
        searchable_fields: vec!["title", "content", "author"],
        filterable_fields: vec!["is_published", "created_at", "author"],
        editable_in_list: vec!["is_published"],
        readonly_fields: vec!["created_at", "updated_at", "view_count"],
        ordering: vec!["-created_at"],
        date_hierarchy: Some("created_at"),
        prepopulated_fields: Vec::new(),
        fieldsets: vec![
            Fieldset {
                title: None,
                fields: vec!["title", "author", "content"],
                collapsed: false,
            },
            Fieldset {
                title: Some("Status"),
                fields: vec!["is_published"],
                collapsed: false,
            },
            Fieldset {
                title: Some("Metadata"),
                fields: vec!["created_at", "updated_at", "view_count"],
                collapsed: true,
            },
        ],
    }
}

fn comment_admin() -> EntityAdmin {
    EntityAdmin {
        name: "comments",
        verbose_name: "Comment",
        list_columns: vec!["name", "post_id", "email", "is_approved", "created_at"],
        searchable_fields: vec!["name", "email", "text"],
        filterable_fields: vec!["is_approved", "created_at", "post_id"],
        editable_in_list: vec!["is_approved"],
        readonly_fields: vec!["created_at"],
        ordering: vec!["created_at"],
        date_hierarchy: Some("created_at"),
        prepopulated_fields: Vec::new(),
        fieldsets: Vec::new(),
    }
}

fn category_admin() -> EntityAdmin {
    EntityAdmin {
        name: "categories",
        verbose_name: "Category",
        list_columns: vec!["name", "slug"],
        searchable_fields: vec!["name"],
        filterable_fields: Vec::new(),
        editable_in_list: Vec::new(),
        readonly_fields: Vec::new(),
        ordering: vec!["name"],
        date_hierarchy: None,
        prepopulated_fields: vec![("slug", vec!["name"])],
        fieldsets: Vec::new(),
    }
}
