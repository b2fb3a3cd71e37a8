//! Resolved catalog: config validated and flattened for runtime use.

use crate::config::FieldKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the photo column every resource carries.
pub const PHOTO_FIELD: &str = "photo";

#[derive(Clone, Debug)]
pub struct ResolvedField {
    /// API (JSON) name, camelCase.
    pub name: String,
    /// Column name, snake_case.
    pub column: String,
    pub kind: FieldKind,
    pub nullable: bool,
    /// Character limit for text fields.
    pub max_length: Option<u32>,
    /// (precision, scale) for decimals.
    pub precision: Option<(u32, u32)>,
    /// Rendered SQL literal for the column default, if any.
    pub default_sql: Option<String>,
    /// Column type in DDL (e.g. "varchar(255)", "numeric(10,2)").
    pub pg_type: String,
}

impl ResolvedField {
    pub fn has_default(&self) -> bool {
        self.default_sql.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedResource {
    pub path: String,
    pub singular: String,
    pub label: String,
    pub table: String,
    pub folder: String,
    /// API name of the required field.
    pub required: String,
    pub timestamps: bool,
    /// Scalar fields in declaration order; excludes id, photo and timestamps.
    pub fields: Vec<ResolvedField>,
}

impl ResolvedResource {
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Static listing page the form endpoints redirect to.
    pub fn index_page(&self) -> String {
        format!("/{}/index.html", self.path)
    }

    pub fn not_found_message(&self) -> String {
        format!("{} not found", self.label)
    }

    pub fn deleted_message(&self) -> String {
        format!("{} deleted", self.label)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ResolvedCatalog {
    pub resources: Vec<Arc<ResolvedResource>>,
    pub resource_by_path: HashMap<String, Arc<ResolvedResource>>,
}

impl ResolvedCatalog {
    pub fn resource_by_path(&self, path: &str) -> Option<&Arc<ResolvedResource>> {
        self.resource_by_path.get(path)
    }
}
