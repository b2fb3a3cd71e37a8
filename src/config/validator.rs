//! Catalog validation: identifiers, uniqueness and field consistency.

use crate::config::{CatalogConfig, FieldKind, ResourceConfig};
use crate::error::ConfigError;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

/// Field names owned by the server; config may not redeclare them.
const RESERVED_FIELDS: &[&str] = &["id", "photo", "createdAt", "updatedAt"];

/// Resource paths that collide with fixed routes or static mounts.
const RESERVED_PATHS: &[&str] = &["auth", "user", "images", "css", "js", "health", "ready", "version"];

const PATH_SEGMENT: &str = r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$";
const SQL_IDENT: &str = r"^[a-z_][a-z0-9_]*$";
const API_NAME: &str = r"^[a-z][A-Za-z0-9]*$";

fn matches(pattern: &str, s: &str) -> Result<bool, ConfigError> {
    let re = Regex::new(pattern).map_err(|e| ConfigError::Validation(format!("invalid pattern {}: {}", pattern, e)))?;
    Ok(re.is_match(s))
}

pub fn validate(config: &CatalogConfig) -> Result<(), ConfigError> {
    if config.resources.is_empty() {
        return Err(ConfigError::Validation("catalog declares no resources".into()));
    }
    let mut paths = HashSet::new();
    let mut singulars = HashSet::new();
    let mut tables = HashSet::new();
    for r in &config.resources {
        validate_resource(r)?;
        if !paths.insert(r.path.as_str()) {
            return Err(ConfigError::DuplicatePathSegment(r.path.clone()));
        }
        if !singulars.insert(r.singular.as_str()) {
            return Err(ConfigError::DuplicatePathSegment(r.singular.clone()));
        }
        if !tables.insert(r.table.as_str()) {
            return Err(ConfigError::Validation(format!("table '{}' used by more than one resource", r.table)));
        }
    }
    Ok(())
}

fn validate_resource(r: &ResourceConfig) -> Result<(), ConfigError> {
    for (what, seg) in [("path", &r.path), ("singular", &r.singular)] {
        if !matches(PATH_SEGMENT, seg)? {
            return Err(ConfigError::Validation(format!("{} '{}' is not a valid path segment", what, seg)));
        }
    }
    if RESERVED_PATHS.contains(&r.path.as_str()) {
        return Err(ConfigError::Validation(format!("path '{}' is reserved", r.path)));
    }
    if let Some(folder) = &r.folder {
        if !matches(PATH_SEGMENT, folder)? {
            return Err(ConfigError::Validation(format!("folder '{}' is not a valid path segment", folder)));
        }
    }
    if !matches(SQL_IDENT, &r.table)? {
        return Err(ConfigError::Validation(format!("table '{}' is not a valid identifier", r.table)));
    }
    if r.label.trim().is_empty() {
        return Err(ConfigError::Validation(format!("resource '{}' has an empty label", r.path)));
    }

    let mut names = HashSet::new();
    for f in &r.fields {
        if !matches(API_NAME, &f.name)? {
            return Err(ConfigError::Validation(format!("{}: field '{}' is not a valid name", r.path, f.name)));
        }
        if RESERVED_FIELDS.contains(&f.name.as_str()) {
            return Err(ConfigError::Validation(format!("{}: field '{}' is reserved", r.path, f.name)));
        }
        if !names.insert(f.name.as_str()) {
            return Err(ConfigError::Validation(format!("{}: duplicate field '{}'", r.path, f.name)));
        }
        if let Some(col) = &f.column {
            if !matches(SQL_IDENT, col)? {
                return Err(ConfigError::Validation(format!("{}: column '{}' is not a valid identifier", r.path, col)));
            }
        }
        if let Some(d) = &f.default {
            if !default_matches_kind(d, f.kind) {
                return Err(ConfigError::Validation(format!(
                    "{}: default for '{}' does not match kind {:?}",
                    r.path, f.name, f.kind
                )));
            }
        }
        if !f.nullable && f.default.is_none() && f.name != r.required {
            return Err(ConfigError::Validation(format!(
                "{}: non-nullable field '{}' needs a default",
                r.path, f.name
            )));
        }
    }

    let required = r
        .fields
        .iter()
        .find(|f| f.name == r.required)
        .ok_or_else(|| ConfigError::MissingReference {
            kind: "required field",
            id: format!("{}.{}", r.path, r.required),
        })?;
    if !matches!(required.kind, FieldKind::Text | FieldKind::LongText) {
        return Err(ConfigError::Validation(format!(
            "{}: required field '{}' must be text",
            r.path, r.required
        )));
    }
    Ok(())
}

fn default_matches_kind(v: &Value, kind: FieldKind) -> bool {
    match kind {
        FieldKind::Text | FieldKind::LongText => v.is_string(),
        FieldKind::Integer => v.is_i64(),
        FieldKind::Decimal => v.is_number(),
        FieldKind::Boolean => v.is_boolean(),
    }
}
