//! Load the catalog from the built-in definition or a JSON file, and resolve it for runtime use.

use crate::case::to_snake_case;
use crate::config::resolved::{ResolvedCatalog, ResolvedField, ResolvedResource};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Catalog shipped with the crate: bicycles, repair services, sales, televisions.
const BUILTIN_CATALOG: &str = include_str!("../../catalog/resources.json");

pub fn builtin_catalog() -> Result<CatalogConfig, ConfigError> {
    serde_json::from_str(BUILTIN_CATALOG).map_err(|e| ConfigError::Load(format!("built-in catalog: {}", e)))
}

/// Read a catalog JSON file (same shape as the built-in one).
pub async fn load_catalog_file(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

/// Catalog from `path` when given, else the built-in one.
pub async fn load_catalog(path: Option<&Path>) -> Result<CatalogConfig, ConfigError> {
    match path {
        Some(p) => load_catalog_file(p).await,
        None => builtin_catalog(),
    }
}

/// Build resolved catalog from config (validates first).
pub fn resolve(config: &CatalogConfig) -> Result<ResolvedCatalog, ConfigError> {
    validate(config)?;

    let mut resources = Vec::with_capacity(config.resources.len());
    let mut resource_by_path = HashMap::new();
    for r in &config.resources {
        let fields = r.fields.iter().map(resolve_field).collect();
        let resolved = Arc::new(ResolvedResource {
            path: r.path.clone(),
            singular: r.singular.clone(),
            label: r.label.clone(),
            table: r.table.clone(),
            folder: r.folder.clone().unwrap_or_else(|| r.path.clone()),
            required: r.required.clone(),
            timestamps: r.timestamps,
            fields,
        });
        resource_by_path.insert(resolved.path.clone(), resolved.clone());
        resources.push(resolved);
    }
    Ok(ResolvedCatalog {
        resources,
        resource_by_path,
    })
}

fn resolve_field(f: &FieldConfig) -> ResolvedField {
    ResolvedField {
        name: f.name.clone(),
        column: f.column.clone().unwrap_or_else(|| to_snake_case(&f.name)),
        kind: f.kind,
        nullable: f.nullable,
        max_length: match f.kind {
            FieldKind::Text => Some(f.max_length.unwrap_or(255)),
            _ => f.max_length,
        },
        precision: f.precision,
        default_sql: f.default.as_ref().map(default_literal),
        pg_type: pg_type(f),
    }
}

fn pg_type(f: &FieldConfig) -> String {
    match f.kind {
        FieldKind::Text => format!("varchar({})", f.max_length.unwrap_or(255)),
        FieldKind::LongText => "text".into(),
        FieldKind::Integer => "integer".into(),
        FieldKind::Decimal => match f.precision {
            Some((p, s)) => format!("numeric({},{})", p, s),
            None => "numeric".into(),
        },
        FieldKind::Boolean => "boolean".into(),
    }
}

fn default_literal(v: &Value) -> String {
    match v {
        Value::Bool(true) => "TRUE".into(),
        Value::Bool(false) => "FALSE".into(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        _ => "NULL".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_resolves() {
        let catalog = resolve(&builtin_catalog().unwrap()).unwrap();
        let paths: Vec<&str> = catalog.resources.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["bicycles", "repair-services", "sales", "televisions"]);

        let bikes = catalog.resource_by_path("bicycles").unwrap();
        assert_eq!(bikes.singular, "bicycle");
        assert_eq!(bikes.folder, "bicycles");
        assert_eq!(bikes.required, "model");
        assert!(!bikes.timestamps);
        let year = bikes.field("manufactureYear").unwrap();
        assert_eq!(year.column, "manufacture_year");
        assert_eq!(year.pg_type, "integer");
        assert_eq!(bikes.field("isAvailable").unwrap().default_sql.as_deref(), Some("TRUE"));
        assert_eq!(bikes.field("serialNumber").unwrap().pg_type, "varchar(50)");
    }

    #[test]
    fn builtin_flag_defaults() {
        let catalog = resolve(&builtin_catalog().unwrap()).unwrap();
        let sales = catalog.resource_by_path("sales").unwrap();
        assert!(sales.timestamps);
        assert_eq!(sales.field("isConfirmed").unwrap().default_sql.as_deref(), Some("FALSE"));

        let tvs = catalog.resource_by_path("televisions").unwrap();
        let price = tvs.field("price").unwrap();
        assert!(!price.nullable);
        assert_eq!(price.pg_type, "numeric(10,2)");
        assert_eq!(price.default_sql.as_deref(), Some("0"));
        assert_eq!(tvs.field("isInStock").unwrap().default_sql.as_deref(), Some("TRUE"));
    }

    #[test]
    fn string_defaults_are_escaped() {
        assert_eq!(default_literal(&serde_json::json!("it's")), "'it''s'");
    }

    #[tokio::test]
    async fn loads_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"resources":[{"path":"lamps","singular":"lamp","label":"Lamp","table":"lamps",
                "required":"name","fields":[{"name":"name","kind":"text","nullable":false}]}]}"#,
        )
        .unwrap();
        let cfg = load_catalog(Some(&path)).await.unwrap();
        let catalog = resolve(&cfg).unwrap();
        assert_eq!(catalog.resources[0].folder, "lamps");
        assert!(load_catalog_file(&dir.path().join("missing.json")).await.is_err());
    }
}
