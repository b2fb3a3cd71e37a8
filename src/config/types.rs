//! Raw catalog types matching the resource JSON schema (catalog/resources.json).

use serde::{Deserialize, Serialize};

/// Field kind as declared in config. Drives DDL, input normalization and row decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// VARCHAR(max_length), default length 255.
    Text,
    /// Unbounded TEXT.
    LongText,
    Integer,
    /// NUMERIC, optionally with precision/scale.
    Decimal,
    Boolean,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    /// API name (camelCase). The column name is derived as snake_case unless `column` is set.
    pub name: String,
    #[serde(default)]
    pub column: Option<String>,
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub max_length: Option<u32>,
    /// (precision, scale) for decimals.
    #[serde(default)]
    pub precision: Option<(u32, u32)>,
    /// Column default as a JSON literal (true, 0, "x").
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Plural path segment, e.g. "repair-services".
    pub path: String,
    /// Singular path segment, e.g. "repair-service".
    pub singular: String,
    /// Human label used in messages, e.g. "Repair service".
    pub label: String,
    pub table: String,
    /// Folder under images/ for uploads. Defaults to `path`.
    #[serde(default)]
    pub folder: Option<String>,
    /// API name of the field that must be non-empty on every write.
    pub required: String,
    /// Adds created_at / updated_at columns managed by the server.
    #[serde(default)]
    pub timestamps: bool,
    pub fields: Vec<FieldConfig>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub resources: Vec<ResourceConfig>,
}
