//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a resolved resource.

use crate::config::{FieldKind, ResolvedField, ResolvedResource, PHOTO_FIELD};
use serde_json::Value;
use std::collections::HashMap;

/// Primary key column shared by every resource table.
pub const ID_COLUMN: &str = "id";
pub const CREATED_AT_COLUMN: &str = "created_at";
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// Quote identifier for PostgreSQL (safe: only from config).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

/// Type a placeholder is cast to. Values arrive as text; varchar limits apply on assignment.
fn cast_type(f: &ResolvedField) -> &'static str {
    match f.kind {
        FieldKind::Text | FieldKind::LongText => "text",
        FieldKind::Integer => "integer",
        FieldKind::Decimal => "numeric",
        FieldKind::Boolean => "boolean",
    }
}

/// SELECT list: id, fields, photo, timestamps. Decimals come back as float8 so they decode to JSON numbers.
pub fn select_column_list(resource: &ResolvedResource) -> String {
    let mut cols = vec![quoted(ID_COLUMN)];
    for f in &resource.fields {
        let q = quoted(&f.column);
        if f.kind == FieldKind::Decimal {
            cols.push(format!("{}::float8 AS {}", q, q));
        } else {
            cols.push(q);
        }
    }
    cols.push(quoted(PHOTO_FIELD));
    if resource.timestamps {
        cols.push(quoted(CREATED_AT_COLUMN));
        cols.push(quoted(UPDATED_AT_COLUMN));
    }
    cols.join(", ")
}

/// SELECT by primary key. Caller binds the id as $1.
pub fn select_by_id(resource: &ResolvedResource) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1::bigint",
        select_column_list(resource),
        quoted(&resource.table),
        quoted(ID_COLUMN)
    );
    q
}

/// One page ordered by id.
pub fn select_page(resource: &ResolvedResource, limit: u32, offset: u64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {} LIMIT {} OFFSET {}",
        select_column_list(resource),
        quoted(&resource.table),
        quoted(ID_COLUMN),
        limit,
        offset
    );
    q
}

pub fn count_all(resource: &ResolvedResource) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) FROM {}", quoted(&resource.table));
    q
}

/// INSERT from normalized values keyed by API name.
/// Fields that are absent or null but have a column default are omitted so the default applies.
pub fn insert(resource: &ResolvedResource, values: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for f in &resource.fields {
        let val = values.get(&f.name).filter(|v| !v.is_null()).cloned();
        if val.is_none() && f.has_default() {
            continue;
        }
        let n = q.push_param(val.unwrap_or(Value::Null));
        cols.push(quoted(&f.column));
        placeholders.push(format!("${}::{}", n, cast_type(f)));
    }
    if let Some(photo) = values.get(PHOTO_FIELD).filter(|v| !v.is_null()) {
        let n = q.push_param(photo.clone());
        cols.push(quoted(PHOTO_FIELD));
        placeholders.push(format!("${}::text", n));
    }
    let table = quoted(&resource.table);
    let returning = select_column_list(resource);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table,
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// Full-replacement UPDATE by id: every field and the photo are written. A missing value is NULL,
/// except for non-nullable columns with a default, which are reset to that default.
pub fn replace(resource: &ResolvedResource, id: i64, values: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for f in &resource.fields {
        let val = values.get(&f.name).cloned().unwrap_or(Value::Null);
        if val.is_null() && !f.nullable && f.has_default() {
            sets.push(format!("{} = DEFAULT", quoted(&f.column)));
            continue;
        }
        let n = q.push_param(val);
        sets.push(format!("{} = ${}::{}", quoted(&f.column), n, cast_type(f)));
    }
    let photo = values.get(PHOTO_FIELD).cloned().unwrap_or(Value::Null);
    let n = q.push_param(photo);
    sets.push(format!("{} = ${}::text", quoted(PHOTO_FIELD), n));
    if resource.timestamps {
        sets.push(format!("{} = NOW()", quoted(UPDATED_AT_COLUMN)));
    }
    let id_param = q.push_param(Value::from(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}::bigint RETURNING {}",
        quoted(&resource.table),
        sets.join(", "),
        quoted(ID_COLUMN),
        id_param,
        select_column_list(resource)
    );
    q
}

/// UPDATE only the photo column.
pub fn set_photo(resource: &ResolvedResource, id: i64, photo: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let photo_param = q.push_param(Value::String(photo.to_string()));
    let mut sets = vec![format!("{} = ${}::text", quoted(PHOTO_FIELD), photo_param)];
    if resource.timestamps {
        sets.push(format!("{} = NOW()", quoted(UPDATED_AT_COLUMN)));
    }
    let id_param = q.push_param(Value::from(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}::bigint RETURNING {}",
        quoted(&resource.table),
        sets.join(", "),
        quoted(ID_COLUMN),
        id_param,
        select_column_list(resource)
    );
    q
}

/// DELETE by id. Caller binds the id as $1.
pub fn delete(resource: &ResolvedResource) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1::bigint RETURNING {}",
        quoted(&resource.table),
        quoted(ID_COLUMN),
        quoted(ID_COLUMN)
    );
    q
}
