//! Apply the catalog to the database: one table per resource.
//! Idempotent: CREATE TABLE IF NOT EXISTS, then ADD COLUMN IF NOT EXISTS for fields added later.

use crate::config::{ResolvedCatalog, ResolvedField, ResolvedResource, PHOTO_FIELD};
use crate::error::AppError;
use crate::sql::{quoted, CREATED_AT_COLUMN, ID_COLUMN, UPDATED_AT_COLUMN};
use sqlx::PgPool;

const PHOTO_TYPE: &str = "varchar(255)";
const TIMESTAMP_TYPE: &str = "TIMESTAMPTZ NOT NULL DEFAULT NOW()";

pub async fn apply_migrations(pool: &PgPool, catalog: &ResolvedCatalog) -> Result<(), AppError> {
    for resource in &catalog.resources {
        let sql = create_table_sql(resource);
        tracing::debug!(sql = %sql, "migration");
        sqlx::query(&sql).execute(pool).await?;
        for sql in add_column_sql(resource) {
            sqlx::query(&sql).execute(pool).await?;
        }
        tracing::info!(table = %resource.table, "table ready");
    }
    Ok(())
}

fn column_def(f: &ResolvedField) -> String {
    let mut def = format!("{} {}", quoted(&f.column), f.pg_type);
    if !f.nullable {
        def.push_str(" NOT NULL");
    }
    if let Some(ref d) = f.default_sql {
        def.push_str(" DEFAULT ");
        def.push_str(d);
    }
    def
}

/// Column definitions after the primary key, in table order.
fn column_defs(resource: &ResolvedResource) -> Vec<String> {
    let mut defs: Vec<String> = resource.fields.iter().map(column_def).collect();
    defs.push(format!("{} {}", quoted(PHOTO_FIELD), PHOTO_TYPE));
    if resource.timestamps {
        defs.push(format!("{} {}", quoted(CREATED_AT_COLUMN), TIMESTAMP_TYPE));
        defs.push(format!("{} {}", quoted(UPDATED_AT_COLUMN), TIMESTAMP_TYPE));
    }
    defs
}

pub fn create_table_sql(resource: &ResolvedResource) -> String {
    let mut col_defs = vec![format!("{} BIGSERIAL PRIMARY KEY", quoted(ID_COLUMN))];
    col_defs.extend(column_defs(resource));
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quoted(&resource.table),
        col_defs.join(",\n  ")
    )
}

pub fn add_column_sql(resource: &ResolvedResource) -> Vec<String> {
    let table = quoted(&resource.table);
    column_defs(resource)
        .into_iter()
        .map(|def| format!("ALTER TABLE {} ADD COLUMN IF NOT EXISTS {}", table, def))
        .collect()
}
