//! Generic CRUD execution against PostgreSQL, driven by a resolved resource.

use crate::case::to_camel_case;
use crate::config::{FieldKind, ResolvedResource, PHOTO_FIELD};
use crate::error::AppError;
use crate::response::{total_pages, PageBody, PAGE_SIZE};
use crate::service::normalize::{normalize_photo_path, Values};
use crate::sql::{
    count_all, delete, insert, replace, select_by_id, select_page, set_photo, PgBindValue, QueryBuf,
    CREATED_AT_COLUMN, ID_COLUMN, UPDATED_AT_COLUMN,
};
use crate::upload::{FileUpload, UploadStore};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct CrudService;

impl CrudService {
    /// One page (1-based) of rows ordered by id, with totals. A page past the end is empty.
    pub async fn list_page(pool: &PgPool, resource: &ResolvedResource, page: u32) -> Result<PageBody, AppError> {
        let page = page.max(1);
        let count_q = count_all(resource);
        tracing::debug!(sql = %count_q.sql, "query");
        let total_items: i64 = sqlx::query_scalar(&count_q.sql).fetch_one(pool).await?;
        let total_items = total_items.max(0) as u64;

        let offset = u64::from(page - 1) * u64::from(PAGE_SIZE);
        let q = select_page(resource, PAGE_SIZE, offset);
        let items = Self::query_many(pool, resource, &q).await?;
        Ok(PageBody {
            items,
            current_page: page,
            total_pages: total_pages(total_items, PAGE_SIZE),
            total_items,
        })
    }

    /// Fetch one row by id.
    pub async fn read(pool: &PgPool, resource: &ResolvedResource, id: i64) -> Result<Option<Value>, AppError> {
        let mut q = select_by_id(resource);
        q.params.push(Value::from(id));
        Self::query_optional(pool, resource, &q).await
    }

    /// Insert one row from normalized values. Returns the created row.
    pub async fn create(pool: &PgPool, resource: &ResolvedResource, values: &Values) -> Result<Value, AppError> {
        let q = insert(resource, values);
        let row = Self::query_optional(pool, resource, &q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        tracing::info!(resource = %resource.path, id = ?row.get(ID_COLUMN), "created");
        Ok(row)
    }

    /// Full replacement of every field and the photo. None if the row does not exist.
    pub async fn replace(
        pool: &PgPool,
        resource: &ResolvedResource,
        id: i64,
        values: &Values,
    ) -> Result<Option<Value>, AppError> {
        let q = replace(resource, id, values);
        let row = Self::query_optional(pool, resource, &q).await?;
        if row.is_some() {
            tracing::info!(resource = %resource.path, id, "updated");
        }
        Ok(row)
    }

    pub async fn set_photo(
        pool: &PgPool,
        resource: &ResolvedResource,
        id: i64,
        photo: &str,
    ) -> Result<Option<Value>, AppError> {
        let q = set_photo(resource, id, photo);
        Self::query_optional(pool, resource, &q).await
    }

    /// Delete one row by id. Returns false if nothing matched. Stored photos are left in place.
    pub async fn delete(pool: &PgPool, resource: &ResolvedResource, id: i64) -> Result<bool, AppError> {
        let q = delete(resource);
        tracing::debug!(sql = %q.sql, id, "query");
        let deleted = sqlx::query(&q.sql)
            .bind(PgBindValue::I64(id))
            .fetch_optional(pool)
            .await?
            .is_some();
        if deleted {
            tracing::info!(resource = %resource.path, id, "deleted");
        }
        Ok(deleted)
    }

    /// Two-phase create: insert the row without a photo, then store the file and record its path.
    /// If storing the file or recording its path fails, the row is deleted again and that error is returned.
    pub async fn create_with_upload(
        pool: &PgPool,
        uploads: &UploadStore,
        resource: &ResolvedResource,
        values: &Values,
        photo: Option<&FileUpload>,
    ) -> Result<Value, AppError> {
        let mut values = values.clone();
        values.remove(PHOTO_FIELD);
        let row = Self::create(pool, resource, &values).await?;
        let Some(file) = photo else {
            return Ok(row);
        };
        let id = row
            .get(ID_COLUMN)
            .and_then(Value::as_i64)
            .ok_or_else(|| AppError::Internal("created row has no id".into()))?;

        let attached = match uploads.store(&resource.folder, file).await {
            Ok(path) => Self::set_photo(pool, resource, id, &path)
                .await
                .and_then(|row| row.ok_or_else(|| AppError::NotFound(resource.not_found_message()))),
            Err(e) => Err(e.into()),
        };
        if let Err(ref e) = attached {
            tracing::warn!(resource = %resource.path, id, error = %e, "photo not attached; removing created row");
            if let Err(rollback) = Self::delete(pool, resource, id).await {
                tracing::error!(resource = %resource.path, id, error = %rollback, "compensating delete failed");
            }
        }
        attached
    }

    /// Form edit: replace all fields, keeping the current photo unless a new file is given.
    /// None if the row does not exist. The superseded file is not removed.
    pub async fn edit_with_upload(
        pool: &PgPool,
        uploads: &UploadStore,
        resource: &ResolvedResource,
        id: i64,
        values: &Values,
        photo: Option<&FileUpload>,
    ) -> Result<Option<Value>, AppError> {
        let Some(existing) = Self::read(pool, resource, id).await? else {
            return Ok(None);
        };
        let photo_path = match photo {
            Some(file) => Value::String(uploads.store(&resource.folder, file).await?),
            None => existing.get(PHOTO_FIELD).cloned().unwrap_or(Value::Null),
        };
        let mut values = values.clone();
        values.insert(PHOTO_FIELD.to_string(), photo_path);
        Self::replace(pool, resource, id, &values).await
    }

    async fn query_optional(
        pool: &PgPool,
        resource: &ResolvedResource,
        q: &QueryBuf,
    ) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(pool).await?;
        row.map(|r| row_to_json(resource, &r)).transpose()
    }

    async fn query_many(pool: &PgPool, resource: &ResolvedResource, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(pool).await?;
        rows.iter().map(|r| row_to_json(resource, r)).collect()
    }
}

/// Decode a row into the API shape: camelCase keys, decimals as numbers, photo path normalized.
fn row_to_json(resource: &ResolvedResource, row: &PgRow) -> Result<Value, AppError> {
    let mut map = Map::new();
    let id: i64 = row.try_get(ID_COLUMN)?;
    map.insert(ID_COLUMN.to_string(), Value::from(id));
    for f in &resource.fields {
        let col = f.column.as_str();
        let v = match f.kind {
            FieldKind::Text | FieldKind::LongText => row.try_get::<Option<String>, _>(col)?.map(Value::String),
            FieldKind::Integer => row.try_get::<Option<i32>, _>(col)?.map(Value::from),
            FieldKind::Decimal => row
                .try_get::<Option<f64>, _>(col)?
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            FieldKind::Boolean => row.try_get::<Option<bool>, _>(col)?.map(Value::Bool),
        };
        map.insert(f.name.clone(), v.unwrap_or(Value::Null));
    }
    let photo = row
        .try_get::<Option<String>, _>(PHOTO_FIELD)?
        .map(|p| Value::String(normalize_photo_path(&p)))
        .unwrap_or(Value::Null);
    map.insert(PHOTO_FIELD.to_string(), photo);
    if resource.timestamps {
        for col in [CREATED_AT_COLUMN, UPDATED_AT_COLUMN] {
            let ts = row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(col)?
                .map(|d| Value::String(d.to_rfc3339()))
                .unwrap_or(Value::Null);
            map.insert(to_camel_case(col), ts);
        }
    }
    Ok(Value::Object(map))
}
