//! Resource handlers shared by every catalog resource. The resource itself arrives as an
//! `Extension` set on its sub-router.

use crate::config::ResolvedResource;
use crate::error::{AppError, FormError};
use crate::extractors::FormSubmission;
use crate::response::{parse_page, MessageBody, PageBody};
use crate::service::{normalize_form, normalize_json, CrudService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Redirect,
    Extension, Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

type Resource = Extension<Arc<ResolvedResource>>;

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("invalid id: {}", raw)))
}

fn body_object(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, AppError> {
    let Json(value) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// GET /api/{r}?page=N
pub async fn list(
    State(state): State<AppState>,
    Extension(resource): Resource,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<PageBody>, AppError> {
    let page = parse_page(query.get("page").map(String::as_str));
    let body = CrudService::list_page(&state.pool, &resource, page).await?;
    Ok(Json(body))
}

/// GET /api/view-{s}/:id
pub async fn read(
    State(state): State<AppState>,
    Extension(resource): Resource,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    CrudService::read(&state.pool, &resource, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(resource.not_found_message()))
}

/// POST /api/{r}
pub async fn create_json(
    State(state): State<AppState>,
    Extension(resource): Resource,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let values = normalize_json(&resource, &body_object(body)?);
    RequestValidator::validate(&resource, &values)?;
    let row = CrudService::create(&state.pool, &resource, &values).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/{r}/:id. Full replacement: omitted fields are cleared.
pub async fn replace_json(
    State(state): State<AppState>,
    Extension(resource): Resource,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let values = normalize_json(&resource, &body_object(body)?);
    RequestValidator::validate(&resource, &values)?;
    CrudService::replace(&state.pool, &resource, id, &values)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(resource.not_found_message()))
}

/// DELETE /delete-{s}/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(resource): Resource,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, AppError> {
    let id = parse_id(&id)?;
    if !CrudService::delete(&state.pool, &resource, id).await? {
        return Err(AppError::NotFound(resource.not_found_message()));
    }
    Ok(Json(MessageBody {
        message: resource.deleted_message(),
    }))
}

/// POST /add-{s}: multipart create, then back to the listing page.
pub async fn add_form(
    State(state): State<AppState>,
    Extension(resource): Resource,
    form: FormSubmission,
) -> Result<Redirect, FormError> {
    let values = normalize_form(&resource, &form.fields);
    RequestValidator::validate(&resource, &values)?;
    CrudService::create_with_upload(&state.pool, &state.uploads, &resource, &values, form.photo.as_ref()).await?;
    Ok(Redirect::to(&resource.index_page()))
}

/// POST /edit-{s}/:id: multipart update keeping the current photo unless a new one is sent.
pub async fn edit_form(
    State(state): State<AppState>,
    Extension(resource): Resource,
    Path(id): Path<String>,
    form: FormSubmission,
) -> Result<Redirect, FormError> {
    let id = parse_id(&id)?;
    let values = normalize_form(&resource, &form.fields);
    RequestValidator::validate(&resource, &values)?;
    CrudService::edit_with_upload(&state.pool, &state.uploads, &resource, id, &values, form.photo.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound(resource.not_found_message()))?;
    Ok(Redirect::to(&resource.index_page()))
}

/// GET /list-{r}
pub async fn list_redirect(Extension(resource): Resource) -> Redirect {
    Redirect::to(&resource.index_page())
}
