//! One sub-router per catalog resource; each carries its descriptor as an `Extension`.

use crate::config::ResolvedResource;
use crate::handlers::resource::{
    add_form, create_json, delete, edit_form, list, list_redirect, read, replace_json,
};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use std::sync::Arc;

pub fn resource_router(resource: Arc<ResolvedResource>) -> Router<AppState> {
    let r = &resource.path;
    let s = &resource.singular;
    Router::new()
        .route(&format!("/api/{}", r), get(list).post(create_json))
        .route(&format!("/api/{}/:id", r), put(replace_json))
        .route(&format!("/api/view-{}/:id", s), get(read))
        .route(&format!("/delete-{}/:id", s), axum::routing::delete(delete))
        .route(&format!("/add-{}", s), post(add_form))
        .route(&format!("/edit-{}/:id", s), post(edit_form))
        .route(&format!("/list-{}", r), get(list_redirect))
        .layer(Extension(resource.clone()))
}

/// Routes for every resource in the catalog.
pub fn resource_routes(state: &AppState) -> Router<AppState> {
    state
        .catalog
        .resources
        .iter()
        .cloned()
        .fold(Router::new(), |router, resource| router.merge(resource_router(resource)))
}
