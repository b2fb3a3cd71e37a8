//! Static files: uploaded images, view assets and one view directory per resource.

use crate::state::AppState;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

pub fn asset_routes(state: &AppState) -> Router<AppState> {
    let views = &state.settings.views_dir;
    let mut router = Router::new()
        .nest_service("/images", ServeDir::new(state.uploads.images_dir()))
        .nest_service("/css", ServeDir::new(views.join("css")))
        .nest_service("/js", ServeDir::new(views.join("js")));
    for resource in &state.catalog.resources {
        router = router.nest_service(
            &format!("/{}", resource.path),
            ServeDir::new(views.join(&resource.path)),
        );
    }
    router
}

/// Guarded home page.
pub fn index_routes(state: &AppState) -> Router<AppState> {
    Router::new().route_service("/", ServeFile::new(state.settings.views_dir.join("index.html")))
}
