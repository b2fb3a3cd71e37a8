//! Router assembly: public routes, the auth guard over everything else, and the tower-http layers.

mod assets;
mod auth;
mod common;
mod resource;

pub use assets::{asset_routes, index_routes};
pub use auth::{auth_routes, user_routes};
pub use common::common_routes;
pub use resource::{resource_router, resource_routes};

use crate::auth::require_auth;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{Html, IntoResponse, Response},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Unknown routes: `<views_dir>/error.html` with 404, or a JSON 404 when the page is missing.
async fn not_found(State(state): State<AppState>) -> Response {
    let page = state.settings.views_dir.join("error.html");
    match tokio::fs::read_to_string(&page).await {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => AppError::NotFound("not found".into()).into_response(),
    }
}

pub fn build_router(state: AppState) -> Router {
    let guarded = Router::new()
        .merge(resource_routes(&state))
        .merge(user_routes())
        .merge(index_routes(&state))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(common_routes())
        .merge(auth_routes())
        .merge(asset_routes(&state))
        .merge(guarded)
        .fallback(not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.settings.max_upload_bytes))
        .layer(cors_layer(&state.settings.cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);
    match HeaderValue::from_str(origin) {
        Ok(v) => layer.allow_origin(v),
        Err(_) => {
            tracing::warn!(origin, "invalid CORS_ORIGIN; cross-origin requests disabled");
            layer
        }
    }
}
