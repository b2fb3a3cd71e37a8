use crate::handlers::auth::{login, logout, me};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Public login/logout.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Guarded: GET /api/user.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/api/user", get(me))
}
