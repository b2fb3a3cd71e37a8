use crate::auth::cookie::request_token;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Guard for every protected route.
///
/// Reads the JWT from the `token` cookie or a Bearer header. On success the
/// `CurrentUser` is stored as a request extension; otherwise the request ends with 401
/// before any handler runs.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(token) = request_token(req.headers()) else {
        tracing::warn!(path = %req.uri().path(), "no credentials");
        return AppError::Unauthorized.into_response();
    };
    match state.auth.verify(token) {
        Ok(claims) => match CurrentUser::try_from(claims) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                next.run(req).await
            }
            Err(e) => e.into_response(),
        },
        Err(e) => e.into_response(),
    }
}
