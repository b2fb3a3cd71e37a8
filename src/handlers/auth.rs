//! Login, logout and the current-user endpoint.

use crate::auth::{clear_token_cookie, token_cookie, verify_password};
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::response::UserBody;
use crate::state::AppState;
use crate::store::find_user_by_username;
use axum::{
    extract::{FromRequest, Request, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().starts_with("application/json"))
        .unwrap_or(false)
}

/// POST /auth/login. JSON bodies get `{username}` back; HTML forms are redirected to `/`.
/// Both set the `token` cookie.
pub async fn login(State(state): State<AppState>, req: Request) -> Result<Response, AppError> {
    let json = is_json(&req);
    let creds = if json {
        let Json(c) = Json::<LoginRequest>::from_request(req, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        c
    } else {
        let Form(c) = Form::<LoginRequest>::from_request(req, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        c
    };

    let user = find_user_by_username(&state.pool, creds.username.trim())
        .await?
        .filter(|u| verify_password(&creds.password, &u.password_hash));
    let Some(user) = user else {
        tracing::warn!(username = %creds.username, "login failed");
        return Err(AppError::InvalidCredentials);
    };

    let token = state.auth.issue(user.id, &user.username, &user.role)?;
    let cookie = [(header::SET_COOKIE, token_cookie(&token, state.auth.ttl_secs()))];
    tracing::info!(username = %user.username, "logged in");
    if json {
        Ok((cookie, Json(UserBody { username: user.username })).into_response())
    } else {
        Ok((cookie, Redirect::to("/")).into_response())
    }
}

/// POST /auth/logout
pub async fn logout() -> Response {
    ([(header::SET_COOKIE, clear_token_cookie())], Redirect::to("/")).into_response()
}

/// GET /api/user
pub async fn me(user: CurrentUser) -> Json<UserBody> {
    Json(UserBody { username: user.username })
}
