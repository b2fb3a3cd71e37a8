//! The `token` cookie: reading it from requests and building Set-Cookie values.

use axum::http::{header, HeaderMap};

pub const TOKEN_COOKIE: &str = "token";

/// Value of cookie `name` from the Cookie header(s).
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"'))
        .filter(|v| !v.is_empty())
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Cookie first, then the Authorization header.
pub fn request_token(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, TOKEN_COOKIE).or_else(|| bearer_token(headers))
}

pub fn token_cookie(token: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        TOKEN_COOKIE, token, max_age_secs
    )
}

pub fn clear_token_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", TOKEN_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=abc.def.ghi"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer other"));
        assert_eq!(request_token(&headers), Some("abc.def.ghi"));

        headers.remove(header::COOKIE);
        assert_eq!(request_token(&headers), Some("other"));

        headers.remove(header::AUTHORIZATION);
        assert_eq!(request_token(&headers), None);
    }

    #[test]
    fn empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert_eq!(cookie_value(&headers, TOKEN_COOKIE), None);
    }

    #[test]
    fn set_cookie_values() {
        assert_eq!(token_cookie("t", 60), "token=t; HttpOnly; SameSite=Lax; Path=/; Max-Age=60");
        assert!(clear_token_cookie().contains("Max-Age=0"));
    }
}
