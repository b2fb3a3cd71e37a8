//! Process settings from environment (`.env` is loaded by the binaries via dotenvy).

use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;

/// Secret used when `AUTH_SECRET` is unset in debug builds only.
const DEV_AUTH_SECRET: &str = "catalog-server-dev-secret";

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    /// Root for uploaded files; images live under `<public_dir>/images/<folder>`.
    pub public_dir: PathBuf,
    /// Root of the static views (index.html, css/, js/, one directory per resource).
    pub views_dir: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub auth_secret: String,
    pub token_ttl_secs: u64,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
    pub db_max_connections: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build settings from any key lookup (env in production, a map in tests).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_secret = match get("AUTH_SECRET").filter(|s| !s.trim().is_empty()) {
            Some(s) => s,
            None if cfg!(debug_assertions) => {
                tracing::warn!("AUTH_SECRET not set; using the development secret");
                DEV_AUTH_SECRET.to_string()
            }
            None => return Err(ConfigError::Load("AUTH_SECRET must be set".into())),
        };
        Ok(Settings {
            database_url: get("DATABASE_URL").unwrap_or_else(|| "postgres://localhost/catalog".into()),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            public_dir: get("PUBLIC_DIR").map(PathBuf::from).unwrap_or_else(|| "public".into()),
            views_dir: get("VIEWS_DIR").map(PathBuf::from).unwrap_or_else(|| "views".into()),
            catalog_path: get("CATALOG_PATH").filter(|s| !s.is_empty()).map(PathBuf::from),
            auth_secret,
            token_ttl_secs: parse_or(&get, "AUTH_TOKEN_TTL_SECS", 86_400)?,
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:8080".into()),
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 5)?,
        })
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Load(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply() {
        let s = Settings::from_lookup(lookup(&[("AUTH_SECRET", "s3cret")])).unwrap();
        assert_eq!(s.bind_addr, "0.0.0.0:3000");
        assert_eq!(s.public_dir, PathBuf::from("public"));
        assert_eq!(s.token_ttl_secs, 86_400);
        assert_eq!(s.max_upload_bytes, 10 * 1024 * 1024);
        assert!(s.catalog_path.is_none());
        assert_eq!(s.auth_secret, "s3cret");
    }

    #[test]
    fn overrides_and_bad_numbers() {
        let s = Settings::from_lookup(lookup(&[
            ("AUTH_SECRET", "x"),
            ("AUTH_TOKEN_TTL_SECS", "60"),
            ("CATALOG_PATH", "/etc/catalog.json"),
        ]))
        .unwrap();
        assert_eq!(s.token_ttl_secs, 60);
        assert_eq!(s.catalog_path, Some(PathBuf::from("/etc/catalog.json")));

        let err = Settings::from_lookup(lookup(&[("AUTH_SECRET", "x"), ("DB_MAX_CONNECTIONS", "many")]));
        assert!(err.is_err());
    }
}
