//! Shared application state, built once at startup and cloned into every handler.

use crate::auth::AuthKeys;
use crate::config::{ResolvedCatalog, Settings};
use crate::upload::UploadStore;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub catalog: Arc<ResolvedCatalog>,
    pub uploads: Arc<UploadStore>,
    pub auth: Arc<AuthKeys>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(pool: PgPool, catalog: ResolvedCatalog, settings: Settings) -> Self {
        AppState {
            pool,
            catalog: Arc::new(catalog),
            uploads: Arc::new(UploadStore::new(&settings.public_dir)),
            auth: Arc::new(AuthKeys::new(&settings.auth_secret, settings.token_ttl_secs)),
            settings: Arc::new(settings),
        }
    }
}
