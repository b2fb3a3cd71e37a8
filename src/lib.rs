//! catalog-server: descriptor-driven inventory catalog backend (PostgreSQL, cookie auth, photo uploads).

pub mod auth;
pub mod case;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod upload;

pub use config::{load_catalog, resolve, ResolvedCatalog, ResolvedResource, Settings};
pub use error::{AppError, ConfigError, FormError, UploadError};
pub use migration::apply_migrations;
pub use routes::build_router;
pub use service::CrudService;
pub use state::AppState;
pub use store::{ensure_auth_tables, ensure_database_exists};
