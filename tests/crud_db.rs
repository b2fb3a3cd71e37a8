//! CRUD through the router against a real PostgreSQL.
//!
//! Runs when `DATABASE_URL` is set and is skipped otherwise. Every test migrates its own copy of
//! the catalog tables (random suffix) and drops them at the end.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use catalog_server::config::{builtin_catalog, resolve, Settings};
use catalog_server::sql::quoted;
use catalog_server::{apply_migrations, build_router, AppState};
use serde_json::{json, Value};
use std::collections::HashMap;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "CATALOGBOUNDARY";
const PNG: &[u8] = b"png-bytes";

struct DbApp {
    router: Router,
    state: AppState,
    token: String,
    dir: TempDir,
}

/// None when no database is configured.
async fn db_app(uploads_blocked: bool) -> Option<DbApp> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return None;
    };
    let dir = tempfile::tempdir().unwrap();
    let public = dir.path().join("public");
    if uploads_blocked {
        std::fs::write(&public, b"not a directory").unwrap();
    }
    let env: HashMap<&str, String> = [
        ("AUTH_SECRET", "test-secret".to_string()),
        ("DATABASE_URL", url),
        ("PUBLIC_DIR", public.display().to_string()),
        ("VIEWS_DIR", dir.path().join("views").display().to_string()),
    ]
    .into_iter()
    .collect();
    let settings = Settings::from_lookup(|k| env.get(k).cloned()).unwrap();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&settings.database_url)
        .await
        .unwrap();

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let mut config = builtin_catalog().unwrap();
    for r in &mut config.resources {
        r.table = format!("{}_{}", r.table, suffix);
    }
    let catalog = resolve(&config).unwrap();
    apply_migrations(&pool, &catalog).await.unwrap();

    let state = AppState::new(pool, catalog, settings);
    let token = state.auth.issue(1, "admin", "admin").unwrap();
    Some(DbApp {
        router: build_router(state.clone()),
        state,
        token,
        dir,
    })
}

impl DbApp {
    async fn call(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(self.request(Method::GET, uri).body(Body::empty()).unwrap()).await
    }

    async fn send_json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = self
            .request(method, uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.call(req).await
    }

    async fn send_form(&self, uri: &str, fields: &[(&str, &str)], photo: Option<(&str, &[u8])>) -> (StatusCode, Value) {
        let req = self
            .request(Method::POST, uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(multipart_body(fields, photo)))
            .unwrap();
        self.call(req).await
    }

    fn request(&self, method: Method, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, format!("token={}", self.token))
    }

    fn table(&self, path: &str) -> String {
        quoted(&self.state.catalog.resource_by_path(path).unwrap().table)
    }

    async fn count(&self, path: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table(path)))
            .fetch_one(&self.state.pool)
            .await
            .unwrap()
    }

    async fn execute(&self, sql: &str) {
        sqlx::query(sql).execute(&self.state.pool).await.unwrap();
    }

    async fn drop_tables(self) {
        for r in &self.state.catalog.resources {
            let _ = sqlx::query(&format!("DROP TABLE IF EXISTS {}", quoted(&r.table)))
                .execute(&self.state.pool)
                .await;
        }
        self.state.pool.close().await;
    }
}

fn multipart_body(fields: &[(&str, &str)], photo: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = photo {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{}\"\r\n\
                 Content-Type: image/png\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn id_of(row: &Value) -> i64 {
    row["id"].as_i64().unwrap()
}

#[tokio::test]
async fn created_bicycle_reads_back_unchanged() {
    let Some(app) = db_app(false).await else { return };

    let (status, created) = app
        .send_json(Method::POST, "/api/bicycles", json!({"model": "Trek X1", "brand": "Trek"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = id_of(&created);
    assert_eq!(
        created,
        json!({
            "id": id,
            "model": "Trek X1",
            "brand": "Trek",
            "type": null,
            "manufactureYear": null,
            "condition": null,
            "isAvailable": true,
            "color": null,
            "serialNumber": null,
            "photo": null
        })
    );

    let (status, fetched) = app.get(&format!("/api/view-bicycle/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    app.drop_tables().await;
}

#[tokio::test]
async fn pages_hold_ten_rows_in_id_order() {
    let Some(app) = db_app(false).await else { return };

    for i in 0..12 {
        let (status, _) = app
            .send_json(Method::POST, "/api/bicycles", json!({"model": format!("Model {}", i)}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, first) = app.get("/api/bicycles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["currentPage"], 1);
    assert_eq!(first["totalItems"], 12);
    assert_eq!(first["totalPages"], 2);
    let ids: Vec<i64> = first["items"].as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(ids.len(), 10);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let (_, second) = app.get("/api/bicycles?page=2").await;
    let rest: Vec<i64> = second["items"].as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(rest.len(), 2);
    assert!(rest[0] > ids[9]);

    let (status, beyond) = app.get("/api/bicycles?page=9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(beyond["items"], json!([]));
    assert_eq!(beyond["currentPage"], 9);
    assert_eq!(beyond["totalPages"], 2);

    let (_, fallback) = app.get("/api/bicycles?page=zero").await;
    assert_eq!(fallback["currentPage"], 1);

    app.drop_tables().await;
}

#[tokio::test]
async fn json_update_replaces_every_field() {
    let Some(app) = db_app(false).await else { return };

    let (_, created) = app
        .send_json(
            Method::POST,
            "/api/bicycles",
            json!({"model": "Trek X1", "brand": "Trek", "color": "blue"}),
        )
        .await;
    let id = id_of(&created);

    let (status, updated) = app
        .send_json(
            Method::PUT,
            &format!("/api/bicycles/{}", id),
            json!({"model": "Trek X2", "color": "red"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id);
    assert_eq!(updated["model"], "Trek X2");
    assert_eq!(updated["color"], "red");
    assert_eq!(updated["brand"], Value::Null);
    assert_eq!(app.get(&format!("/api/view-bicycle/{}", id)).await.1, updated);

    let (status, _) = app
        .send_json(Method::PUT, "/api/bicycles/999999999", json!({"model": "Ghost"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.drop_tables().await;
}

#[tokio::test]
async fn television_price_falls_back_to_default() {
    let Some(app) = db_app(false).await else { return };

    let (status, created) = app
        .send_json(Method::POST, "/api/televisions", json!({"name": "OLED 55", "price": "1499.50"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["price"].as_f64(), Some(1499.5));
    assert_eq!(created["isInStock"], true);
    assert!(created["createdAt"].is_string());

    let (status, updated) = app
        .send_json(
            Method::PUT,
            &format!("/api/televisions/{}", id_of(&created)),
            json!({"name": "OLED 65"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"].as_f64(), Some(0.0));
    assert!(updated["updatedAt"].is_string());

    app.drop_tables().await;
}

#[tokio::test]
async fn deleted_row_is_gone() {
    let Some(app) = db_app(false).await else { return };

    let (_, created) = app
        .send_json(Method::POST, "/api/repair-services", json!({"name": "Tune-up", "cost": 25}))
        .await;
    let id = id_of(&created);

    let delete = |app: &DbApp| {
        app.request(Method::DELETE, &format!("/delete-repair-service/{}", id))
            .body(Body::empty())
            .unwrap()
    };
    let (status, body) = app.call(delete(&app)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Repair service deleted"}));

    let (status, body) = app.get(&format!("/api/view-repair-service/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Repair service not found");

    let (status, _) = app.call(delete(&app)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.drop_tables().await;
}

#[tokio::test]
async fn form_create_and_edit_manage_the_photo() {
    let Some(app) = db_app(false).await else { return };

    let (status, _) = app
        .send_form(
            "/add-sale",
            &[("customerName", "  Ivan Petrov "), ("saleYear", "2024"), ("isConfirmed", "on")],
            Some(("receipt.png", PNG)),
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, page) = app.get("/api/sales").await;
    let sale = page["items"][0].clone();
    assert_eq!(sale["customerName"], "Ivan Petrov");
    assert_eq!(sale["saleYear"], 2024);
    assert_eq!(sale["isConfirmed"], true);
    assert_eq!(sale["photo"], "/images/sales/receipt.png");
    let stored = app.dir.path().join("public/images/sales/receipt.png");
    assert_eq!(std::fs::read(&stored).unwrap(), PNG);

    let (status, _) = app
        .send_form(
            &format!("/edit-sale/{}", id_of(&sale)),
            &[("customerName", "Ivan Petrov"), ("notes", "paid")],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let (_, edited) = app.get(&format!("/api/view-sale/{}", id_of(&sale))).await;
    assert_eq!(edited["notes"], "paid");
    assert_eq!(edited["isConfirmed"], false);
    assert_eq!(edited["saleYear"], Value::Null);
    assert_eq!(edited["photo"], "/images/sales/receipt.png");

    let (status, _) = app
        .send_form("/edit-sale/999999999", &[("customerName", "Nobody")], None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.drop_tables().await;
}

#[tokio::test]
async fn failed_photo_storage_removes_created_row() {
    let Some(app) = db_app(true).await else { return };

    let (status, body) = app
        .send_form("/add-bicycle", &[("model", "Trek X1")], Some(("x.png", PNG)))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "internal server error");
    assert_eq!(app.count("bicycles").await, 0);

    app.drop_tables().await;
}

#[tokio::test]
async fn failed_photo_update_removes_created_row() {
    let Some(app) = db_app(false).await else { return };
    app.execute(&format!(
        "ALTER TABLE {} ADD CHECK (photo IS NULL OR photo NOT LIKE '%rejected%')",
        app.table("bicycles")
    ))
    .await;

    let (status, _) = app
        .send_form("/add-bicycle", &[("model", "Trek X1")], Some(("rejected.png", PNG)))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.count("bicycles").await, 0);

    let (status, _) = app
        .send_form("/add-bicycle", &[("model", "Trek X1")], Some(("accepted.png", PNG)))
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(app.count("bicycles").await, 1);

    app.drop_tables().await;
}

#[tokio::test]
async fn overlong_photo_name_is_rejected_without_a_row() {
    let Some(app) = db_app(false).await else { return };

    let name = format!("{}.png", "a".repeat(245));
    let (status, _) = app
        .send_form("/add-television", &[("name", "OLED 55")], Some((name.as_str(), PNG)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.count("televisions").await, 0);

    app.drop_tables().await;
}
