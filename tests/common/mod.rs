use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use garment_api::config::AppConfig;
use garment_api::db::{establish_connection, run_migrations};
use garment_api::handlers::AppServices;
use garment_api::{app, events, AppState};

/// In-process application over an in-memory sqlite database.
///
/// The pool is pinned to a single connection; sqlite gives every
/// connection its own private in-memory database.
pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            environment: "test".to_string(),
            db_max_connections: 1,
            db_min_connections: 1,
            ..Default::default()
        };

        let db = Arc::new(
            establish_connection(&config)
                .await
                .expect("connect to in-memory database"),
        );
        run_migrations(&db).await.expect("run migrations");

        let (event_sender, event_receiver) = events::channel(64);
        tokio::spawn(events::process_events(event_receiver));

        let services = AppServices::new(db.clone(), event_sender);
        let state = AppState::new(db, config, services);
        Self { router: app(state) }
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", path, Some(body)).await
    }

    #[allow(dead_code)]
    pub async fn patch(&self, path: &str) -> (StatusCode, Value) {
        self.request("PATCH", path, None).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.request("DELETE", path, None).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("dispatch request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

/// Decimals travel as JSON strings; compare them numerically so scale
/// differences ("15" vs "15.00") do not fail assertions.
#[allow(dead_code)]
pub fn dec(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
        .parse()
        .expect("parse decimal")
}
