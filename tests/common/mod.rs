#![allow(dead_code)]

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use procure_ease::{build_router, config::AppConfig, db, events, AppState};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use tempfile::TempDir;
use tower::ServiceExt;

/// Full application over a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
    _dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        procure_ease::metrics::init_metrics().expect("metrics recorder");
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("procure_ease_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;
        cfg.db_max_connections = 2;
        cfg.db_min_connections = 1;
        cfg.static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string();

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = events::channel();
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(pool, cfg, event_sender);
        let router = build_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
            _dir: dir,
        }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("build request")).await
    }

    /// Send a prebuilt request.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn post_empty(&self, uri: &str) -> Response {
        self.request(Method::POST, uri, None).await
    }

    pub async fn patch_empty(&self, uri: &str) -> Response {
        self.request(Method::PATCH, uri, None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Response {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.request(Method::DELETE, uri, None).await
    }

    /// POSTs `body` and returns the created `data`, asserting 201.
    pub async fn create(&self, uri: &str, body: Value) -> Value {
        let response = self.post(uri, body).await;
        let status = response.status();
        let payload = response_json(response).await;
        assert_eq!(status, StatusCode::CREATED, "create {} failed: {}", uri, payload);
        payload["data"].clone()
    }

    /// POSTs a transition and returns `data`, asserting 200.
    pub async fn transition(&self, uri: &str) -> Value {
        let response = self.post_empty(uri).await;
        let status = response.status();
        let payload = response_json(response).await;
        assert_eq!(status, StatusCode::OK, "transition {} failed: {}", uri, payload);
        payload["data"].clone()
    }

    pub async fn create_vendor(&self, email: &str) -> Value {
        self.create(
            "/api/v1/vendors",
            json!({
                "name": "Acme Supplies",
                "contact": "Dana Reyes",
                "email": email,
                "phone": "+1-555-0100"
            }),
        )
        .await
    }

    pub async fn create_requisition(&self, item: &str) -> Value {
        self.create(
            "/api/v1/requisitions",
            json!({
                "item": item,
                "quantity": 4,
                "requested_by": "Facilities",
                "date": today().to_string()
            }),
        )
        .await
    }

    pub async fn approved_requisition(&self, item: &str) -> i64 {
        let id = id_of(&self.create_requisition(item).await);
        self.transition(&format!("/api/v1/requisitions/{}/approve", id))
            .await;
        id
    }

    /// Purchase order in Pending Approval for a fresh vendor and requisition.
    pub async fn create_purchase_order(&self, tag: &str, total: &str) -> Value {
        let requisition_id = self.approved_requisition(&format!("{} item", tag)).await;
        let vendor_id = id_of(&self.create_vendor(&format!("{}@vendor.test", tag)).await);
        self.create(
            "/api/v1/purchase-orders",
            json!({
                "requisition_id": requisition_id,
                "vendor_id": vendor_id,
                "total_amount": total,
                "order_date": today().to_string()
            }),
        )
        .await
    }

    /// Purchase order walked through to Issued.
    pub async fn issued_purchase_order(&self, tag: &str, total: &str) -> i64 {
        let id = id_of(&self.create_purchase_order(tag, total).await);
        self.transition(&format!("/api/v1/purchase-orders/{}/approve", id))
            .await;
        self.transition(&format!("/api/v1/purchase-orders/{}/issue", id))
            .await;
        id
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn id_of(data: &Value) -> i64 {
    data["id"].as_i64().expect("record id")
}

/// Reads a money value serialized either as a string or a number.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal: {}", other),
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_from_today(days: i64) -> String {
    (today() + Duration::days(days)).to_string()
}

/// `PO` + current year and month, the prefix every code issued today shares.
pub fn month_code(prefix: &str) -> String {
    format!("{}{}", prefix, today().format("%Y%m"))
}

/// Code prefix for the calendar month before the current one.
pub fn previous_month_code(prefix: &str) -> String {
    let first_of_month = today().with_day(1).expect("first day of month");
    format!(
        "{}{}",
        prefix,
        (first_of_month - Duration::days(1)).format("%Y%m")
    )
}

/// Field messages from a 422 body.
pub fn field_errors<'a>(payload: &'a Value, field: &str) -> &'a Vec<Value> {
    payload["errors"][field]
        .as_array()
        .unwrap_or_else(|| panic!("no errors for {} in {}", field, payload))
}
