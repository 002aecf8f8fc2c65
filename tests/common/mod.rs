use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;
use wastesmart_api::{
    config::AppConfig,
    db,
    entities::{charity, product, user, vendor},
    events::{self, EventSender},
    AppState,
};

/// Test harness backed by a throwaway SQLite database file. Every
/// instance gets its own file so tests can run in parallel.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    db_file: String,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_file = format!("wastesmart_test_{}.db", Uuid::new_v4().simple());
        let _ = std::fs::remove_file(&db_file);

        let mut cfg = AppConfig::new(
            format!("sqlite://{db_file}?mode=rwc"),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx, db_arc.clone()));

        let state = AppState::new(db_arc, cfg, Some(event_sender));

        let router = Router::new()
            .nest("/api/v1", wastesmart_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            db_file,
            _event_task: event_task,
        }
    }

    /// Send a JSON request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Read a response body as JSON.
    pub async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        serde_json::from_slice(&bytes).expect("response body was not valid json")
    }

    pub async fn seed_user(&self, name: &str, role: &str) -> user::Model {
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(format!("{}@example.com", Uuid::new_v4().simple())),
            role: Set(role.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed user for tests")
    }

    pub async fn seed_vendor(&self, name: &str) -> vendor::Model {
        vendor::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            contact: Set("vendor@example.com".to_string()),
            location: Set("Test Market".to_string()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed vendor for tests")
    }

    pub async fn seed_charity(&self, name: &str) -> charity::Model {
        charity::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            location: Set("Test City".to_string()),
            contact: Set("charity@example.com".to_string()),
            website: Set(None),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed charity for tests")
    }

    pub async fn seed_product(
        &self,
        vendor_id: Uuid,
        name: &str,
        price: Decimal,
        quantity: i32,
        charity_eligible: bool,
    ) -> product::Model {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(None),
            price: Set(price),
            quantity: Set(quantity),
            expiry_date: Set(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
            vendor_id: Set(vendor_id),
            charity_eligible: Set(charity_eligible),
            created_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed product for tests")
    }
}

/// Read a Decimal out of a JSON field regardless of whether it was
/// serialized as a string or a bare number.
pub fn decimal_value(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("invalid decimal string in response"),
        Value::Number(n) => n
            .to_string()
            .parse()
            .expect("invalid decimal number in response"),
        other => panic!("expected decimal value, got {other:?}"),
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
        let _ = std::fs::remove_file(&self.db_file);
    }
}
