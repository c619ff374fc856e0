#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};
use storefront_api::{
    app_router,
    config::AppConfig,
    db,
    entities::{gst_setting, making_cost, product},
    events,
    AppState,
};
use tower::ServiceExt;

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

/// Test configuration over a private in-memory database.
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        environment: "test".to_string(),
        db_max_connections: 1,
        db_min_connections: 1,
        ..AppConfig::default()
    }
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(cfg: AppConfig) -> Self {
        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (sender, rx) = events::channel(64);
        let event_task = tokio::spawn(events::process_events(rx));

        let state = AppState::new(Arc::new(pool), cfg, Some(sender));
        let router = app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.raw_request(method, uri, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn raw_request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router response")
    }

    pub async fn insert_product(
        &self,
        id: i32,
        weight: f64,
        metal_type: &str,
        metal_rate: f64,
        price: f64,
    ) -> product::Model {
        self.insert_priced_product(id, weight, metal_type, metal_rate, 0.0, price)
            .await
    }

    /// Inserts a product whose stored price already includes `making_charge`.
    pub async fn insert_priced_product(
        &self,
        id: i32,
        weight: f64,
        metal_type: &str,
        metal_rate: f64,
        making_charge: f64,
        price: f64,
    ) -> product::Model {
        let now = Utc::now();
        product::ActiveModel {
            id: Set(id),
            name: Set(format!("Product {id}")),
            description: Set(None),
            category: Set(Some("Rings".to_string())),
            weight: Set(weight),
            metal_type: Set(metal_type.to_string()),
            metal_rate: Set(metal_rate),
            making_charge: Set(making_charge),
            price: Set(price),
            image_url: Set(None),
            in_stock: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.state.db)
        .await
        .expect("insert product")
    }

    pub async fn insert_making_cost(&self, metal_type: &str, percentage: f64) {
        let now = Utc::now();
        making_cost::ActiveModel {
            metal_type: Set(metal_type.to_string()),
            percentage: Set(percentage),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("insert making cost");
    }

    pub async fn insert_gst(&self, percentage: f64) {
        let now = Utc::now();
        gst_setting::ActiveModel {
            percentage: Set(percentage),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("insert gst setting");
    }
}

/// Cart body for `/create-payment` with one line per `(product_id, client_price, quantity)`.
pub fn cart(user_id: &str, lines: &[(i32, f64, u32)]) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .map(|(id, price, quantity)| {
            json!({
                "product": {
                    "id": id,
                    "name": format!("Product {id}"),
                    "price": price,
                },
                "quantity": quantity,
            })
        })
        .collect();
    json!({ "items": items, "userId": user_id })
}
