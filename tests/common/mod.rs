#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use storefront_api::{
    auth::{AuthService, Claims},
    config::AppConfig,
    entities::{product, product_image, product_variant},
    handlers::AppServices,
    store::{CatalogWriter, InMemoryCatalogStore},
    AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str =
    "integration-secret_0123456789-abcdefghijklmnopqrstuvwxyz-ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Helper harness for spinning up the full router over an in-memory catalog.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub store: Arc<InMemoryCatalogStore>,
    token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;

        let store = Arc::new(InMemoryCatalogStore::new());
        let services = AppServices::new(
            store.clone(),
            cfg.listing_default_limit,
            cfg.listing_max_limit,
        );

        let state = AppState {
            auth: Arc::new(AuthService::new(&cfg.jwt_secret)),
            config: Arc::new(cfg),
            services,
        };
        let router = storefront_api::build_router(state.clone()).expect("router builds");

        Self {
            router,
            state,
            store,
            token: mint_token(&["admin"], 3600),
        }
    }

    /// Bearer token for the default admin user.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

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

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        read_json(self.request(Method::GET, uri, None, None).await).await
    }

    /// Authenticated JSON request as the admin user.
    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        read_json(self.request(method, uri, body, Some(self.token())).await).await
    }

    /// Inserts a product directly, `age_minutes` old.
    pub async fn seed_product(
        &self,
        slug: &str,
        status: &str,
        age_minutes: i64,
        metadata: Value,
    ) -> Uuid {
        let created = Utc::now() - Duration::minutes(age_minutes);
        self.store
            .insert_product(product::Model {
                id: Uuid::new_v4(),
                title: slug.replace('-', " "),
                slug: slug.to_string(),
                short_description: Some(format!("All about {}", slug)),
                description: None,
                status: status.to_string(),
                metadata,
                category_id: None,
                created_at: created,
                updated_at: created,
            })
            .await
            .expect("seed product")
            .id
    }

    pub async fn seed_variant(
        &self,
        product_id: Uuid,
        price: Decimal,
        color: Option<&str>,
        material: Option<&str>,
    ) -> Uuid {
        self.store
            .insert_variant(product_variant::Model {
                id: Uuid::new_v4(),
                product_id,
                name: "Default".into(),
                sku_prefix: Some("SF".into()),
                color_code: None,
                color_name: color.map(str::to_string),
                material: material.map(str::to_string),
                price,
                compare_at_price: None,
                image: None,
                created_at: Utc::now(),
            })
            .await
            .expect("seed variant")
            .id
    }

    pub async fn seed_primary_image(&self, product_id: Uuid, url: &str) {
        self.store
            .insert_image(product_image::Model {
                id: Uuid::new_v4(),
                product_id,
                url: url.to_string(),
                alt: None,
                is_primary: true,
                created_at: Utc::now(),
            })
            .await
            .expect("seed image");
    }
}

pub fn mint_token(roles: &[&str], expires_in_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        name: Some("Catalog Admin".to_string()),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        iat: now,
        exp: now + expires_in_secs,
        iss: None,
        jti: Some(Uuid::new_v4().to_string()),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("encode access token")
}

/// Status plus parsed body; empty bodies become `null`.
pub async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        json!({ "raw": String::from_utf8_lossy(&bytes).to_string() })
    });
    (status, value)
}

pub fn slugs(items: &Value) -> Vec<String> {
    items
        .as_array()
        .expect("array of products")
        .iter()
        .map(|item| item["slug"].as_str().unwrap_or_default().to_string())
        .collect()
}
