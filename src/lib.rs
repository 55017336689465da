//! Storefront API Library
//!
//! Product listing engine (search, facets, best-selling, featured and
//! related views) and the catalog administration behind it.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod models;
pub mod openapi;
pub mod services;
pub mod store;
pub mod tracing;

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::HeaderValue, response::Json, routing::get, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use utoipa::ToSchema;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::handlers::AppServices;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: AppServices,
    pub auth: Arc<AuthService>,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    pub(crate) fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn metadata_serializes_in_camel_case() {
        let meta = ResponseMeta {
            request_id: Some("rid".into()),
            timestamp: "2024-01-01T00:00:00Z".into(),
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["requestId"], "rid");
        assert!(value.get("request_id").is_none());
    }

    #[test]
    fn success_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], json!([1, 2]));
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Every versioned route, to be nested under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    let admin = Router::new()
        .nest("/products", handlers::products::admin_routes())
        .nest("/categories", handlers::categories::admin_routes())
        .nest("/variants", handlers::variants::admin_routes())
        .nest("/images", handlers::images::admin_routes())
        .nest("/product-statuses", handlers::statuses::admin_routes());

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Storefront
        .nest("/products", handlers::products::public_routes())
        .nest("/categories", handlers::categories::public_routes())
        .nest("/product-statuses", handlers::statuses::public_routes())
        // Catalog administration (bearer token with the admin role)
        .nest("/admin", admin)
}

/// Build the CORS layer from config. Explicit origins win; otherwise
/// development or `cors_allow_any_origin` falls back to permissive.
pub fn cors_layer(cfg: &AppConfig) -> Result<CorsLayer, anyhow::Error> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any))
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Ok(CorsLayer::permissive())
    } else {
        Err(anyhow::anyhow!(
            "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
        ))
    }
}

/// Full application router: versioned API, Swagger UI and the shared
/// middleware stack.
pub fn build_router(state: AppState) -> Result<Router, anyhow::Error> {
    let cors = cors_layer(&state.config)?;
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let auth_service = state.auth.clone();

    Ok(Router::<AppState>::new()
        .route("/", get(|| async { "storefront-api up" }))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(tracing::configure_http_tracing())
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        // Inject AuthService into request extensions for auth middleware
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            auth::inject_auth_service,
        ))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state))
}

#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses((status = 200, description = "Build information", body = ApiResponse<Value>)),
    tag = "Health"
)]
pub async fn api_status(State(state): State<AppState>) -> ApiResult<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let git = option_env!("GIT_HASH").unwrap_or("unknown");
    let build_time = option_env!("BUILD_TIME").unwrap_or("unknown");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "git": git,
        "build_time": build_time,
        "service": "storefront-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    });

    Ok(Json(ApiResponse::success(status_data)))
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Dependency health", body = ApiResponse<Value>)),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match state.services.ping().await {
        Ok(()) => "healthy",
        Err(err) => {
            ::tracing::warn!(error = %err, "catalog store ping failed");
            "unhealthy"
        }
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

pub mod prelude {
    pub use crate::errors::*;
    pub use crate::handlers::AppServices;
    pub use crate::services::listing::*;
    pub use crate::store::*;
    pub use crate::{ApiResponse, AppState};
}
