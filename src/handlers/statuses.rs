use axum::{
    extract::{Json, State},
    response::Response,
    routing::{get, post},
    Router,
};

use crate::auth::{AuthRouterExt, AuthUser, ADMIN_ROLE};
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response};
use crate::services::statuses::CreateStatusInput;
use crate::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/", get(list_statuses))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_status))
        .with_role(ADMIN_ROLE)
}

#[utoipa::path(
    get,
    path = "/api/v1/product-statuses",
    responses(
        (status = 200, description = "Known product statuses", body = crate::ApiResponse<Vec<String>>)
    ),
    tag = "Statuses"
)]
pub async fn list_statuses(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let statuses = state.services.statuses.list_statuses().await?;
    Ok(success_response(statuses))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/product-statuses",
    request_body = CreateStatusInput,
    responses(
        (status = 201, description = "Status created", body = crate::ApiResponse<String>),
        (status = 400, description = "Invalid name", body = crate::errors::ErrorResponse),
        (status = 409, description = "Status already exists", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_status(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateStatusInput>,
) -> Result<Response, ServiceError> {
    let status = state.services.statuses.create_status(payload).await?;
    Ok(created_response(status))
}
