use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use uuid::Uuid;

use crate::auth::{AuthRouterExt, AuthUser, ADMIN_ROLE};
use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, no_content_response, success_response, OffsetParams,
};
use crate::services::categories::{
    CategoryPage, CategoryView, CreateCategoryInput, UpdateCategoryInput,
};
use crate::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/:slug", get(get_category))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_category))
        .route("/:id", patch(update_category).delete(delete_category))
        .with_role(ADMIN_ROLE)
}

/// List categories ordered by name
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(OffsetParams),
    responses(
        (status = 200, description = "Categories", body = crate::ApiResponse<CategoryPage>),
        (status = 400, description = "Malformed pagination", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<OffsetParams>,
) -> Result<Response, ServiceError> {
    let (limit, offset) = params.parse()?;
    let page = state
        .services
        .categories
        .list_categories(limit, offset)
        .await?;
    Ok(success_response(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category", body = crate::ApiResponse<CategoryView>),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, ServiceError> {
    let category = state.services.categories.get_category_by_slug(&slug).await?;
    Ok(success_response(category))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/categories",
    request_body = CreateCategoryInput,
    responses(
        (status = 201, description = "Category created", body = crate::ApiResponse<CategoryView>),
        (status = 400, description = "Invalid name", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name or slug already taken", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryInput>,
) -> Result<Response, ServiceError> {
    let category = state.services.categories.create_category(payload).await?;
    Ok(created_response(category))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryInput,
    responses(
        (status = 200, description = "Category updated", body = crate::ApiResponse<CategoryView>),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name or slug already taken", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_category(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryInput>,
) -> Result<Response, ServiceError> {
    let category = state
        .services
        .categories
        .update_category(id, payload)
        .await?;
    Ok(success_response(category))
}

/// Delete a category; its products are kept without a category
#[utoipa::path(
    delete,
    path = "/api/v1/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_category(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.categories.delete_category(id).await?;
    Ok(no_content_response())
}
