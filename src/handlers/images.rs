use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{delete, get, patch},
    Router,
};
use uuid::Uuid;

use crate::auth::{AuthRouterExt, AuthUser, ADMIN_ROLE};
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, no_content_response, success_response};
use crate::services::images::AddImageInput;
use crate::services::products::ProductImageView;
use crate::AppState;

/// Mounted at `/admin/images`; `:id` is always the owning product.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/:id", get(list_images).post(add_image))
        .route("/:id/:image_id", delete(delete_image))
        .route("/:id/:image_id/primary", patch(set_primary_image))
        .with_role(ADMIN_ROLE)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/images/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product images", body = crate::ApiResponse<Vec<ProductImageView>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_images(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let images = state.services.images.list_images(product_id).await?;
    Ok(success_response(images))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/images/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = AddImageInput,
    responses(
        (status = 201, description = "Image added", body = crate::ApiResponse<ProductImageView>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn add_image(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<AddImageInput>,
) -> Result<Response, ServiceError> {
    let image = state.services.images.add_image(product_id, payload).await?;
    Ok(created_response(image))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/images/{id}/{image_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 404, description = "Image not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_image(
    _user: AuthUser,
    State(state): State<AppState>,
    Path((product_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ServiceError> {
    state
        .services
        .images
        .delete_image(product_id, image_id)
        .await?;
    Ok(no_content_response())
}

/// Make an image the product's primary image
#[utoipa::path(
    patch,
    path = "/api/v1/admin/images/{id}/{image_id}/primary",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Primary image set", body = crate::ApiResponse<ProductImageView>),
        (status = 404, description = "Image not found for product", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_primary_image(
    _user: AuthUser,
    State(state): State<AppState>,
    Path((product_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ServiceError> {
    let image = state
        .services
        .images
        .set_primary(product_id, image_id)
        .await?;
    Ok(success_response(image))
}
