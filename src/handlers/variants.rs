use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{patch, post},
    Router,
};
use uuid::Uuid;

use crate::auth::{AuthRouterExt, AuthUser, ADMIN_ROLE};
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, no_content_response, success_response};
use crate::services::products::VariantView;
use crate::services::variants::{
    CreateVariantInput, InventoryView, UpdateInventoryInput, UpdateVariantInput,
};
use crate::AppState;

/// Mounted at `/admin/variants`. `POST /:id` takes a product id, the other
/// routes take a variant id.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:id",
            post(add_variant).patch(update_variant).delete(delete_variant),
        )
        .route("/:id/inventory", patch(update_inventory))
        .with_role(ADMIN_ROLE)
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/variants/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = CreateVariantInput,
    responses(
        (status = 201, description = "Variant added", body = crate::ApiResponse<VariantView>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn add_variant(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<CreateVariantInput>,
) -> Result<Response, ServiceError> {
    let variant = state
        .services
        .variants
        .add_variant(product_id, payload)
        .await?;
    Ok(created_response(variant))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/variants/{id}",
    params(("id" = Uuid, Path, description = "Variant ID")),
    request_body = UpdateVariantInput,
    responses(
        (status = 200, description = "Variant updated", body = crate::ApiResponse<VariantView>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_variant(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(variant_id): Path<Uuid>,
    Json(payload): Json<UpdateVariantInput>,
) -> Result<Response, ServiceError> {
    let variant = state
        .services
        .variants
        .update_variant(variant_id, payload)
        .await?;
    Ok(success_response(variant))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/variants/{id}",
    params(("id" = Uuid, Path, description = "Variant ID")),
    responses(
        (status = 204, description = "Variant deleted"),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_variant(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(variant_id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.variants.delete_variant(variant_id).await?;
    Ok(no_content_response())
}

/// Overwrite stock counters for a variant
#[utoipa::path(
    patch,
    path = "/api/v1/admin/variants/{id}/inventory",
    params(("id" = Uuid, Path, description = "Variant ID")),
    request_body = UpdateInventoryInput,
    responses(
        (status = 200, description = "Inventory updated", body = crate::ApiResponse<InventoryView>),
        (status = 400, description = "Invalid counters", body = crate::errors::ErrorResponse),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_inventory(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(variant_id): Path<Uuid>,
    Json(payload): Json<UpdateInventoryInput>,
) -> Result<Response, ServiceError> {
    let inventory = state
        .services
        .variants
        .update_inventory(variant_id, payload)
        .await?;
    Ok(success_response(inventory))
}
