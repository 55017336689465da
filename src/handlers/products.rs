use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::auth::{AuthRouterExt, AuthUser, ADMIN_ROLE};
use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, no_content_response, success_response, AdminListParams, LimitParams,
    ListingParams,
};
use crate::services::listing::{FilterFacets, ListingPage, ProductListItem};
use crate::services::products::{
    CreateProductInput, ProductDetail, ProductPage, UpdateProductInput,
};
use crate::AppState;

/// Storefront product routes, mounted at `/products`
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search_products))
        .route("/search", get(search_products))
        .route("/best-selling", get(best_selling_products))
        .route("/featured", get(featured_products))
        .route("/filters", get(product_filters))
        .route("/related/:slug", get(related_products))
        .route("/by-slug/:slug", get(get_product_by_slug))
}

/// Product management routes, mounted at `/admin/products`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .with_role(ADMIN_ROLE)
}

/// Search published products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ListingParams),
    responses(
        (status = 200, description = "Page of products", body = crate::ApiResponse<ListingPage>),
        (status = 400, description = "Malformed query parameters", body = crate::errors::ErrorResponse)
    ),
    tag = "Listing"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Response, ServiceError> {
    let query = params.into_search_query()?;
    let page = state.services.listing.search(query).await?;
    Ok(success_response(page))
}

/// Top sellers over completed orders, padded with the newest products
#[utoipa::path(
    get,
    path = "/api/v1/products/best-selling",
    params(LimitParams),
    responses(
        (status = 200, description = "Best-selling products", body = crate::ApiResponse<Vec<ProductListItem>>),
        (status = 400, description = "Malformed limit", body = crate::errors::ErrorResponse)
    ),
    tag = "Listing"
)]
pub async fn best_selling_products(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Response, ServiceError> {
    let items = state.services.listing.best_selling(params.parse()?).await?;
    Ok(success_response(items))
}

/// Products ranked by rating, review volume and sales
#[utoipa::path(
    get,
    path = "/api/v1/products/featured",
    params(LimitParams),
    responses(
        (status = 200, description = "Featured products", body = crate::ApiResponse<Vec<ProductListItem>>),
        (status = 400, description = "Malformed limit", body = crate::errors::ErrorResponse)
    ),
    tag = "Listing"
)]
pub async fn featured_products(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Response, ServiceError> {
    let items = state.services.listing.featured(params.parse()?).await?;
    Ok(success_response(items))
}

/// Materials, colors and price bounds available for filtering
#[utoipa::path(
    get,
    path = "/api/v1/products/filters",
    responses(
        (status = 200, description = "Filter facets", body = crate::ApiResponse<FilterFacets>)
    ),
    tag = "Listing"
)]
pub async fn product_filters(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let facets = state.services.listing.filters().await?;
    Ok(success_response(facets))
}

/// Up to four products sharing the metadata category of `slug`
#[utoipa::path(
    get,
    path = "/api/v1/products/related/{slug}",
    params(("slug" = String, Path, description = "Source product slug")),
    responses(
        (status = 200, description = "Related products, empty for unknown slugs", body = crate::ApiResponse<Vec<ProductListItem>>)
    ),
    tag = "Listing"
)]
pub async fn related_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, ServiceError> {
    let items = state.services.listing.related(&slug).await?;
    Ok(success_response(items))
}

/// Published product detail
#[utoipa::path(
    get,
    path = "/api/v1/products/by-slug/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product detail", body = crate::ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Listing"
)]
pub async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, ServiceError> {
    let product = state
        .services
        .products
        .get_published_product_by_slug(&slug)
        .await?;
    Ok(success_response(product))
}

/// List products in every status
#[utoipa::path(
    get,
    path = "/api/v1/admin/products",
    params(AdminListParams),
    responses(
        (status = 200, description = "Page of products", body = crate::ApiResponse<ProductPage>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_products(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AdminListParams>,
) -> Result<Response, ServiceError> {
    let (page, per_page, status) = params.parse()?;
    let products = state
        .services
        .products
        .list_products(status.as_deref(), page, per_page)
        .await?;
    Ok(success_response(products))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/v1/admin/products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created", body = crate::ApiResponse<ProductDetail>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slug already taken", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateProductInput>,
) -> Result<Response, ServiceError> {
    tracing::debug!(user_id = %user.user_id, "creating product");
    let product = state.services.products.create_product(payload).await?;
    Ok(created_response(product))
}

/// Product detail in any status
#[utoipa::path(
    get,
    path = "/api/v1/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product detail", body = crate::ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_product(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let product = state.services.products.get_product(id).await?;
    Ok(success_response(product))
}

/// Partially update a product
#[utoipa::path(
    patch,
    path = "/api/v1/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Product updated", body = crate::ApiResponse<ProductDetail>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slug already taken", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductInput>,
) -> Result<Response, ServiceError> {
    let product = state.services.products.update_product(id, payload).await?;
    Ok(success_response(product))
}

/// Delete a product with its variants, inventory and images
#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.products.delete_product(id).await?;
    Ok(no_content_response())
}
