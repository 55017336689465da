use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "1.0.0",
        description = r#"
# Storefront Catalog API

Product listing for the storefront and the catalog administration behind it.

## Listing

- **Search**: text, category, price range, color and material filters with
  `price_asc`, `price_desc` and `newest` ordering
- **Best-selling**: top sellers over completed orders, padded with the newest products
- **Featured**: products ranked by rating, review volume and sales
- **Related**: products sharing a metadata category
- **Filters**: materials, colors and price bounds of published products

Only `PUBLISHED` products appear in storefront views.

## Authentication

Routes under `/admin` require a JWT carrying the `admin` role:

```
Authorization: Bearer <your-jwt-token>
```

## Error Handling

Failures use one envelope:

```json
{
  "success": false,
  "error": { "code": "VALIDATION_ERROR", "message": "page must be at least 1" },
  "meta": { "requestId": "req-abc123", "timestamp": "2025-01-01T00:00:00Z" }
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Listing", description = "Storefront product views"),
        (name = "Categories", description = "Category browsing"),
        (name = "Statuses", description = "Product status vocabulary"),
        (name = "Admin", description = "Catalog administration"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Listing
        crate::handlers::products::search_products,
        crate::handlers::products::best_selling_products,
        crate::handlers::products::featured_products,
        crate::handlers::products::product_filters,
        crate::handlers::products::related_products,
        crate::handlers::products::get_product_by_slug,

        // Categories
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,

        // Statuses
        crate::handlers::statuses::list_statuses,

        // Admin
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::variants::add_variant,
        crate::handlers::variants::update_variant,
        crate::handlers::variants::delete_variant,
        crate::handlers::variants::update_inventory,
        crate::handlers::images::list_images,
        crate::handlers::images::add_image,
        crate::handlers::images::delete_image,
        crate::handlers::images::set_primary_image,
        crate::handlers::statuses::create_status,

        // Health
        crate::api_status,
        crate::health_check,
    ),
    components(
        schemas(
            crate::ResponseMeta,
            crate::services::listing::ListingPage,
            crate::services::listing::ProductListItem,
            crate::services::listing::FilterFacets,
            crate::services::products::ProductDetail,
            crate::services::products::ProductPage,
            crate::services::categories::CategoryView,
            crate::services::categories::CategoryPage,
            crate::services::variants::InventoryView,

            // Error types
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

/// Registers the `bearer_auth` scheme referenced by admin routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Storefront API"));
        assert!(json.contains("/api/v1/products/best-selling"));
        assert!(json.contains("/api/v1/admin/products/{id}"));
        assert!(json.contains("bearer_auth"));
    }
}
