//! Catalog persistence seam.
//!
//! [`CatalogReader`] carries the read-only queries the listing engine is built
//! on; [`CatalogWriter`] carries the primitives used by the admin use cases.
//! Two implementations ship with the crate: [`SeaOrmCatalogStore`] over a
//! relational database and [`InMemoryCatalogStore`] for tests and benches.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{category, inventory, product, product_image, product_variant};
use crate::errors::ServiceError;
use crate::models::{ProductStatus, SortMode};

pub mod memory;
pub mod database;

pub use self::memory::InMemoryCatalogStore;
pub use self::database::SeaOrmCatalogStore;

/// Variant-level predicates. All supplied predicates must hold for the same
/// variant row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantPredicates {
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub color: Option<String>,
    pub material: Option<String>,
}

impl VariantPredicates {
    pub fn is_empty(&self) -> bool {
        self.price_min.is_none()
            && self.price_max.is_none()
            && self.color.is_none()
            && self.material.is_none()
    }

    pub fn matches(&self, variant: &product_variant::Model) -> bool {
        self.price_min.map_or(true, |min| variant.price >= min)
            && self.price_max.map_or(true, |max| variant.price <= max)
            && self
                .color
                .as_deref()
                .map_or(true, |color| variant.color_name.as_deref() == Some(color))
            && self
                .material
                .as_deref()
                .map_or(true, |material| variant.material.as_deref() == Some(material))
    }
}

/// Product-level predicates shared by the count and page queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilters {
    pub status: Option<ProductStatus>,
    pub category_slug: Option<String>,
    /// Case-insensitive substring matched against title, short description and slug
    pub text: Option<String>,
    /// Restricts the result to these ids when present (an empty list matches nothing)
    pub ids: Option<Vec<Uuid>>,
    /// Products must own at least one variant matching every predicate
    pub variants: Option<VariantPredicates>,
    pub exclude_ids: Vec<Uuid>,
    pub exclude_slug: Option<String>,
    /// Value the metadata `category` tag must equal
    pub metadata_category: Option<String>,
}

impl ProductFilters {
    pub fn published() -> Self {
        Self {
            status: Some(ProductStatus::published()),
            ..Default::default()
        }
    }
}

/// Category name and slug denormalized onto list items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategorySummary {
    pub name: String,
    pub slug: String,
}

/// Product columns needed to build a list item.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummaryRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub category: Option<CategorySummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductSalesRow {
    pub product_id: Uuid,
    pub units_sold: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewAggregateRow {
    pub product_id: Uuid,
    pub rating_sum: i64,
    pub review_count: i64,
}

impl ReviewAggregateRow {
    pub fn average_rating(&self) -> f64 {
        if self.review_count == 0 {
            0.0
        } else {
            self.rating_sum as f64 / self.review_count as f64
        }
    }
}

/// Denormalized tag read from a product's metadata document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataTag {
    pub category: Option<String>,
}

/// Raw facet values over variants of published products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetSource {
    pub materials: Vec<String>,
    pub colors: Vec<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
}

/// Read-only catalog queries.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Distinct ids of products owning at least one variant matching every predicate.
    async fn find_product_ids_by_variant_predicates(
        &self,
        predicates: &VariantPredicates,
    ) -> Result<Vec<Uuid>, ServiceError>;

    async fn count_distinct_products(&self, filters: &ProductFilters) -> Result<u64, ServiceError>;

    /// One page of product rows. `limit = None` returns every match.
    async fn query_products_page(
        &self,
        filters: &ProductFilters,
        sort: SortMode,
        limit: Option<u64>,
        offset: u64,
    ) -> Result<Vec<ProductSummaryRow>, ServiceError>;

    async fn fetch_variants_for_products(
        &self,
        product_ids: &[Uuid],
    ) -> Result<Vec<product_variant::Model>, ServiceError>;

    async fn fetch_inventory_for_variants(
        &self,
        variant_ids: &[Uuid],
    ) -> Result<Vec<inventory::Model>, ServiceError>;

    async fn fetch_primary_images_for_products(
        &self,
        product_ids: &[Uuid],
    ) -> Result<Vec<product_image::Model>, ServiceError>;

    /// Units sold per product over orders in a completed state.
    async fn sum_completed_order_quantities_by_product(
        &self,
    ) -> Result<Vec<ProductSalesRow>, ServiceError>;

    async fn aggregate_approved_reviews_by_product(
        &self,
    ) -> Result<Vec<ReviewAggregateRow>, ServiceError>;

    /// `None` when no product has this slug.
    async fn fetch_product_metadata_tag(
        &self,
        slug: &str,
    ) -> Result<Option<MetadataTag>, ServiceError>;

    async fn fetch_published_variant_facets(&self) -> Result<FacetSource, ServiceError>;

    async fn ping(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Write primitives used by the admin use cases.
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    async fn find_product(&self, id: Uuid) -> Result<Option<product::Model>, ServiceError>;
    async fn find_product_by_slug(&self, slug: &str)
        -> Result<Option<product::Model>, ServiceError>;
    /// Newest first, optionally restricted to one status. Returns the page and the total.
    async fn list_products(
        &self,
        status: Option<&ProductStatus>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError>;
    async fn insert_product(&self, model: product::Model) -> Result<product::Model, ServiceError>;
    async fn update_product(&self, model: product::Model) -> Result<product::Model, ServiceError>;
    /// Removes the product with its variants, inventory and images.
    async fn delete_product(&self, id: Uuid) -> Result<bool, ServiceError>;

    async fn find_category(&self, id: Uuid) -> Result<Option<category::Model>, ServiceError>;
    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<category::Model>, ServiceError>;
    async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<category::Model>, ServiceError>;
    async fn list_categories(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<category::Model>, u64), ServiceError>;
    async fn insert_category(&self, model: category::Model)
        -> Result<category::Model, ServiceError>;
    async fn update_category(&self, model: category::Model)
        -> Result<category::Model, ServiceError>;
    /// Removes the category and clears it from its products.
    async fn delete_category(&self, id: Uuid) -> Result<bool, ServiceError>;

    async fn find_variant(&self, id: Uuid) -> Result<Option<product_variant::Model>, ServiceError>;
    async fn insert_variant(
        &self,
        model: product_variant::Model,
    ) -> Result<product_variant::Model, ServiceError>;
    async fn update_variant(
        &self,
        model: product_variant::Model,
    ) -> Result<product_variant::Model, ServiceError>;
    async fn delete_variant(&self, id: Uuid) -> Result<bool, ServiceError>;
    /// Inserts the row, or overwrites the counters of the variant's existing row.
    async fn upsert_inventory(
        &self,
        model: inventory::Model,
    ) -> Result<inventory::Model, ServiceError>;

    async fn list_product_images(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<product_image::Model>, ServiceError>;
    async fn find_image(&self, id: Uuid) -> Result<Option<product_image::Model>, ServiceError>;
    async fn insert_image(
        &self,
        model: product_image::Model,
    ) -> Result<product_image::Model, ServiceError>;
    async fn delete_image(&self, id: Uuid) -> Result<bool, ServiceError>;
    /// Clears the product's current primary image, then flags `image_id`.
    async fn set_primary_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> Result<product_image::Model, ServiceError>;

    async fn list_statuses(&self) -> Result<Vec<String>, ServiceError>;
    /// Returns false when the status already exists.
    async fn insert_status(&self, name: &str) -> Result<bool, ServiceError>;
}

/// Full store surface handed to the application services.
pub trait CatalogStore: CatalogReader + CatalogWriter {}

impl<T> CatalogStore for T where T: CatalogReader + CatalogWriter {}

/// Escapes LIKE wildcards so the term matches literally.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn variant(price: Decimal, color: Option<&str>, material: Option<&str>) -> product_variant::Model {
        product_variant::Model {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            name: "Default".into(),
            sku_prefix: None,
            color_code: None,
            color_name: color.map(str::to_string),
            material: material.map(str::to_string),
            price,
            compare_at_price: None,
            image: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn predicates_apply_to_the_same_variant() {
        let predicates = VariantPredicates {
            price_min: Some(dec!(100)),
            price_max: Some(dec!(200)),
            color: Some("Red".into()),
            material: None,
        };
        assert!(predicates.matches(&variant(dec!(150), Some("Red"), None)));
        assert!(!predicates.matches(&variant(dec!(150), Some("Blue"), None)));
        assert!(!predicates.matches(&variant(dec!(250), Some("Red"), None)));
        assert!(predicates.matches(&variant(dec!(200), Some("Red"), Some("Wool"))));
    }

    #[test]
    fn empty_predicates_are_detected() {
        assert!(VariantPredicates::default().is_empty());
        let predicates = VariantPredicates {
            material: Some("Linen".into()),
            ..Default::default()
        };
        assert!(!predicates.is_empty());
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn average_rating_handles_zero_reviews() {
        let row = ReviewAggregateRow {
            product_id: Uuid::nil(),
            rating_sum: 0,
            review_count: 0,
        };
        assert_eq!(row.average_rating(), 0.0);

        let row = ReviewAggregateRow {
            product_id: Uuid::nil(),
            rating_sum: 9,
            review_count: 2,
        };
        assert_eq!(row.average_rating(), 4.5);
    }
}
