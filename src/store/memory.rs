use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CatalogReader, CatalogWriter, CategorySummary, FacetSource, MetadataTag, ProductFilters,
    ProductSalesRow, ProductSummaryRow, ReviewAggregateRow, VariantPredicates,
};
use crate::entities::{
    category, inventory, order, order_item, product, product_image, product_variant, review,
};
use crate::errors::ServiceError;
use crate::models::{ProductStatus, SortMode};

#[derive(Debug, Default)]
struct CatalogState {
    statuses: BTreeSet<String>,
    categories: Vec<category::Model>,
    products: Vec<product::Model>,
    variants: Vec<product_variant::Model>,
    inventory: Vec<inventory::Model>,
    images: Vec<product_image::Model>,
    orders: Vec<order::Model>,
    order_items: Vec<order_item::Model>,
    reviews: Vec<review::Model>,
}

impl CatalogState {
    fn category_slug(&self, id: Option<Uuid>) -> Option<&str> {
        let id = id?;
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.slug.as_str())
    }

    fn matches(&self, product: &product::Model, filters: &ProductFilters) -> bool {
        if let Some(status) = &filters.status {
            if product.status != status.as_str() {
                return false;
            }
        }
        if let Some(slug) = &filters.category_slug {
            if self.category_slug(product.category_id) != Some(slug.as_str()) {
                return false;
            }
        }
        if let Some(text) = &filters.text {
            let needle = text.to_lowercase();
            let hit = product.title.to_lowercase().contains(&needle)
                || product.slug.to_lowercase().contains(&needle)
                || product
                    .short_description
                    .as_deref()
                    .map_or(false, |d| d.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(ids) = &filters.ids {
            if !ids.contains(&product.id) {
                return false;
            }
        }
        if let Some(predicates) = &filters.variants {
            let hit = self
                .variants
                .iter()
                .any(|v| v.product_id == product.id && predicates.matches(v));
            if !hit {
                return false;
            }
        }
        if filters.exclude_ids.contains(&product.id) {
            return false;
        }
        if filters.exclude_slug.as_deref() == Some(product.slug.as_str()) {
            return false;
        }
        if let Some(tag) = &filters.metadata_category {
            if product.metadata_category() != Some(tag.as_str()) {
                return false;
            }
        }
        true
    }

    fn price_bound(&self, product_id: Uuid, highest: bool) -> Option<Decimal> {
        let prices = self
            .variants
            .iter()
            .filter(|v| v.product_id == product_id)
            .map(|v| v.price);
        if highest {
            prices.max()
        } else {
            prices.min()
        }
    }

    fn summary(&self, product: &product::Model) -> ProductSummaryRow {
        let category = product.category_id.and_then(|id| {
            self.categories
                .iter()
                .find(|c| c.id == id)
                .map(|c| CategorySummary {
                    name: c.name.clone(),
                    slug: c.slug.clone(),
                })
        });
        ProductSummaryRow {
            id: product.id,
            title: product.title.clone(),
            slug: product.slug.clone(),
            short_description: product.short_description.clone(),
            created_at: product.created_at,
            category,
        }
    }
}

/// Newest first, then id ascending.
fn recency(a: &product::Model, b: &product::Model) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
}

/// `Some` values before `None`, `Some` values ordered by `cmp`.
fn nulls_last(
    a: Option<Decimal>,
    b: Option<Decimal>,
    cmp: impl Fn(&Decimal, &Decimal) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Catalog store held in process memory.
///
/// Honors the same ordering and uniqueness rules as the relational store.
#[derive(Debug, Clone)]
pub struct InMemoryCatalogStore {
    state: Arc<RwLock<CatalogState>>,
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalogStore {
    /// Empty store with the built-in statuses registered.
    pub fn new() -> Self {
        let state = CatalogState {
            statuses: [
                ProductStatus::PUBLISHED,
                ProductStatus::DRAFT,
                ProductStatus::ARCHIVED,
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            ..Default::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Records an order with `(product_id, quantity)` lines.
    pub async fn seed_order(&self, status: &str, lines: &[(Uuid, i32)]) -> Uuid {
        let mut state = self.state.write().await;
        let order_id = Uuid::new_v4();
        state.orders.push(order::Model {
            id: order_id,
            status: status.to_string(),
            created_at: Utc::now(),
        });
        for (product_id, quantity) in lines {
            state.order_items.push(order_item::Model {
                id: Uuid::new_v4(),
                order_id,
                product_id: Some(*product_id),
                variant_id: None,
                quantity: *quantity,
            });
        }
        order_id
    }

    pub async fn seed_review(&self, product_id: Uuid, rating: i32, approved: bool) -> Uuid {
        let mut state = self.state.write().await;
        let id = Uuid::new_v4();
        state.reviews.push(review::Model {
            id,
            product_id,
            rating,
            body: None,
            approved,
            created_at: Utc::now(),
        });
        id
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalogStore {
    async fn find_product_ids_by_variant_predicates(
        &self,
        predicates: &VariantPredicates,
    ) -> Result<Vec<Uuid>, ServiceError> {
        let state = self.state.read().await;
        let mut seen = HashSet::new();
        Ok(state
            .variants
            .iter()
            .filter(|v| predicates.matches(v))
            .map(|v| v.product_id)
            .filter(|id| seen.insert(*id))
            .collect())
    }

    async fn count_distinct_products(&self, filters: &ProductFilters) -> Result<u64, ServiceError> {
        let state = self.state.read().await;
        Ok(state
            .products
            .iter()
            .filter(|p| state.matches(p, filters))
            .count() as u64)
    }

    async fn query_products_page(
        &self,
        filters: &ProductFilters,
        sort: SortMode,
        limit: Option<u64>,
        offset: u64,
    ) -> Result<Vec<ProductSummaryRow>, ServiceError> {
        let state = self.state.read().await;
        let mut matching: Vec<&product::Model> = state
            .products
            .iter()
            .filter(|p| state.matches(p, filters))
            .collect();

        matching.sort_by(|a, b| {
            let by_price = match sort {
                SortMode::Newest => Ordering::Equal,
                SortMode::PriceAsc => nulls_last(
                    state.price_bound(a.id, false),
                    state.price_bound(b.id, false),
                    |x, y| x.cmp(y),
                ),
                SortMode::PriceDesc => nulls_last(
                    state.price_bound(a.id, true),
                    state.price_bound(b.id, true),
                    |x, y| y.cmp(x),
                ),
            };
            by_price.then_with(|| recency(a, b))
        });

        let take = limit.map_or(usize::MAX, |l| l as usize);
        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(take)
            .map(|p| state.summary(p))
            .collect())
    }

    async fn fetch_variants_for_products(
        &self,
        product_ids: &[Uuid],
    ) -> Result<Vec<product_variant::Model>, ServiceError> {
        let state = self.state.read().await;
        let mut variants: Vec<_> = state
            .variants
            .iter()
            .filter(|v| product_ids.contains(&v.product_id))
            .cloned()
            .collect();
        variants.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(variants)
    }

    async fn fetch_inventory_for_variants(
        &self,
        variant_ids: &[Uuid],
    ) -> Result<Vec<inventory::Model>, ServiceError> {
        let state = self.state.read().await;
        let mut rows: Vec<_> = state
            .inventory
            .iter()
            .filter(|i| variant_ids.contains(&i.variant_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.sku.cmp(&b.sku));
        Ok(rows)
    }

    async fn fetch_primary_images_for_products(
        &self,
        product_ids: &[Uuid],
    ) -> Result<Vec<product_image::Model>, ServiceError> {
        let state = self.state.read().await;
        let mut images: Vec<_> = state
            .images
            .iter()
            .filter(|i| i.is_primary && product_ids.contains(&i.product_id))
            .cloned()
            .collect();
        images.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(images)
    }

    async fn sum_completed_order_quantities_by_product(
        &self,
    ) -> Result<Vec<ProductSalesRow>, ServiceError> {
        let state = self.state.read().await;
        let completed: HashSet<Uuid> = state
            .orders
            .iter()
            .filter(|o| o.is_completed())
            .map(|o| o.id)
            .collect();

        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for item in &state.order_items {
            if let Some(product_id) = item.product_id {
                if completed.contains(&item.order_id) {
                    *totals.entry(product_id).or_default() += i64::from(item.quantity);
                }
            }
        }
        Ok(totals
            .into_iter()
            .map(|(product_id, units_sold)| ProductSalesRow {
                product_id,
                units_sold,
            })
            .collect())
    }

    async fn aggregate_approved_reviews_by_product(
        &self,
    ) -> Result<Vec<ReviewAggregateRow>, ServiceError> {
        let state = self.state.read().await;
        let mut totals: HashMap<Uuid, (i64, i64)> = HashMap::new();
        for review in state.reviews.iter().filter(|r| r.approved) {
            let entry = totals.entry(review.product_id).or_default();
            entry.0 += i64::from(review.rating);
            entry.1 += 1;
        }
        Ok(totals
            .into_iter()
            .map(|(product_id, (rating_sum, review_count))| ReviewAggregateRow {
                product_id,
                rating_sum,
                review_count,
            })
            .collect())
    }

    async fn fetch_product_metadata_tag(
        &self,
        slug: &str,
    ) -> Result<Option<MetadataTag>, ServiceError> {
        let state = self.state.read().await;
        Ok(state
            .products
            .iter()
            .find(|p| p.slug == slug)
            .map(|p| MetadataTag {
                category: p.metadata_category().map(str::to_string),
            }))
    }

    async fn fetch_published_variant_facets(&self) -> Result<FacetSource, ServiceError> {
        let state = self.state.read().await;
        let published: HashSet<Uuid> = state
            .products
            .iter()
            .filter(|p| p.status == ProductStatus::PUBLISHED)
            .map(|p| p.id)
            .collect();

        let mut source = FacetSource::default();
        for variant in state
            .variants
            .iter()
            .filter(|v| published.contains(&v.product_id))
        {
            if let Some(material) = &variant.material {
                source.materials.push(material.clone());
            }
            if let Some(color) = &variant.color_name {
                source.colors.push(color.clone());
            }
            source.price_min = Some(source.price_min.map_or(variant.price, |m| m.min(variant.price)));
            source.price_max = Some(source.price_max.map_or(variant.price, |m| m.max(variant.price)));
        }
        Ok(source)
    }
}

#[async_trait]
impl CatalogWriter for InMemoryCatalogStore {
    async fn find_product(&self, id: Uuid) -> Result<Option<product::Model>, ServiceError> {
        let state = self.state.read().await;
        Ok(state.products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_product_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<product::Model>, ServiceError> {
        let state = self.state.read().await;
        Ok(state.products.iter().find(|p| p.slug == slug).cloned())
    }

    async fn list_products(
        &self,
        status: Option<&ProductStatus>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let state = self.state.read().await;
        let mut matching: Vec<&product::Model> = state
            .products
            .iter()
            .filter(|p| status.map_or(true, |s| p.status == s.as_str()))
            .collect();
        matching.sort_by(|a, b| recency(a, b));
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn insert_product(&self, model: product::Model) -> Result<product::Model, ServiceError> {
        let mut state = self.state.write().await;
        if state.products.iter().any(|p| p.slug == model.slug) {
            return Err(ServiceError::Conflict(format!(
                "Product with slug \"{}\" already exists",
                model.slug
            )));
        }
        state.products.push(model.clone());
        Ok(model)
    }

    async fn update_product(&self, model: product::Model) -> Result<product::Model, ServiceError> {
        let mut state = self.state.write().await;
        if state
            .products
            .iter()
            .any(|p| p.slug == model.slug && p.id != model.id)
        {
            return Err(ServiceError::Conflict(format!(
                "Product with slug \"{}\" already exists",
                model.slug
            )));
        }
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.id == model.id)
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", model.id)))?;
        *slot = model.clone();
        Ok(model)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut state = self.state.write().await;
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Ok(false);
        }

        let variant_ids: HashSet<Uuid> = state
            .variants
            .iter()
            .filter(|v| v.product_id == id)
            .map(|v| v.id)
            .collect();
        state.inventory.retain(|i| !variant_ids.contains(&i.variant_id));
        state.variants.retain(|v| v.product_id != id);
        state.images.retain(|i| i.product_id != id);
        state.reviews.retain(|r| r.product_id != id);
        for item in state.order_items.iter_mut() {
            if item.product_id == Some(id) {
                item.product_id = None;
            }
        }
        Ok(true)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<category::Model>, ServiceError> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<category::Model>, ServiceError> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<category::Model>, ServiceError> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.name == name).cloned())
    }

    async fn list_categories(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<category::Model>, u64), ServiceError> {
        let state = self.state.read().await;
        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        let total = categories.len() as u64;
        let items = categories
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn insert_category(
        &self,
        model: category::Model,
    ) -> Result<category::Model, ServiceError> {
        let mut state = self.state.write().await;
        if state
            .categories
            .iter()
            .any(|c| c.name == model.name || c.slug == model.slug)
        {
            return Err(ServiceError::Conflict(format!(
                "Category \"{}\" already exists",
                model.name
            )));
        }
        state.categories.push(model.clone());
        Ok(model)
    }

    async fn update_category(
        &self,
        model: category::Model,
    ) -> Result<category::Model, ServiceError> {
        let mut state = self.state.write().await;
        if state
            .categories
            .iter()
            .any(|c| c.id != model.id && (c.name == model.name || c.slug == model.slug))
        {
            return Err(ServiceError::Conflict(format!(
                "Category \"{}\" already exists",
                model.name
            )));
        }
        let slot = state
            .categories
            .iter_mut()
            .find(|c| c.id == model.id)
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", model.id)))?;
        *slot = model.clone();
        Ok(model)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut state = self.state.write().await;
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        if state.categories.len() == before {
            return Ok(false);
        }
        for product in state.products.iter_mut() {
            if product.category_id == Some(id) {
                product.category_id = None;
            }
        }
        Ok(true)
    }

    async fn find_variant(&self, id: Uuid) -> Result<Option<product_variant::Model>, ServiceError> {
        let state = self.state.read().await;
        Ok(state.variants.iter().find(|v| v.id == id).cloned())
    }

    async fn insert_variant(
        &self,
        model: product_variant::Model,
    ) -> Result<product_variant::Model, ServiceError> {
        let mut state = self.state.write().await;
        state.variants.push(model.clone());
        Ok(model)
    }

    async fn update_variant(
        &self,
        model: product_variant::Model,
    ) -> Result<product_variant::Model, ServiceError> {
        let mut state = self.state.write().await;
        let slot = state
            .variants
            .iter_mut()
            .find(|v| v.id == model.id)
            .ok_or_else(|| ServiceError::NotFound(format!("Variant {} not found", model.id)))?;
        *slot = model.clone();
        Ok(model)
    }

    async fn delete_variant(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut state = self.state.write().await;
        let before = state.variants.len();
        state.variants.retain(|v| v.id != id);
        state.inventory.retain(|i| i.variant_id != id);
        Ok(state.variants.len() != before)
    }

    async fn upsert_inventory(
        &self,
        model: inventory::Model,
    ) -> Result<inventory::Model, ServiceError> {
        let mut state = self.state.write().await;
        let position = state
            .inventory
            .iter()
            .enumerate()
            .filter(|(_, row)| row.variant_id == model.variant_id)
            .min_by(|(_, a), (_, b)| a.sku.cmp(&b.sku))
            .map(|(index, _)| index);

        match position {
            Some(index) => {
                let row = &mut state.inventory[index];
                row.quantity = model.quantity;
                row.reserved = model.reserved;
                if model.location.is_some() {
                    row.location = model.location;
                }
                row.updated_at = model.updated_at;
                Ok(row.clone())
            }
            None => {
                if state.inventory.iter().any(|row| row.sku == model.sku) {
                    return Err(ServiceError::Conflict(format!(
                        "Inventory with sku \"{}\" already exists",
                        model.sku
                    )));
                }
                state.inventory.push(model.clone());
                Ok(model)
            }
        }
    }

    async fn list_product_images(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<product_image::Model>, ServiceError> {
        let state = self.state.read().await;
        let mut images: Vec<_> = state
            .images
            .iter()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect();
        images.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(images)
    }

    async fn find_image(&self, id: Uuid) -> Result<Option<product_image::Model>, ServiceError> {
        let state = self.state.read().await;
        Ok(state.images.iter().find(|i| i.id == id).cloned())
    }

    async fn insert_image(
        &self,
        model: product_image::Model,
    ) -> Result<product_image::Model, ServiceError> {
        let mut state = self.state.write().await;
        state.images.push(model.clone());
        Ok(model)
    }

    async fn delete_image(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut state = self.state.write().await;
        let before = state.images.len();
        state.images.retain(|i| i.id != id);
        Ok(state.images.len() != before)
    }

    async fn set_primary_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> Result<product_image::Model, ServiceError> {
        let mut state = self.state.write().await;
        if !state
            .images
            .iter()
            .any(|i| i.id == image_id && i.product_id == product_id)
        {
            return Err(ServiceError::NotFound(format!(
                "Image {} not found for product {}",
                image_id, product_id
            )));
        }

        let mut updated = None;
        for image in state.images.iter_mut().filter(|i| i.product_id == product_id) {
            image.is_primary = image.id == image_id;
            if image.is_primary {
                updated = Some(image.clone());
            }
        }
        updated.ok_or_else(|| ServiceError::InternalError("primary image vanished".into()))
    }

    async fn list_statuses(&self) -> Result<Vec<String>, ServiceError> {
        let state = self.state.read().await;
        Ok(state.statuses.iter().cloned().collect())
    }

    async fn insert_status(&self, name: &str) -> Result<bool, ServiceError> {
        let mut state = self.state.write().await;
        Ok(state.statuses.insert(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn product(slug: &str, status: &str, age_minutes: i64) -> product::Model {
        let created = Utc::now() - Duration::minutes(age_minutes);
        product::Model {
            id: Uuid::new_v4(),
            title: slug.replace('-', " "),
            slug: slug.to_string(),
            short_description: None,
            description: None,
            status: status.to_string(),
            metadata: json!({}),
            category_id: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn variant(product_id: Uuid, price: Decimal) -> product_variant::Model {
        product_variant::Model {
            id: Uuid::new_v4(),
            product_id,
            name: "Default".into(),
            sku_prefix: None,
            color_code: None,
            color_name: None,
            material: None,
            price,
            compare_at_price: None,
            image: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn price_sort_puts_products_without_variants_last() {
        let store = InMemoryCatalogStore::new();
        let cheap = store.insert_product(product("cheap", "PUBLISHED", 3)).await.unwrap();
        let bare = store.insert_product(product("bare", "PUBLISHED", 1)).await.unwrap();
        let pricey = store.insert_product(product("pricey", "PUBLISHED", 2)).await.unwrap();
        store.insert_variant(variant(cheap.id, dec!(5))).await.unwrap();
        store.insert_variant(variant(cheap.id, dec!(500))).await.unwrap();
        store.insert_variant(variant(pricey.id, dec!(50))).await.unwrap();

        let filters = ProductFilters::published();
        let asc = store
            .query_products_page(&filters, SortMode::PriceAsc, None, 0)
            .await
            .unwrap();
        let slugs: Vec<_> = asc.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, ["cheap", "pricey", "bare"]);

        let desc = store
            .query_products_page(&filters, SortMode::PriceDesc, None, 0)
            .await
            .unwrap();
        let slugs: Vec<_> = desc.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, ["cheap", "pricey", "bare"]);
        assert_eq!(bare.id, desc[2].id);
    }

    #[tokio::test]
    async fn deleting_a_product_cascades() {
        let store = InMemoryCatalogStore::new();
        let p = store.insert_product(product("tee", "PUBLISHED", 0)).await.unwrap();
        let v = store.insert_variant(variant(p.id, dec!(10))).await.unwrap();
        store
            .upsert_inventory(inventory::Model {
                id: Uuid::new_v4(),
                sku: "TEE-1".into(),
                variant_id: v.id,
                quantity: 3,
                reserved: 0,
                location: None,
                updated_at: Utc::now(),
            })
            .await
            .unwrap();

        assert!(store.delete_product(p.id).await.unwrap());
        assert!(store.find_variant(v.id).await.unwrap().is_none());
        assert!(store.fetch_inventory_for_variants(&[v.id]).await.unwrap().is_empty());
        assert!(!store.delete_product(p.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_slugs_conflict() {
        let store = InMemoryCatalogStore::new();
        store.insert_product(product("tee", "PUBLISHED", 0)).await.unwrap();
        let err = store
            .insert_product(product("tee", "DRAFT", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn sales_only_count_completed_orders() {
        let store = InMemoryCatalogStore::new();
        let id = Uuid::new_v4();
        store.seed_order("PAID", &[(id, 2)]).await;
        store.seed_order("COD_COMPLETED", &[(id, 3)]).await;
        store.seed_order("CANCELLED", &[(id, 40)]).await;

        let rows = store.sum_completed_order_quantities_by_product().await.unwrap();
        assert_eq!(
            rows,
            vec![ProductSalesRow {
                product_id: id,
                units_sold: 5
            }]
        );
    }
}
