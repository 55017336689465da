//! Listing engine: search, best-selling, featured, related and facet views.
//!
//! Every operation is read-only over the catalog. Independent store queries
//! are issued concurrently and store failures propagate unchanged.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{inventory, product_image, product_variant};
use crate::errors::ServiceError;
use crate::models::SortMode;
use crate::store::{
    CatalogReader, CategorySummary, ProductFilters, ProductSummaryRow, VariantPredicates,
};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const DEFAULT_SHOWCASE_LIMIT: u64 = 8;
pub const RELATED_LIMIT: u64 = 4;
/// Scored ids bound into a single featured lookup.
pub const FEATURED_BATCH_SIZE: usize = 500;

/// Search request after HTTP-level parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub sort: SortMode,
    /// 1-based; 0 is treated as 1
    pub page: u64,
    /// 0 selects the default page size
    pub per_page: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageSummary {
    pub url: String,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InventorySummary {
    pub sku: String,
    pub quantity: i32,
    pub reserved: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantSummary {
    pub id: Uuid,
    pub sku_prefix: Option<String>,
    #[schema(value_type = String, example = "49.90")]
    pub price: Decimal,
    pub inventory: Vec<InventorySummary>,
}

/// Read-optimized projection of a product used by every listing view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListItem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price_min: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub price_max: Option<Decimal>,
    pub primary_image: Option<ImageSummary>,
    pub variants_count: usize,
    pub category: Option<CategorySummary>,
    pub variants: Vec<VariantSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub items: Vec<ProductListItem>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl ListingPage {
    fn new(items: Vec<ProductListItem>, total: u64, page: u64, per_page: u64) -> Self {
        Self {
            items,
            total,
            page,
            per_page,
            total_pages: total.div_ceil(per_page.max(1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterFacets {
    pub materials: Vec<String>,
    pub colors: Vec<String>,
    #[schema(value_type = String, example = "10.00")]
    pub price_min: Decimal,
    #[schema(value_type = String, example = "99.99")]
    pub price_max: Decimal,
}

/// Composite ranking used by the featured view.
pub fn featured_score(average_rating: f64, review_count: i64, units_sold: i64) -> f64 {
    2.0 * average_rating
        + ((review_count.max(0) as f64) + 1.0).ln()
        + ((units_sold.max(0) as f64) + 1.0).ln()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct ListingEngine {
    reader: Arc<dyn CatalogReader>,
    default_limit: u64,
    max_limit: u64,
}

impl std::fmt::Debug for ListingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingEngine")
            .field("default_limit", &self.default_limit)
            .field("max_limit", &self.max_limit)
            .finish()
    }
}

impl ListingEngine {
    pub fn new(reader: Arc<dyn CatalogReader>) -> Self {
        Self {
            reader,
            default_limit: DEFAULT_PAGE_SIZE,
            max_limit: MAX_PAGE_SIZE,
        }
    }

    /// Overrides the search page size bounds. The max never exceeds 100.
    pub fn with_page_limits(mut self, default_limit: u64, max_limit: u64) -> Self {
        self.max_limit = max_limit.clamp(1, MAX_PAGE_SIZE);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }

    fn page_size(&self, requested: u64) -> u64 {
        if requested == 0 {
            self.default_limit
        } else {
            requested.min(self.max_limit)
        }
    }

    fn showcase_limit(requested: Option<u64>) -> u64 {
        match requested {
            None | Some(0) => DEFAULT_SHOWCASE_LIMIT,
            Some(limit) => limit.min(MAX_PAGE_SIZE),
        }
    }

    /// Filtered, sorted and paginated search over published products.
    #[instrument(skip(self))]
    pub async fn search(&self, query: SearchQuery) -> Result<ListingPage, ServiceError> {
        let started = Instant::now();
        counter!("listing_search_total", 1);

        let per_page = self.page_size(query.per_page);
        let page = query.page.max(1);
        let offset = (page - 1).saturating_mul(per_page);

        let predicates = VariantPredicates {
            price_min: query.price_min,
            price_max: query.price_max,
            color: non_blank(query.color),
            material: non_blank(query.material),
        };

        let mut filters = ProductFilters::published();
        filters.category_slug = non_blank(query.category);
        filters.text = non_blank(query.q);

        if !predicates.is_empty() {
            let ids = self
                .reader
                .find_product_ids_by_variant_predicates(&predicates)
                .await?;
            if ids.is_empty() {
                debug!("no variant matched, short-circuiting search");
                return Ok(ListingPage::new(Vec::new(), 0, page, per_page));
            }
            filters.variants = Some(predicates);
        }

        let (total, rows) = futures::try_join!(
            self.reader.count_distinct_products(&filters),
            self.reader
                .query_products_page(&filters, query.sort, Some(per_page), offset),
        )?;
        let items = self.assemble(rows).await?;

        histogram!(
            "listing_search_duration_seconds",
            started.elapsed().as_secs_f64()
        );
        Ok(ListingPage::new(items, total, page, per_page))
    }

    /// Products ranked by units sold in completed orders, padded with the
    /// newest published products.
    #[instrument(skip(self))]
    pub async fn best_selling(&self, limit: Option<u64>) -> Result<Vec<ProductListItem>, ServiceError> {
        let limit = Self::showcase_limit(limit);

        let mut sales = self.reader.sum_completed_order_quantities_by_product().await?;
        sales.sort_by(|a, b| {
            b.units_sold
                .cmp(&a.units_sold)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        let top: Vec<Uuid> = sales
            .into_iter()
            .take(limit as usize)
            .map(|row| row.product_id)
            .collect();

        let mut rows = Vec::with_capacity(limit as usize);
        if !top.is_empty() {
            let filters = ProductFilters {
                ids: Some(top.clone()),
                ..Default::default()
            };
            let found = self
                .reader
                .query_products_page(&filters, SortMode::Newest, None, 0)
                .await?;
            let mut by_id: HashMap<Uuid, ProductSummaryRow> =
                found.into_iter().map(|row| (row.id, row)).collect();
            rows.extend(top.iter().filter_map(|id| by_id.remove(id)));
        }

        let missing = limit.saturating_sub(rows.len() as u64);
        if missing > 0 {
            let filters = ProductFilters {
                exclude_ids: top,
                ..ProductFilters::published()
            };
            let filler = self
                .reader
                .query_products_page(&filters, SortMode::Newest, Some(missing), 0)
                .await?;
            rows.extend(filler);
        }

        self.assemble(rows).await
    }

    /// Published products ranked by rating, review volume and sales.
    #[instrument(skip(self))]
    pub async fn featured(&self, limit: Option<u64>) -> Result<Vec<ProductListItem>, ServiceError> {
        let limit = Self::showcase_limit(limit);

        let (reviews, sales) = futures::try_join!(
            self.reader.aggregate_approved_reviews_by_product(),
            self.reader.sum_completed_order_quantities_by_product(),
        )?;

        let mut stats: HashMap<Uuid, (f64, i64, i64)> = HashMap::new();
        for row in &reviews {
            let entry = stats.entry(row.product_id).or_default();
            entry.0 = row.average_rating();
            entry.1 = row.review_count;
        }
        for row in &sales {
            stats.entry(row.product_id).or_default().2 = row.units_sold;
        }

        let mut candidates: Vec<(Uuid, f64)> = stats
            .into_iter()
            .map(|(id, (avg, count, sold))| (id, featured_score(avg, count, sold)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let scores: HashMap<Uuid, f64> = candidates.iter().copied().collect();
        let by_rank = |a: &ProductSummaryRow, b: &ProductSummaryRow| {
            let score_a = scores.get(&a.id).copied().unwrap_or_default();
            let score_b = scores.get(&b.id).copied().unwrap_or_default();
            score_b
                .total_cmp(&score_a)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        };

        // Walk the candidates best score first. Once `limit` rows are held,
        // stop as soon as the next candidate scores strictly below the cutoff;
        // equal scores must still be fetched to break ties by recency.
        let mut ranked: Vec<ProductSummaryRow> = Vec::new();
        for chunk in candidates.chunks(FEATURED_BATCH_SIZE) {
            if ranked.len() >= limit as usize {
                let cutoff = scores
                    .get(&ranked[limit as usize - 1].id)
                    .copied()
                    .unwrap_or_default();
                if chunk[0].1 < cutoff {
                    break;
                }
            }
            let filters = ProductFilters {
                ids: Some(chunk.iter().map(|(id, _)| *id).collect()),
                ..ProductFilters::published()
            };
            let rows = self
                .reader
                .query_products_page(&filters, SortMode::Newest, None, 0)
                .await?;
            ranked.extend(rows);
            ranked.sort_by(by_rank);
            ranked.truncate(limit as usize);
        }

        // A short ranking already holds every published scored product.
        let missing = limit.saturating_sub(ranked.len() as u64);
        if missing > 0 {
            let filters = ProductFilters {
                exclude_ids: ranked.iter().map(|row| row.id).collect(),
                ..ProductFilters::published()
            };
            let filler = self
                .reader
                .query_products_page(&filters, SortMode::Newest, Some(missing), 0)
                .await?;
            ranked.extend(filler);
        }

        self.assemble(ranked).await
    }

    /// Up to four other published products sharing the source product's
    /// metadata category tag, newest first.
    #[instrument(skip(self))]
    pub async fn related(&self, slug: &str) -> Result<Vec<ProductListItem>, ServiceError> {
        let slug = slug.trim();
        let Some(tag) = self.reader.fetch_product_metadata_tag(slug).await? else {
            return Ok(Vec::new());
        };

        let filters = ProductFilters {
            exclude_slug: Some(slug.to_string()),
            metadata_category: tag.category,
            ..ProductFilters::published()
        };
        let rows = self
            .reader
            .query_products_page(&filters, SortMode::Newest, Some(RELATED_LIMIT), 0)
            .await?;
        self.assemble(rows).await
    }

    /// Distinct materials and colors plus the price range over published variants.
    #[instrument(skip(self))]
    pub async fn filters(&self) -> Result<FilterFacets, ServiceError> {
        let source = self.reader.fetch_published_variant_facets().await?;

        let distinct = |values: Vec<String>| -> Vec<String> {
            values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };

        Ok(FilterFacets {
            materials: distinct(source.materials),
            colors: distinct(source.colors),
            price_min: source.price_min.unwrap_or(Decimal::ZERO),
            price_max: source.price_max.unwrap_or(Decimal::ZERO),
        })
    }

    /// Batch-loads variants, inventory and primary images for `rows` and
    /// builds list items in the same order.
    async fn assemble(&self, rows: Vec<ProductSummaryRow>) -> Result<Vec<ProductListItem>, ServiceError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

        let variants_with_inventory = async {
            let variants = self.reader.fetch_variants_for_products(&ids).await?;
            let variant_ids: Vec<Uuid> = variants.iter().map(|v| v.id).collect();
            let inventory = self.reader.fetch_inventory_for_variants(&variant_ids).await?;
            Ok::<_, ServiceError>((variants, inventory))
        };
        let ((variants, inventory), images) = futures::try_join!(
            variants_with_inventory,
            self.reader.fetch_primary_images_for_products(&ids),
        )?;

        let mut inventory_by_variant: HashMap<Uuid, Vec<inventory::Model>> = HashMap::new();
        for row in inventory {
            inventory_by_variant.entry(row.variant_id).or_default().push(row);
        }

        let mut variants_by_product: HashMap<Uuid, Vec<product_variant::Model>> = HashMap::new();
        for variant in variants {
            variants_by_product
                .entry(variant.product_id)
                .or_default()
                .push(variant);
        }

        let mut image_by_product: HashMap<Uuid, product_image::Model> = HashMap::new();
        for image in images {
            image_by_product.entry(image.product_id).or_insert(image);
        }

        let mut seen = HashSet::with_capacity(rows.len());
        Ok(rows
            .into_iter()
            .filter(|row| seen.insert(row.id))
            .map(|row| {
                let variants = variants_by_product.remove(&row.id).unwrap_or_default();
                let price_min = variants.iter().map(|v| v.price).min();
                let price_max = variants.iter().map(|v| v.price).max();
                let primary_image = image_by_product.remove(&row.id).map(|image| ImageSummary {
                    url: image.url,
                    alt: image.alt,
                });

                let variants: Vec<VariantSummary> = variants
                    .into_iter()
                    .map(|variant| VariantSummary {
                        inventory: inventory_by_variant
                            .remove(&variant.id)
                            .unwrap_or_default()
                            .into_iter()
                            .map(|row| InventorySummary {
                                sku: row.sku,
                                quantity: row.quantity,
                                reserved: row.reserved,
                            })
                            .collect(),
                        id: variant.id,
                        sku_prefix: variant.sku_prefix,
                        price: variant.price,
                    })
                    .collect();

                ProductListItem {
                    id: row.id,
                    title: row.title,
                    slug: row.slug,
                    short_description: row.short_description,
                    price_min,
                    price_max,
                    primary_image,
                    variants_count: variants.len(),
                    category: row.category,
                    variants,
                }
            })
            .collect())
    }
}
