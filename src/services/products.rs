use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::{inventory, product, product_image, product_variant};
use crate::errors::ServiceError;
use crate::models::ProductStatus;
use crate::services::listing::{InventorySummary, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::services::slug::{is_valid_slug, slugify};
use crate::store::{CatalogStore, CategorySummary};

const MIN_TITLE_CHARS: usize = 2;

fn validate_metadata(metadata: &Value) -> Result<(), ValidationError> {
    if metadata.is_object() {
        Ok(())
    } else {
        let mut err = ValidationError::new("metadata");
        err.message = Some("metadata must be a JSON object".into());
        Err(err)
    }
}

/// Input for creating a product
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    #[validate(length(max = 255))]
    pub title: String,
    /// Derived from the title when omitted
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    #[validate(length(max = 1000))]
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    /// Defaults to PUBLISHED
    pub status: Option<String>,
    #[validate(custom = "validate_metadata")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

/// Partial product update
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    #[validate(length(max = 1000))]
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<String>,
    #[validate(custom = "validate_metadata")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageView {
    pub id: Uuid,
    pub url: String,
    pub alt: Option<String>,
    pub is_primary: bool,
}

impl From<product_image::Model> for ProductImageView {
    fn from(image: product_image::Model) -> Self {
        Self {
            id: image.id,
            url: image.url,
            alt: image.alt,
            is_primary: image.is_primary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub sku_prefix: Option<String>,
    pub color_code: Option<String>,
    pub color_name: Option<String>,
    pub material: Option<String>,
    #[schema(value_type = String, example = "49.90")]
    pub price: Decimal,
    #[schema(value_type = Option<String>)]
    pub compare_at_price: Option<Decimal>,
    pub image: Option<String>,
    pub inventory: Vec<InventorySummary>,
}

impl VariantView {
    pub(crate) fn new(variant: product_variant::Model, inventory: Vec<inventory::Model>) -> Self {
        Self {
            id: variant.id,
            product_id: variant.product_id,
            name: variant.name,
            sku_prefix: variant.sku_prefix,
            color_code: variant.color_code,
            color_name: variant.color_name,
            material: variant.material,
            price: variant.price,
            compare_at_price: variant.compare_at_price,
            image: variant.image,
            inventory: inventory
                .into_iter()
                .map(|row| InventorySummary {
                    sku: row.sku,
                    quantity: row.quantity,
                    reserved: row.reserved,
                })
                .collect(),
        }
    }
}

/// Full product representation returned by detail and admin endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub status: String,
    #[schema(value_type = Object)]
    pub metadata: Value,
    pub category: Option<CategorySummary>,
    #[schema(value_type = Option<String>)]
    pub price_min: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub price_max: Option<Decimal>,
    pub primary_image: Option<ProductImageView>,
    pub images: Vec<ProductImageView>,
    pub variants: Vec<VariantView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the admin product list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: String,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product::Model> for ProductRecord {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            status: model.status,
            category_id: model.category_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub items: Vec<ProductRecord>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

/// Admin product management
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn CatalogStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_product(&self, input: CreateProductInput) -> Result<ProductDetail, ServiceError> {
        input.validate()?;

        let title = validate_title(&input.title)?;
        let slug = derive_slug(input.slug.as_deref().filter(|s| !s.trim().is_empty()), &title)?;
        if self.store.find_product_by_slug(&slug).await?.is_some() {
            return Err(product_conflict(&slug));
        }
        if let Some(category_id) = input.category_id {
            self.ensure_category(category_id).await?;
        }
        let status = self.resolve_status(input.status.as_deref()).await?;

        let now = Utc::now();
        let model = product::Model {
            id: Uuid::new_v4(),
            title,
            slug,
            short_description: input.short_description,
            description: input.description,
            status: status.into(),
            metadata: input.metadata.unwrap_or_else(|| json!({})),
            category_id: input.category_id,
            created_at: now,
            updated_at: now,
        };

        let product = self.store.insert_product(model).await?;
        counter!("catalog_mutations_total", 1, "entity" => "product", "op" => "create");
        info!(product_id = %product.id, slug = %product.slug, "Product created");
        self.detail(product).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<ProductDetail, ServiceError> {
        let product = self.find(id).await?;
        self.detail(product).await
    }

    #[instrument(skip(self))]
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<ProductDetail, ServiceError> {
        let product = self
            .store
            .find_product_by_slug(slug.trim())
            .await?
            .ok_or_else(|| slug_not_found(slug))?;
        self.detail(product).await
    }

    /// Storefront lookup: products that are not PUBLISHED do not exist here.
    #[instrument(skip(self))]
    pub async fn get_published_product_by_slug(
        &self,
        slug: &str,
    ) -> Result<ProductDetail, ServiceError> {
        let product = self
            .store
            .find_product_by_slug(slug.trim())
            .await?
            .filter(|p| p.status == ProductStatus::PUBLISHED)
            .ok_or_else(|| slug_not_found(slug))?;
        self.detail(product).await
    }

    /// Applies the supplied fields. A new title re-derives the slug unless a
    /// slug is supplied as well.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductDetail, ServiceError> {
        input.validate()?;
        let mut product = self.find(id).await?;

        let title = input.title.as_deref().map(validate_title).transpose()?;
        let requested_slug = input.slug.as_deref().filter(|s| !s.trim().is_empty());
        let slug = match (requested_slug, title.as_deref()) {
            (Some(slug), _) => Some(derive_slug(Some(slug), &product.title)?),
            (None, Some(title)) => Some(derive_slug(None, title)?),
            (None, None) => None,
        };

        if let Some(slug) = &slug {
            if let Some(other) = self.store.find_product_by_slug(slug).await? {
                if other.id != id {
                    return Err(product_conflict(slug));
                }
            }
        }
        if let Some(category_id) = input.category_id {
            self.ensure_category(category_id).await?;
        }
        if let Some(status) = input.status.as_deref() {
            product.status = self.resolve_status(Some(status)).await?.into();
        }

        if let Some(title) = title {
            product.title = title;
        }
        if let Some(slug) = slug {
            product.slug = slug;
        }
        if let Some(short_description) = input.short_description {
            product.short_description = Some(short_description);
        }
        if let Some(description) = input.description {
            product.description = Some(description);
        }
        if let Some(category_id) = input.category_id {
            product.category_id = Some(category_id);
        }
        if let Some(metadata) = input.metadata {
            product.metadata = metadata;
        }
        product.updated_at = Utc::now();

        let product = self.store.update_product(product).await?;
        counter!("catalog_mutations_total", 1, "entity" => "product", "op" => "update");
        info!(product_id = %product.id, "Product updated");
        self.detail(product).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_product(id).await? {
            return Err(product_not_found(id));
        }
        counter!("catalog_mutations_total", 1, "entity" => "product", "op" => "delete");
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Admin listing across every status, newest first.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        status: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<ProductPage, ServiceError> {
        let status = status.map(ProductStatus::parse).transpose()?;
        let per_page = match per_page {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        let page = page.max(1);

        let (items, total) = self
            .store
            .list_products(status.as_ref(), per_page, (page - 1).saturating_mul(per_page))
            .await?;

        Ok(ProductPage {
            items: items.into_iter().map(ProductRecord::from).collect(),
            total,
            page,
            per_page,
            total_pages: total.div_ceil(per_page),
        })
    }

    async fn find(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        self.store
            .find_product(id)
            .await?
            .ok_or_else(|| product_not_found(id))
    }

    async fn ensure_category(&self, category_id: Uuid) -> Result<(), ServiceError> {
        match self.store.find_category(category_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(format!(
                "Category {} not found",
                category_id
            ))),
        }
    }

    /// Parses the status and registers it in the lookup table when new.
    async fn resolve_status(&self, raw: Option<&str>) -> Result<ProductStatus, ServiceError> {
        let status = match raw {
            Some(raw) => ProductStatus::parse(raw)?,
            None => ProductStatus::published(),
        };
        self.store.insert_status(status.as_str()).await?;
        Ok(status)
    }

    async fn detail(&self, product: product::Model) -> Result<ProductDetail, ServiceError> {
        let ids = [product.id];
        let category_lookup = async {
            match product.category_id {
                Some(id) => self.store.find_category(id).await,
                None => Ok(None),
            }
        };
        let (variants, images, category) = futures::try_join!(
            self.store.fetch_variants_for_products(&ids),
            self.store.list_product_images(product.id),
            category_lookup,
        )?;

        let variant_ids: Vec<Uuid> = variants.iter().map(|v| v.id).collect();
        let mut inventory: HashMap<Uuid, Vec<inventory::Model>> = HashMap::new();
        for row in self.store.fetch_inventory_for_variants(&variant_ids).await? {
            inventory.entry(row.variant_id).or_default().push(row);
        }

        let variants: Vec<VariantView> = variants
            .into_iter()
            .map(|variant| {
                let rows = inventory.remove(&variant.id).unwrap_or_default();
                VariantView::new(variant, rows)
            })
            .collect();

        let images: Vec<ProductImageView> = images.into_iter().map(Into::into).collect();
        let primary_image = images.iter().find(|image| image.is_primary).cloned();

        Ok(ProductDetail {
            id: product.id,
            title: product.title,
            slug: product.slug,
            short_description: product.short_description,
            description: product.description,
            status: product.status,
            metadata: product.metadata,
            category: category.map(|c| CategorySummary {
                name: c.name,
                slug: c.slug,
            }),
            price_min: variants.iter().map(|v| v.price).min(),
            price_max: variants.iter().map(|v| v.price).max(),
            primary_image,
            images,
            variants,
            created_at: product.created_at,
            updated_at: product.updated_at,
        })
    }
}

fn validate_title(raw: &str) -> Result<String, ServiceError> {
    let title = raw.trim();
    if title.chars().count() < MIN_TITLE_CHARS {
        return Err(ServiceError::ProductTitleTooShort(
            "Product title must be at least 2 characters".into(),
        ));
    }
    Ok(title.to_string())
}

/// Normalizes a requested slug, or derives one from the title.
fn derive_slug(requested: Option<&str>, title: &str) -> Result<String, ServiceError> {
    let slug = slugify(requested.unwrap_or(title));
    if is_valid_slug(&slug) {
        Ok(slug)
    } else {
        Err(ServiceError::InvalidProductSlug("Product slug is invalid".into()))
    }
}

fn slug_not_found(slug: &str) -> ServiceError {
    ServiceError::NotFound(format!("Product with slug \"{}\" not found", slug.trim()))
}

fn product_conflict(slug: &str) -> ServiceError {
    ServiceError::Conflict(format!("Product with slug \"{}\" already exists", slug))
}

pub(crate) fn product_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Product {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::category;
    use crate::store::{CatalogReader, CatalogWriter, InMemoryCatalogStore};
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn service() -> (Arc<InMemoryCatalogStore>, ProductService) {
        let store = Arc::new(InMemoryCatalogStore::new());
        (store.clone(), ProductService::new(store))
    }

    fn input(title: &str) -> CreateProductInput {
        CreateProductInput {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_derives_slug_and_defaults() {
        let (_, service) = service();
        let product = service.create_product(input("  Crème Tee ")).await.unwrap();

        assert_eq!(product.title, "Crème Tee");
        assert_eq!(product.slug, "creme-tee");
        assert_eq!(product.status, "PUBLISHED");
        assert_eq!(product.metadata, json!({}));
        assert!(product.variants.is_empty());
        assert_eq!(product.price_min, None);
    }

    #[tokio::test]
    async fn create_rejects_short_titles_and_bad_slugs() {
        let (_, service) = service();
        assert_matches!(
            service.create_product(input(" a ")).await,
            Err(ServiceError::ProductTitleTooShort(_))
        );

        let mut bad_slug = input("Linen Shirt");
        bad_slug.slug = Some("!!!".into());
        assert_matches!(
            service.create_product(bad_slug).await,
            Err(ServiceError::InvalidProductSlug(_))
        );
    }

    #[tokio::test]
    async fn duplicate_slug_conflicts_with_message() {
        let (_, service) = service();
        service.create_product(input("Linen Shirt")).await.unwrap();
        let err = service.create_product(input("Linen  Shirt")).await.unwrap_err();
        assert_matches!(&err, ServiceError::Conflict(_));
        assert_eq!(
            err.to_string(),
            "Product with slug \"linen-shirt\" already exists"
        );
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        let (_, service) = service();
        let mut with_category = input("Linen Shirt");
        with_category.category_id = Some(Uuid::new_v4());
        assert_matches!(
            service.create_product(with_category).await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn custom_statuses_are_registered() {
        let (store, service) = service();
        let mut seasonal = input("Winter Coat");
        seasonal.status = Some("seasonal".into());
        let product = service.create_product(seasonal).await.unwrap();

        assert_eq!(product.status, "SEASONAL");
        assert!(store
            .list_statuses()
            .await
            .unwrap()
            .contains(&"SEASONAL".to_string()));
    }

    #[tokio::test]
    async fn update_title_rederives_slug_and_keeps_other_fields() {
        let (_, service) = service();
        let mut create = input("Linen Shirt");
        create.short_description = Some("Breezy".into());
        let product = service.create_product(create).await.unwrap();

        let updated = service
            .update_product(
                product.id,
                UpdateProductInput {
                    title: Some("Linen Overshirt".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.slug, "linen-overshirt");
        assert_eq!(updated.short_description.as_deref(), Some("Breezy"));

        let updated = service
            .update_product(
                product.id,
                UpdateProductInput {
                    slug: Some("Overshirt".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, "overshirt");
        assert_eq!(updated.title, "Linen Overshirt");
    }

    #[tokio::test]
    async fn update_slug_conflict_ignores_self() {
        let (_, service) = service();
        let first = service.create_product(input("First")).await.unwrap();
        service.create_product(input("Second")).await.unwrap();

        let same = UpdateProductInput {
            slug: Some("first".into()),
            ..Default::default()
        };
        assert!(service.update_product(first.id, same).await.is_ok());

        let taken = UpdateProductInput {
            slug: Some("second".into()),
            ..Default::default()
        };
        assert_matches!(
            service.update_product(first.id, taken).await,
            Err(ServiceError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn detail_includes_category_variants_and_images() {
        let (store, service) = service();
        let category = store
            .insert_category(category::Model {
                id: Uuid::new_v4(),
                name: "Shirts".into(),
                slug: "shirts".into(),
                image: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let mut create = input("Linen Shirt");
        create.category_id = Some(category.id);
        let product = service.create_product(create).await.unwrap();

        store
            .insert_variant(product_variant::Model {
                id: Uuid::new_v4(),
                product_id: product.id,
                name: "S".into(),
                sku_prefix: None,
                color_code: Some("#fff".into()),
                color_name: Some("White".into()),
                material: Some("Linen".into()),
                price: dec!(40),
                compare_at_price: Some(dec!(55)),
                image: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        store
            .insert_image(product_image::Model {
                id: Uuid::new_v4(),
                product_id: product.id,
                url: "https://cdn.example.com/a.jpg".into(),
                alt: None,
                is_primary: true,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let detail = service.get_product_by_slug("linen-shirt").await.unwrap();
        assert_eq!(
            detail.category,
            Some(CategorySummary {
                name: "Shirts".into(),
                slug: "shirts".into()
            })
        );
        assert_eq!(detail.variants.len(), 1);
        assert_eq!(detail.price_max, Some(dec!(40)));
        assert!(detail.primary_image.is_some());
        assert_eq!(detail.images.len(), 1);
    }

    #[tokio::test]
    async fn missing_products_are_not_found() {
        let (_, service) = service();
        assert_matches!(
            service.get_product(Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        );
        assert_matches!(
            service.get_product_by_slug("nope").await,
            Err(ServiceError::NotFound(_))
        );

        let mut draft = input("Hidden Draft");
        draft.status = Some("DRAFT".into());
        service.create_product(draft).await.unwrap();
        assert!(service.get_product_by_slug("hidden-draft").await.is_ok());
        assert_matches!(
            service.get_published_product_by_slug("hidden-draft").await,
            Err(ServiceError::NotFound(_))
        );
        assert_matches!(
            service.delete_product(Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn admin_list_filters_by_status() {
        let (store, service) = service();
        service.create_product(input("Alpha")).await.unwrap();
        let mut draft = input("Beta");
        draft.status = Some("DRAFT".into());
        service.create_product(draft).await.unwrap();

        let all = service.list_products(None, 1, 0).await.unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.per_page, DEFAULT_PAGE_SIZE);

        let drafts = service.list_products(Some("draft"), 1, 10).await.unwrap();
        assert_eq!(drafts.total, 1);
        assert_eq!(drafts.items[0].slug, "beta");

        // Drafts never reach the public count
        let published = store
            .count_distinct_products(&crate::store::ProductFilters::published())
            .await
            .unwrap();
        assert_eq!(published, 1);
    }
}
