use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::category;
use crate::errors::ServiceError;
use crate::services::slug::{is_valid_slug, slugify};
use crate::store::CatalogStore;

pub const DEFAULT_CATEGORY_LIMIT: u64 = 50;
pub const MAX_CATEGORY_LIMIT: u64 = 100;

const MIN_NAME_CHARS: usize = 2;

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateCategoryInput {
    #[validate(length(max = 120))]
    pub name: String,
    #[validate(length(max = 2048))]
    pub image: Option<String>,
}

/// Partial update. Renaming regenerates the slug; an empty image clears it.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateCategoryInput {
    #[validate(length(max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 2048))]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryView {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            image: model.image,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryPage {
    pub items: Vec<CategoryView>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn CatalogStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<CategoryView, ServiceError> {
        input.validate()?;
        let (name, slug) = name_and_slug(&input.name)?;
        self.ensure_unique(None, &name, &slug).await?;

        let model = category::Model {
            id: Uuid::new_v4(),
            name,
            slug,
            image: clean_image(input.image),
            created_at: Utc::now(),
        };
        let category = self.store.insert_category(model).await?;

        counter!("catalog_mutations_total", 1, "entity" => "category", "op" => "create");
        info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category.into())
    }

    /// Categories ordered by name.
    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<CategoryPage, ServiceError> {
        let limit = match limit {
            None | Some(0) => DEFAULT_CATEGORY_LIMIT,
            Some(n) => n.min(MAX_CATEGORY_LIMIT),
        };
        let offset = offset.unwrap_or(0);
        let (items, total) = self.store.list_categories(limit, offset).await?;

        Ok(CategoryPage {
            items: items.into_iter().map(CategoryView::from).collect(),
            total,
            limit,
            offset,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<CategoryView, ServiceError> {
        self.store
            .find_category_by_slug(slug.trim())
            .await?
            .map(CategoryView::from)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category with slug \"{}\" not found", slug.trim()))
            })
    }

    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<CategoryView, ServiceError> {
        input.validate()?;
        let mut category = self
            .store
            .find_category(id)
            .await?
            .ok_or_else(|| category_not_found(id))?;

        if let Some(raw) = input.name.as_deref() {
            let (name, slug) = name_and_slug(raw)?;
            self.ensure_unique(Some(id), &name, &slug).await?;
            category.name = name;
            category.slug = slug;
        }
        if input.image.is_some() {
            category.image = clean_image(input.image);
        }

        let category = self.store.update_category(category).await?;
        counter!("catalog_mutations_total", 1, "entity" => "category", "op" => "update");
        info!(category_id = %category.id, "Category updated");
        Ok(category.into())
    }

    /// Deleting a category detaches its products; they are kept.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_category(id).await? {
            return Err(category_not_found(id));
        }
        counter!("catalog_mutations_total", 1, "entity" => "category", "op" => "delete");
        info!(category_id = %id, "Category deleted");
        Ok(())
    }

    async fn ensure_unique(
        &self,
        own_id: Option<Uuid>,
        name: &str,
        slug: &str,
    ) -> Result<(), ServiceError> {
        let is_other = |c: &category::Model| Some(c.id) != own_id;

        if self
            .store
            .find_category_by_name(name)
            .await?
            .filter(is_other)
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Category with name \"{}\" already exists",
                name
            )));
        }
        if self
            .store
            .find_category_by_slug(slug)
            .await?
            .filter(is_other)
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Category with slug \"{}\" already exists",
                slug
            )));
        }
        Ok(())
    }
}

fn name_and_slug(raw: &str) -> Result<(String, String), ServiceError> {
    let name = raw.trim();
    if name.chars().count() < MIN_NAME_CHARS {
        return Err(ServiceError::CategoryNameTooShort(
            "Category name must be at least 2 characters".into(),
        ));
    }
    let slug = slugify(name);
    if !is_valid_slug(&slug) {
        return Err(ServiceError::InvalidCategorySlug(
            "Category slug is invalid".into(),
        ));
    }
    Ok((name.to_string(), slug))
}

fn clean_image(image: Option<String>) -> Option<String> {
    image
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

fn category_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Category {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CatalogWriter, InMemoryCatalogStore};
    use assert_matches::assert_matches;

    fn service() -> (Arc<InMemoryCatalogStore>, CategoryService) {
        let store = Arc::new(InMemoryCatalogStore::new());
        (store.clone(), CategoryService::new(store))
    }

    fn named(name: &str) -> CreateCategoryInput {
        CreateCategoryInput {
            name: name.into(),
            image: None,
        }
    }

    #[tokio::test]
    async fn create_derives_slug_from_name() {
        let (_, service) = service();
        let category = service
            .create_category(CreateCategoryInput {
                name: " Outer Wear ".into(),
                image: Some("  ".into()),
            })
            .await
            .unwrap();
        assert_eq!(category.name, "Outer Wear");
        assert_eq!(category.slug, "outer-wear");
        assert_eq!(category.image, None);
    }

    #[tokio::test]
    async fn create_validates_name() {
        let (_, service) = service();
        assert_matches!(
            service.create_category(named("x")).await,
            Err(ServiceError::CategoryNameTooShort(_))
        );
        assert_matches!(
            service.create_category(named("%%%")).await,
            Err(ServiceError::InvalidCategorySlug(_))
        );
    }

    #[tokio::test]
    async fn duplicates_conflict_on_name_then_slug() {
        let (_, service) = service();
        service.create_category(named("Outer Wear")).await.unwrap();

        let err = service.create_category(named("Outer Wear")).await.unwrap_err();
        assert_eq!(err.to_string(), "Category with name \"Outer Wear\" already exists");

        let err = service.create_category(named("outer-wear")).await.unwrap_err();
        assert_eq!(err.to_string(), "Category with slug \"outer-wear\" already exists");
    }

    #[tokio::test]
    async fn rename_regenerates_slug_and_clears_image() {
        let (_, service) = service();
        let created = service
            .create_category(CreateCategoryInput {
                name: "Shirts".into(),
                image: Some("https://cdn.example.com/shirts.jpg".into()),
            })
            .await
            .unwrap();

        let same = service
            .update_category(
                created.id,
                UpdateCategoryInput {
                    name: Some("Shirts".into()),
                    image: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(same.image, created.image);

        let renamed = service
            .update_category(
                created.id,
                UpdateCategoryInput {
                    name: Some("Linen Shirts".into()),
                    image: Some(String::new()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.slug, "linen-shirts");
        assert_eq!(renamed.image, None);
        assert!(service.get_category_by_slug("shirts").await.is_err());
        assert_eq!(
            service.get_category_by_slug("linen-shirts").await.unwrap().id,
            created.id
        );
    }

    #[tokio::test]
    async fn list_applies_default_and_cap() {
        let (_, service) = service();
        for name in ["Bags", "Accessories", "Coats"] {
            service.create_category(named(name)).await.unwrap();
        }

        let page = service.list_categories(None, None).await.unwrap();
        assert_eq!(page.limit, DEFAULT_CATEGORY_LIMIT);
        assert_eq!(page.total, 3);
        assert_eq!(page.items[0].name, "Accessories");

        let page = service.list_categories(Some(500), Some(2)).await.unwrap();
        assert_eq!(page.limit, MAX_CATEGORY_LIMIT);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Coats");
    }

    #[tokio::test]
    async fn delete_detaches_products() {
        let (store, service) = service();
        let category = service.create_category(named("Shirts")).await.unwrap();
        let now = Utc::now();
        let product = store
            .insert_product(crate::entities::product::Model {
                id: Uuid::new_v4(),
                title: "Linen Shirt".into(),
                slug: "linen-shirt".into(),
                short_description: None,
                description: None,
                status: "PUBLISHED".into(),
                metadata: serde_json::json!({}),
                category_id: Some(category.id),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        service.delete_category(category.id).await.unwrap();
        let product = store.find_product(product.id).await.unwrap().unwrap();
        assert_eq!(product.category_id, None);

        assert_matches!(
            service.delete_category(category.id).await,
            Err(ServiceError::NotFound(_))
        );
    }
}
