use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::product_image;
use crate::errors::ServiceError;
use crate::services::products::{product_not_found, ProductImageView};
use crate::store::CatalogStore;

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddImageInput {
    #[validate(length(min = 1, max = 2048))]
    pub url: String,
    #[validate(length(max = 255))]
    pub alt: Option<String>,
    /// The first image of a product becomes primary regardless
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Clone)]
pub struct ImageService {
    store: Arc<dyn CatalogStore>,
}

impl ImageService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn list_images(&self, product_id: Uuid) -> Result<Vec<ProductImageView>, ServiceError> {
        self.ensure_product(product_id).await?;
        let images = self.store.list_product_images(product_id).await?;
        Ok(images.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, input))]
    pub async fn add_image(
        &self,
        product_id: Uuid,
        input: AddImageInput,
    ) -> Result<ProductImageView, ServiceError> {
        input.validate()?;
        let url = input.url.trim();
        if url.is_empty() {
            return Err(ServiceError::ValidationError("url must not be blank".into()));
        }
        self.ensure_product(product_id).await?;

        let make_primary =
            input.is_primary || self.store.list_product_images(product_id).await?.is_empty();

        let image = self
            .store
            .insert_image(product_image::Model {
                id: Uuid::new_v4(),
                product_id,
                url: url.to_string(),
                alt: input
                    .alt
                    .map(|alt| alt.trim().to_string())
                    .filter(|alt| !alt.is_empty()),
                is_primary: false,
                created_at: Utc::now(),
            })
            .await?;

        let image = if make_primary {
            self.store.set_primary_image(product_id, image.id).await?
        } else {
            image
        };

        counter!("catalog_mutations_total", 1, "entity" => "image", "op" => "create");
        info!(image_id = %image.id, product_id = %product_id, primary = image.is_primary, "Image added");
        Ok(image.into())
    }

    /// Flags `image_id` as the product's only primary image.
    #[instrument(skip(self))]
    pub async fn set_primary(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> Result<ProductImageView, ServiceError> {
        let image = self.store.set_primary_image(product_id, image_id).await?;
        counter!("catalog_mutations_total", 1, "entity" => "image", "op" => "set_primary");
        info!(image_id = %image_id, product_id = %product_id, "Primary image changed");
        Ok(image.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_image(&self, product_id: Uuid, image_id: Uuid) -> Result<(), ServiceError> {
        let owned = self
            .store
            .find_image(image_id)
            .await?
            .filter(|image| image.product_id == product_id);
        if owned.is_none() || !self.store.delete_image(image_id).await? {
            return Err(ServiceError::NotFound(format!(
                "Image {} not found for product {}",
                image_id, product_id
            )));
        }
        counter!("catalog_mutations_total", 1, "entity" => "image", "op" => "delete");
        info!(image_id = %image_id, product_id = %product_id, "Image deleted");
        Ok(())
    }

    async fn ensure_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        match self.store.find_product(product_id).await? {
            Some(_) => Ok(()),
            None => Err(product_not_found(product_id)),
        }
    }
}
