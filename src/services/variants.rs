use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::{inventory, product_variant};
use crate::errors::ServiceError;
use crate::services::products::{product_not_found, VariantView};
use crate::store::CatalogStore;

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariantInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 64))]
    pub sku_prefix: Option<String>,
    #[validate(length(max = 32))]
    pub color_code: Option<String>,
    #[validate(length(max = 64))]
    pub color_name: Option<String>,
    #[validate(length(max = 64))]
    pub material: Option<String>,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = String, example = "49.90")]
    pub price: Decimal,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = Option<String>)]
    pub compare_at_price: Option<Decimal>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVariantInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 32))]
    pub color_code: Option<String>,
    #[validate(length(max = 64))]
    pub color_name: Option<String>,
    #[validate(length(max = 64))]
    pub material: Option<String>,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = Option<String>)]
    pub compare_at_price: Option<Decimal>,
    pub image: Option<String>,
}

/// Stock counters for a variant. `reserved` keeps its current value when omitted.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateInventoryInput {
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(range(min = 0))]
    pub reserved: Option<i32>,
    #[validate(length(max = 120))]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    pub sku: String,
    pub variant_id: Uuid,
    pub quantity: i32,
    pub reserved: i32,
    pub available: i32,
    pub location: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<inventory::Model> for InventoryView {
    fn from(row: inventory::Model) -> Self {
        Self {
            available: row.available(),
            sku: row.sku,
            variant_id: row.variant_id,
            quantity: row.quantity,
            reserved: row.reserved,
            location: row.location,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct VariantService {
    store: Arc<dyn CatalogStore>,
}

impl VariantService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, input))]
    pub async fn add_variant(
        &self,
        product_id: Uuid,
        input: CreateVariantInput,
    ) -> Result<VariantView, ServiceError> {
        input.validate()?;
        if self.store.find_product(product_id).await?.is_none() {
            return Err(product_not_found(product_id));
        }

        let model = product_variant::Model {
            id: Uuid::new_v4(),
            product_id,
            name: input.name.trim().to_string(),
            sku_prefix: non_blank(input.sku_prefix),
            color_code: non_blank(input.color_code),
            color_name: non_blank(input.color_name),
            material: non_blank(input.material),
            price: input.price,
            compare_at_price: input.compare_at_price,
            image: non_blank(input.image),
            created_at: Utc::now(),
        };
        let variant = self.store.insert_variant(model).await?;

        counter!("catalog_mutations_total", 1, "entity" => "variant", "op" => "create");
        info!(variant_id = %variant.id, product_id = %product_id, price = %variant.price, "Variant added");
        Ok(VariantView::new(variant, Vec::new()))
    }

    #[instrument(skip(self, input))]
    pub async fn update_variant(
        &self,
        id: Uuid,
        input: UpdateVariantInput,
    ) -> Result<VariantView, ServiceError> {
        input.validate()?;
        let mut variant = self.find(id).await?;

        if let Some(name) = input.name {
            variant.name = name.trim().to_string();
        }
        if let Some(price) = input.price {
            variant.price = price;
        }
        if input.compare_at_price.is_some() {
            variant.compare_at_price = input.compare_at_price;
        }
        if input.color_code.is_some() {
            variant.color_code = non_blank(input.color_code);
        }
        if input.color_name.is_some() {
            variant.color_name = non_blank(input.color_name);
        }
        if input.material.is_some() {
            variant.material = non_blank(input.material);
        }
        if input.image.is_some() {
            variant.image = non_blank(input.image);
        }

        let variant = self.store.update_variant(variant).await?;
        let inventory = self.store.fetch_inventory_for_variants(&[variant.id]).await?;

        counter!("catalog_mutations_total", 1, "entity" => "variant", "op" => "update");
        info!(variant_id = %variant.id, "Variant updated");
        Ok(VariantView::new(variant, inventory))
    }

    #[instrument(skip(self))]
    pub async fn delete_variant(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_variant(id).await? {
            return Err(variant_not_found(id));
        }
        counter!("catalog_mutations_total", 1, "entity" => "variant", "op" => "delete");
        info!(variant_id = %id, "Variant deleted");
        Ok(())
    }

    /// Overwrites the variant's stock counters, creating the row on first use.
    #[instrument(skip(self, input))]
    pub async fn update_inventory(
        &self,
        variant_id: Uuid,
        input: UpdateInventoryInput,
    ) -> Result<InventoryView, ServiceError> {
        input.validate()?;
        let variant = self.find(variant_id).await?;
        let existing = self
            .store
            .fetch_inventory_for_variants(&[variant_id])
            .await?
            .into_iter()
            .next();

        let reserved = input
            .reserved
            .or_else(|| existing.as_ref().map(|row| row.reserved))
            .unwrap_or(0);
        if reserved > input.quantity {
            return Err(ServiceError::ValidationError(format!(
                "reserved ({}) cannot exceed quantity ({})",
                reserved, input.quantity
            )));
        }

        let row = inventory::Model {
            id: existing.as_ref().map_or_else(Uuid::new_v4, |row| row.id),
            sku: existing
                .as_ref()
                .map_or_else(|| default_sku(&variant), |row| row.sku.clone()),
            variant_id,
            quantity: input.quantity,
            reserved,
            location: non_blank(input.location),
            updated_at: Utc::now(),
        };
        let row = self.store.upsert_inventory(row).await?;

        if row.available() == 0 {
            warn!(variant_id = %variant_id, sku = %row.sku, "Variant is out of stock");
        }
        counter!("catalog_mutations_total", 1, "entity" => "inventory", "op" => "update");
        info!(variant_id = %variant_id, quantity = row.quantity, reserved = row.reserved, "Inventory updated");
        Ok(row.into())
    }

    async fn find(&self, id: Uuid) -> Result<product_variant::Model, ServiceError> {
        self.store
            .find_variant(id)
            .await?
            .ok_or_else(|| variant_not_found(id))
    }
}

/// `<prefix>-<first 8 hex digits of the variant id>`, or the bare id without a prefix.
fn default_sku(variant: &product_variant::Model) -> String {
    let id = variant.id.simple().to_string();
    match variant.sku_prefix.as_deref() {
        Some(prefix) => format!("{}-{}", prefix, &id[..8]).to_ascii_uppercase(),
        None => id.to_ascii_uppercase(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn variant_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Variant {} not found", id))
}
