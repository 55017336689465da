use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, LikeExpr, NullOrdering, Order, Query, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseBackend,
    DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select, Set, SqlErr, TransactionTrait, Value,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    escape_like, CatalogReader, CatalogWriter, CategorySummary, FacetSource, MetadataTag,
    ProductFilters, ProductSalesRow, ProductSummaryRow, ReviewAggregateRow, VariantPredicates,
};
use crate::entities::order::COMPLETED_STATUSES;
use crate::entities::{
    category, inventory, order, order_item, product, product_image, product_status,
    product_variant, review,
};
use crate::errors::ServiceError;
use crate::models::{ProductStatus, SortMode};

/// Offsets and limits are bound as signed 64-bit integers.
const MAX_BOUND_OFFSET: u64 = i64::MAX as u64;

/// Catalog store backed by a sea-orm connection pool.
#[derive(Debug, Clone)]
pub struct SeaOrmCatalogStore {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, FromQueryResult)]
struct ProductSummaryQueryRow {
    id: Uuid,
    title: String,
    slug: String,
    short_description: Option<String>,
    created_at: DateTime<Utc>,
    category_name: Option<String>,
    category_slug: Option<String>,
}

impl From<ProductSummaryQueryRow> for ProductSummaryRow {
    fn from(row: ProductSummaryQueryRow) -> Self {
        let category = match (row.category_name, row.category_slug) {
            (Some(name), Some(slug)) => Some(CategorySummary { name, slug }),
            _ => None,
        };
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            short_description: row.short_description,
            created_at: row.created_at,
            category,
        }
    }
}

impl SeaOrmCatalogStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Products left-joined to their category with every product-level predicate applied.
    fn filtered_products(&self, filters: &ProductFilters) -> Select<product::Entity> {
        let mut condition = Condition::all();

        if let Some(status) = &filters.status {
            condition = condition.add(product::Column::Status.eq(status.as_str()));
        }
        if let Some(slug) = &filters.category_slug {
            condition = condition.add(category::Column::Slug.eq(slug.as_str()));
        }
        if let Some(text) = &filters.text {
            let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
            condition = condition.add(
                Condition::any()
                    .add(lower_like(product::Column::Title, &pattern))
                    .add(lower_like(product::Column::ShortDescription, &pattern))
                    .add(lower_like(product::Column::Slug, &pattern)),
            );
        }
        if let Some(ids) = &filters.ids {
            condition = condition.add(product::Column::Id.is_in(ids.iter().copied()));
        }
        if let Some(predicates) = &filters.variants {
            let matching = Query::select()
                .column(product_variant::Column::ProductId)
                .from(product_variant::Entity)
                .cond_where(variant_condition(predicates))
                .to_owned();
            condition = condition.add(product::Column::Id.in_subquery(matching));
        }
        if !filters.exclude_ids.is_empty() {
            condition =
                condition.add(product::Column::Id.is_not_in(filters.exclude_ids.iter().copied()));
        }
        if let Some(slug) = &filters.exclude_slug {
            condition = condition.add(product::Column::Slug.ne(slug.as_str()));
        }
        if let Some(tag) = &filters.metadata_category {
            condition = condition.add(self.metadata_category_eq(tag));
        }

        product::Entity::find()
            .join(JoinType::LeftJoin, product::Relation::Category.def())
            .filter(condition)
    }

    fn metadata_category_eq(&self, tag: &str) -> SimpleExpr {
        let sql = match self.db.get_database_backend() {
            DatabaseBackend::Postgres => r#""products"."metadata" ->> 'category' = ?"#,
            DatabaseBackend::MySql => {
                "JSON_UNQUOTE(JSON_EXTRACT(`products`.`metadata`, '$.category')) = ?"
            }
            DatabaseBackend::Sqlite => r#"json_extract("products"."metadata", '$.category') = ?"#,
        };
        Expr::cust_with_values(sql, [tag.to_string()])
    }
}

/// All supplied predicates applied to the same variant row.
fn variant_condition(predicates: &VariantPredicates) -> Condition {
    let mut condition = Condition::all();
    if let Some(min) = predicates.price_min {
        condition = condition.add(product_variant::Column::Price.gte(min));
    }
    if let Some(max) = predicates.price_max {
        condition = condition.add(product_variant::Column::Price.lte(max));
    }
    if let Some(color) = &predicates.color {
        condition = condition.add(product_variant::Column::ColorName.eq(color.as_str()));
    }
    if let Some(material) = &predicates.material {
        condition = condition.add(product_variant::Column::Material.eq(material.as_str()));
    }
    condition
}

fn lower_like(column: product::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((product::Entity, column))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

fn conflict_or(err: DbErr, conflict: impl FnOnce() -> String) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Conflict(conflict()),
        _ => ServiceError::DatabaseError(err),
    }
}

fn product_active(model: product::Model) -> product::ActiveModel {
    product::ActiveModel {
        id: Set(model.id),
        title: Set(model.title),
        slug: Set(model.slug),
        short_description: Set(model.short_description),
        description: Set(model.description),
        status: Set(model.status),
        metadata: Set(model.metadata),
        category_id: Set(model.category_id),
        created_at: Set(model.created_at),
        updated_at: Set(model.updated_at),
    }
}

fn category_active(model: category::Model) -> category::ActiveModel {
    category::ActiveModel {
        id: Set(model.id),
        name: Set(model.name),
        slug: Set(model.slug),
        image: Set(model.image),
        created_at: Set(model.created_at),
    }
}

fn variant_active(model: product_variant::Model) -> product_variant::ActiveModel {
    product_variant::ActiveModel {
        id: Set(model.id),
        product_id: Set(model.product_id),
        name: Set(model.name),
        sku_prefix: Set(model.sku_prefix),
        color_code: Set(model.color_code),
        color_name: Set(model.color_name),
        material: Set(model.material),
        price: Set(model.price),
        compare_at_price: Set(model.compare_at_price),
        image: Set(model.image),
        created_at: Set(model.created_at),
    }
}

#[async_trait]
impl CatalogReader for SeaOrmCatalogStore {
    #[instrument(skip(self))]
    async fn find_product_ids_by_variant_predicates(
        &self,
        predicates: &VariantPredicates,
    ) -> Result<Vec<Uuid>, ServiceError> {
        let ids = product_variant::Entity::find()
            .select_only()
            .column(product_variant::Column::ProductId)
            .distinct()
            .filter(variant_condition(predicates))
            .into_tuple::<Uuid>()
            .all(self.db())
            .await?;
        debug!(matches = ids.len(), "variant predicates resolved");
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn count_distinct_products(&self, filters: &ProductFilters) -> Result<u64, ServiceError> {
        let count = self
            .filtered_products(filters)
            .select_only()
            .column_as(
                SimpleExpr::from(Func::count_distinct(Expr::col((
                    product::Entity,
                    product::Column::Id,
                )))),
                "count",
            )
            .into_tuple::<i64>()
            .one(self.db())
            .await?;
        Ok(count.unwrap_or(0).max(0) as u64)
    }

    #[instrument(skip(self))]
    async fn query_products_page(
        &self,
        filters: &ProductFilters,
        sort: SortMode,
        limit: Option<u64>,
        offset: u64,
    ) -> Result<Vec<ProductSummaryRow>, ServiceError> {
        if offset > MAX_BOUND_OFFSET {
            debug!(offset, "offset beyond any row");
            return Ok(Vec::new());
        }
        let mut select = self
            .filtered_products(filters)
            .select_only()
            .column(product::Column::Id)
            .column(product::Column::Title)
            .column(product::Column::Slug)
            .column(product::Column::ShortDescription)
            .column(product::Column::CreatedAt)
            .column_as(category::Column::Name, "category_name")
            .column_as(category::Column::Slug, "category_slug");

        let price = Expr::col((product_variant::Entity, product_variant::Column::Price));
        select = match sort {
            SortMode::Newest => select,
            SortMode::PriceAsc => select
                .join(JoinType::LeftJoin, product::Relation::Variants.def())
                .group_by(product::Column::Id)
                .group_by(category::Column::Id)
                .order_by_with_nulls(price.min(), Order::Asc, NullOrdering::Last),
            SortMode::PriceDesc => select
                .join(JoinType::LeftJoin, product::Relation::Variants.def())
                .group_by(product::Column::Id)
                .group_by(category::Column::Id)
                .order_by_with_nulls(price.max(), Order::Desc, NullOrdering::Last),
        };

        select = select
            .order_by_desc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id);
        if let Some(limit) = limit {
            select = select.limit(limit);
        }
        if offset > 0 {
            select = select.offset(offset);
        }

        let rows = select
            .into_model::<ProductSummaryQueryRow>()
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(ProductSummaryRow::from).collect())
    }

    async fn fetch_variants_for_products(
        &self,
        product_ids: &[Uuid],
    ) -> Result<Vec<product_variant::Model>, ServiceError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let variants = product_variant::Entity::find()
            .filter(product_variant::Column::ProductId.is_in(product_ids.iter().copied()))
            .order_by_asc(product_variant::Column::CreatedAt)
            .order_by_asc(product_variant::Column::Id)
            .all(self.db())
            .await?;
        Ok(variants)
    }

    async fn fetch_inventory_for_variants(
        &self,
        variant_ids: &[Uuid],
    ) -> Result<Vec<inventory::Model>, ServiceError> {
        if variant_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = inventory::Entity::find()
            .filter(inventory::Column::VariantId.is_in(variant_ids.iter().copied()))
            .order_by_asc(inventory::Column::Sku)
            .all(self.db())
            .await?;
        Ok(rows)
    }

    async fn fetch_primary_images_for_products(
        &self,
        product_ids: &[Uuid],
    ) -> Result<Vec<product_image::Model>, ServiceError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let images = product_image::Entity::find()
            .filter(product_image::Column::ProductId.is_in(product_ids.iter().copied()))
            .filter(product_image::Column::IsPrimary.eq(true))
            .order_by_asc(product_image::Column::CreatedAt)
            .order_by_asc(product_image::Column::Id)
            .all(self.db())
            .await?;
        Ok(images)
    }

    #[instrument(skip(self))]
    async fn sum_completed_order_quantities_by_product(
        &self,
    ) -> Result<Vec<ProductSalesRow>, ServiceError> {
        let rows = order_item::Entity::find()
            .select_only()
            .column(order_item::Column::ProductId)
            .column_as(
                Expr::col((order_item::Entity, order_item::Column::Quantity)).sum(),
                "units_sold",
            )
            .join(JoinType::InnerJoin, order_item::Relation::Order.def())
            .filter(order::Column::Status.is_in(COMPLETED_STATUSES))
            .filter(order_item::Column::ProductId.is_not_null())
            .group_by(order_item::Column::ProductId)
            .into_tuple::<(Uuid, i64)>()
            .all(self.db())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(product_id, units_sold)| ProductSalesRow {
                product_id,
                units_sold,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn aggregate_approved_reviews_by_product(
        &self,
    ) -> Result<Vec<ReviewAggregateRow>, ServiceError> {
        let rows = review::Entity::find()
            .select_only()
            .column(review::Column::ProductId)
            .column_as(
                Expr::col((review::Entity, review::Column::Rating)).sum(),
                "rating_sum",
            )
            .column_as(
                Expr::col((review::Entity, review::Column::Id)).count(),
                "review_count",
            )
            .filter(review::Column::Approved.eq(true))
            .group_by(review::Column::ProductId)
            .into_tuple::<(Uuid, i64, i64)>()
            .all(self.db())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(product_id, rating_sum, review_count)| ReviewAggregateRow {
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
        let product = product::Entity::find()
            .filter(product::Column::Slug.eq(slug))
            .one(self.db())
            .await?;
        Ok(product.map(|p| MetadataTag {
            category: p.metadata_category().map(str::to_string),
        }))
    }

    #[instrument(skip(self))]
    async fn fetch_published_variant_facets(&self) -> Result<FacetSource, ServiceError> {
        let published_variants = || {
            product_variant::Entity::find()
                .join(JoinType::InnerJoin, product_variant::Relation::Product.def())
                .filter(product::Column::Status.eq(ProductStatus::PUBLISHED))
        };

        let materials = published_variants()
            .select_only()
            .column(product_variant::Column::Material)
            .distinct()
            .filter(product_variant::Column::Material.is_not_null())
            .into_tuple::<String>()
            .all(self.db());
        let colors = published_variants()
            .select_only()
            .column(product_variant::Column::ColorName)
            .distinct()
            .filter(product_variant::Column::ColorName.is_not_null())
            .into_tuple::<String>()
            .all(self.db());
        let price = Expr::col((product_variant::Entity, product_variant::Column::Price));
        let range = published_variants()
            .select_only()
            .column_as(price.clone().min(), "price_min")
            .column_as(price.max(), "price_max")
            .into_tuple::<(Option<Decimal>, Option<Decimal>)>()
            .one(self.db());

        let (materials, colors, range) = futures::try_join!(materials, colors, range)?;
        let (price_min, price_max) = range.unwrap_or((None, None));

        Ok(FacetSource {
            materials,
            colors,
            price_min,
            price_max,
        })
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        self.db.ping().await.map_err(ServiceError::DatabaseError)
    }
}

#[async_trait]
impl CatalogWriter for SeaOrmCatalogStore {
    async fn find_product(&self, id: Uuid) -> Result<Option<product::Model>, ServiceError> {
        Ok(product::Entity::find_by_id(id).one(self.db()).await?)
    }

    async fn find_product_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<product::Model>, ServiceError> {
        Ok(product::Entity::find()
            .filter(product::Column::Slug.eq(slug))
            .one(self.db())
            .await?)
    }

    async fn list_products(
        &self,
        status: Option<&ProductStatus>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let mut select = product::Entity::find();
        if let Some(status) = status {
            select = select.filter(product::Column::Status.eq(status.as_str()));
        }
        let select = select
            .order_by_desc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id);

        let total = select.clone().count(self.db()).await?;
        if offset > MAX_BOUND_OFFSET {
            return Ok((Vec::new(), total));
        }
        let items = select.limit(limit).offset(offset).all(self.db()).await?;
        Ok((items, total))
    }

    #[instrument(skip(self, model), fields(slug = %model.slug))]
    async fn insert_product(&self, model: product::Model) -> Result<product::Model, ServiceError> {
        let slug = model.slug.clone();
        product_active(model)
            .insert(self.db())
            .await
            .map_err(|e| conflict_or(e, || format!("Product with slug \"{}\" already exists", slug)))
    }

    #[instrument(skip(self, model), fields(id = %model.id))]
    async fn update_product(&self, model: product::Model) -> Result<product::Model, ServiceError> {
        let slug = model.slug.clone();
        product_active(model)
            .update(self.db())
            .await
            .map_err(|e| conflict_or(e, || format!("Product with slug \"{}\" already exists", slug)))
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: Uuid) -> Result<bool, ServiceError> {
        let txn = self.db.begin().await?;

        let variant_ids = product_variant::Entity::find()
            .select_only()
            .column(product_variant::Column::Id)
            .filter(product_variant::Column::ProductId.eq(id))
            .into_tuple::<Uuid>()
            .all(&txn)
            .await?;
        if !variant_ids.is_empty() {
            inventory::Entity::delete_many()
                .filter(inventory::Column::VariantId.is_in(variant_ids))
                .exec(&txn)
                .await?;
        }
        product_variant::Entity::delete_many()
            .filter(product_variant::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;
        product_image::Entity::delete_many()
            .filter(product_image::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;
        let result = product::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<category::Model>, ServiceError> {
        Ok(category::Entity::find_by_id(id).one(self.db()).await?)
    }

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<category::Model>, ServiceError> {
        Ok(category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(self.db())
            .await?)
    }

    async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<category::Model>, ServiceError> {
        Ok(category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db())
            .await?)
    }

    async fn list_categories(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<category::Model>, u64), ServiceError> {
        let select = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .order_by_asc(category::Column::Id);
        let total = select.clone().count(self.db()).await?;
        if offset > MAX_BOUND_OFFSET {
            return Ok((Vec::new(), total));
        }
        let items = select.limit(limit).offset(offset).all(self.db()).await?;
        Ok((items, total))
    }

    async fn insert_category(
        &self,
        model: category::Model,
    ) -> Result<category::Model, ServiceError> {
        let name = model.name.clone();
        category_active(model)
            .insert(self.db())
            .await
            .map_err(|e| conflict_or(e, || format!("Category \"{}\" already exists", name)))
    }

    async fn update_category(
        &self,
        model: category::Model,
    ) -> Result<category::Model, ServiceError> {
        let name = model.name.clone();
        category_active(model)
            .update(self.db())
            .await
            .map_err(|e| conflict_or(e, || format!("Category \"{}\" already exists", name)))
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: Uuid) -> Result<bool, ServiceError> {
        let txn = self.db.begin().await?;

        product::Entity::update_many()
            .col_expr(product::Column::CategoryId, Expr::value(Value::Uuid(None)))
            .filter(product::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;
        let result = category::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_variant(&self, id: Uuid) -> Result<Option<product_variant::Model>, ServiceError> {
        Ok(product_variant::Entity::find_by_id(id).one(self.db()).await?)
    }

    async fn insert_variant(
        &self,
        model: product_variant::Model,
    ) -> Result<product_variant::Model, ServiceError> {
        Ok(variant_active(model).insert(self.db()).await?)
    }

    async fn update_variant(
        &self,
        model: product_variant::Model,
    ) -> Result<product_variant::Model, ServiceError> {
        Ok(variant_active(model).update(self.db()).await?)
    }

    #[instrument(skip(self))]
    async fn delete_variant(&self, id: Uuid) -> Result<bool, ServiceError> {
        let txn = self.db.begin().await?;
        inventory::Entity::delete_many()
            .filter(inventory::Column::VariantId.eq(id))
            .exec(&txn)
            .await?;
        let result = product_variant::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    #[instrument(skip(self, model), fields(variant_id = %model.variant_id))]
    async fn upsert_inventory(
        &self,
        model: inventory::Model,
    ) -> Result<inventory::Model, ServiceError> {
        let existing = inventory::Entity::find()
            .filter(inventory::Column::VariantId.eq(model.variant_id))
            .order_by_asc(inventory::Column::Sku)
            .one(self.db())
            .await?;

        let sku = model.sku.clone();
        let result = match existing {
            Some(row) => {
                let mut active: inventory::ActiveModel = row.into();
                active.quantity = Set(model.quantity);
                active.reserved = Set(model.reserved);
                if model.location.is_some() {
                    active.location = Set(model.location);
                }
                active.updated_at = Set(model.updated_at);
                active.update(self.db()).await
            }
            None => {
                inventory::ActiveModel {
                    id: Set(model.id),
                    sku: Set(model.sku),
                    variant_id: Set(model.variant_id),
                    quantity: Set(model.quantity),
                    reserved: Set(model.reserved),
                    location: Set(model.location),
                    updated_at: Set(model.updated_at),
                }
                .insert(self.db())
                .await
            }
        };
        result.map_err(|e| conflict_or(e, || format!("Inventory with sku \"{}\" already exists", sku)))
    }

    async fn list_product_images(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<product_image::Model>, ServiceError> {
        Ok(product_image::Entity::find()
            .filter(product_image::Column::ProductId.eq(product_id))
            .order_by_asc(product_image::Column::CreatedAt)
            .order_by_asc(product_image::Column::Id)
            .all(self.db())
            .await?)
    }

    async fn find_image(&self, id: Uuid) -> Result<Option<product_image::Model>, ServiceError> {
        Ok(product_image::Entity::find_by_id(id).one(self.db()).await?)
    }

    async fn insert_image(
        &self,
        model: product_image::Model,
    ) -> Result<product_image::Model, ServiceError> {
        let image = product_image::ActiveModel {
            id: Set(model.id),
            product_id: Set(model.product_id),
            url: Set(model.url),
            alt: Set(model.alt),
            is_primary: Set(model.is_primary),
            created_at: Set(model.created_at),
        };
        Ok(image.insert(self.db()).await?)
    }

    async fn delete_image(&self, id: Uuid) -> Result<bool, ServiceError> {
        let result = product_image::Entity::delete_by_id(id)
            .exec(self.db())
            .await?;
        Ok(result.rows_affected > 0)
    }

    #[instrument(skip(self))]
    async fn set_primary_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> Result<product_image::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let image = product_image::Entity::find_by_id(image_id)
            .filter(product_image::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Image {} not found for product {}",
                    image_id, product_id
                ))
            })?;

        product_image::Entity::update_many()
            .col_expr(product_image::Column::IsPrimary, Expr::value(false))
            .filter(product_image::Column::ProductId.eq(product_id))
            .filter(product_image::Column::IsPrimary.eq(true))
            .exec(&txn)
            .await?;

        let mut active: product_image::ActiveModel = image.into();
        active.is_primary = Set(true);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    async fn list_statuses(&self) -> Result<Vec<String>, ServiceError> {
        let statuses = product_status::Entity::find()
            .order_by_asc(product_status::Column::Name)
            .all(self.db())
            .await?;
        Ok(statuses.into_iter().map(|s| s.name).collect())
    }

    async fn insert_status(&self, name: &str) -> Result<bool, ServiceError> {
        if product_status::Entity::find_by_id(name.to_string())
            .one(self.db())
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let status = product_status::ActiveModel {
            name: Set(name.to_string()),
        };
        match product_status::Entity::insert(status).exec(self.db()).await {
            Ok(_) => Ok(true),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}
