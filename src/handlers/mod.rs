pub mod categories;
pub mod common;
pub mod images;
pub mod products;
pub mod statuses;
pub mod variants;

use std::sync::Arc;

use crate::errors::ServiceError;
use crate::services::{
    categories::CategoryService, images::ImageService, listing::ListingEngine,
    products::ProductService, statuses::StatusService, variants::VariantService,
};
use crate::store::{CatalogReader, CatalogStore};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub listing: ListingEngine,
    pub products: ProductService,
    pub categories: CategoryService,
    pub variants: VariantService,
    pub images: ImageService,
    pub statuses: StatusService,
    catalog: Arc<dyn CatalogReader>,
}

impl AppServices {
    /// Wire every service over one catalog store. `default_limit` and
    /// `max_limit` bound the public listing page size.
    pub fn new<S>(store: Arc<S>, default_limit: u64, max_limit: u64) -> Self
    where
        S: CatalogStore + 'static,
    {
        let reader: Arc<dyn CatalogReader> = store.clone();
        let writer: Arc<dyn CatalogStore> = store;

        Self {
            listing: ListingEngine::new(reader.clone()).with_page_limits(default_limit, max_limit),
            products: ProductService::new(writer.clone()),
            categories: CategoryService::new(writer.clone()),
            variants: VariantService::new(writer.clone()),
            images: ImageService::new(writer.clone()),
            statuses: StatusService::new(writer),
            catalog: reader,
        }
    }

    /// Round-trips to the backing store
    pub async fn ping(&self) -> Result<(), ServiceError> {
        self.catalog.ping().await
    }
}
