use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::models::ProductStatus;
use crate::store::CatalogStore;

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateStatusInput {
    /// Normalized to upper case
    #[schema(example = "COMING_SOON")]
    pub name: String,
}

/// Product status lookup table
#[derive(Clone)]
pub struct StatusService {
    store: Arc<dyn CatalogStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn list_statuses(&self) -> Result<Vec<String>, ServiceError> {
        let mut statuses = self.store.list_statuses().await?;
        statuses.sort();
        Ok(statuses)
    }

    #[instrument(skip(self))]
    pub async fn create_status(&self, input: CreateStatusInput) -> Result<String, ServiceError> {
        let status = ProductStatus::parse(&input.name)?;
        if !self.store.insert_status(status.as_str()).await? {
            return Err(ServiceError::Conflict(format!(
                "Product status \"{}\" already exists",
                status
            )));
        }
        counter!("catalog_mutations_total", 1, "entity" => "status", "op" => "create");
        info!(status = %status, "Product status created");
        Ok(status.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCatalogStore;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn builtin_statuses_are_seeded() {
        let service = StatusService::new(Arc::new(InMemoryCatalogStore::new()));
        assert_eq!(
            service.list_statuses().await.unwrap(),
            vec!["ARCHIVED", "DRAFT", "PUBLISHED"]
        );
    }

    #[tokio::test]
    async fn create_normalizes_and_rejects_duplicates() {
        let service = StatusService::new(Arc::new(InMemoryCatalogStore::new()));
        let created = service
            .create_status(CreateStatusInput {
                name: " coming_soon ".into(),
            })
            .await
            .unwrap();
        assert_eq!(created, "COMING_SOON");

        let err = service
            .create_status(CreateStatusInput {
                name: "Coming_Soon".into(),
            })
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::Conflict(ref msg) if msg.contains("COMING_SOON"));

        assert_matches!(
            service
                .create_status(CreateStatusInput { name: "  ".into() })
                .await,
            Err(ServiceError::ValidationError(_))
        );
    }
}
