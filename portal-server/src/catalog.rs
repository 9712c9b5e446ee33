//! Product Catalog Service
//!
//! CRUD over `products`, gateway only. There is no fallback tier: every
//! failure reaches the caller. Loading the full list races a fixed deadline.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::error::ErrorCode;
use shared::models::{Product, ProductInput};

use crate::core::{PortalError, PortalResult};
use crate::gateway::{Gateway, GatewayError, Query, Table, from_row, from_rows, to_row};

/// `products` row as stored
#[derive(Debug, Clone, Deserialize)]
struct ProductRow {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    usage_instructions: String,
    #[serde(default)]
    external_link: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            usage_instructions: row.usage_instructions,
            external_link: row.external_link,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insert / update payload. Timestamps on insert come from the store.
#[derive(Debug, Serialize)]
struct ProductWrite<'a> {
    name: &'a str,
    description: &'a str,
    usage_instructions: &'a str,
    external_link: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl<'a> ProductWrite<'a> {
    fn new(input: &'a ProductInput, updated_at: Option<DateTime<Utc>>) -> Self {
        Self {
            name: &input.name,
            description: &input.description,
            usage_instructions: &input.usage_instructions,
            external_link: &input.external_link,
            updated_at,
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    gateway: Arc<dyn Gateway>,
    load_timeout: Duration,
}

impl CatalogService {
    pub fn new(gateway: Arc<dyn Gateway>, load_timeout: Duration) -> Self {
        Self {
            gateway,
            load_timeout,
        }
    }

    /// Products newest first, optionally narrowed to a case-insensitive
    /// substring of name or description
    pub async fn list(&self, search: Option<&str>) -> PortalResult<Vec<Product>> {
        let mut query = Query::new();
        if let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.any_ilike(&["name", "description"], needle);
        }
        let query = query.order_by("created_at", true);
        let rows = tokio::time::timeout(
            self.load_timeout,
            self.gateway.select(Table::Products, &query),
        )
        .await
        .map_err(|_| GatewayError::Timeout(self.load_timeout))??;
        let rows: Vec<ProductRow> = from_rows(rows)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// `None` when no product has this id
    pub async fn get_by_id(&self, id: &str) -> PortalResult<Option<Product>> {
        match self
            .gateway
            .fetch_one(Table::Products, &Query::by_id(id))
            .await
            .and_then(from_row::<ProductRow>)
        {
            Ok(row) => Ok(Some(row.into())),
            Err(GatewayError::RowNotFound | GatewayError::Validation(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn create(&self, input: &ProductInput) -> PortalResult<Product> {
        let input = input.trimmed();
        input.validate_input()?;
        let row = to_row(&ProductWrite::new(&input, None))?;
        let stored: ProductRow = from_row(self.gateway.insert(Table::Products, row).await?)?;
        tracing::info!(product_id = %stored.id, name = %stored.name, "Product created");
        Ok(stored.into())
    }

    /// Replace every editable field and refresh `updated_at`
    pub async fn update(&self, id: &str, input: &ProductInput) -> PortalResult<Product> {
        let input = input.trimmed();
        input.validate_input()?;
        let patch = to_row(&ProductWrite::new(&input, Some(shared::util::now())))?;
        match self.gateway.update(Table::Products, id, patch).await {
            Ok(row) => Ok(from_row::<ProductRow>(row)?.into()),
            Err(GatewayError::RowNotFound) => Err(PortalError::NotFound(
                ErrorCode::ProductNotFound,
                id.to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: &str) -> PortalResult<()> {
        self.gateway.delete(Table::Products, id).await?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    pub async fn count(&self) -> PortalResult<u64> {
        Ok(self.gateway.count(Table::Products).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;

    fn input(name: &str) -> ProductInput {
        ProductInput {
            name: name.into(),
            description: "Builds resumes".into(),
            usage_instructions: "Open the link".into(),
            external_link: "https://example.com/tool".into(),
        }
    }

    fn service() -> (Arc<MemoryGateway>, CatalogService) {
        let gateway = Arc::new(MemoryGateway::new());
        let catalog = CatalogService::new(gateway.clone(), Duration::from_secs(10));
        (gateway, catalog)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_gw, catalog) = service();
        let created = catalog.create(&input("Resume Builder")).await.unwrap();
        assert_eq!(created.name, "Resume Builder");
        let fetched = catalog.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(catalog.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_validates() {
        let (gw, catalog) = service();
        let mut bad = input("Resume Builder");
        bad.external_link = "not a url".into();
        let err = catalog.create(&bad).await.unwrap_err();
        assert!(matches!(err, PortalError::App(ref e) if e.message == "Please enter a valid URL"));
        assert!(gw.rows(Table::Products).await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_fields_rejected() {
        let (gw, catalog) = service();
        let blank = ProductInput {
            name: "   ".into(),
            description: "  ".into(),
            usage_instructions: " ".into(),
            external_link: "https://example.com/tool".into(),
        };
        let err = catalog.create(&blank).await.unwrap_err();
        assert!(matches!(err, PortalError::App(ref e) if e.code == ErrorCode::ValidationFailed));
        assert!(gw.rows(Table::Products).await.is_empty());

        let created = catalog.create(&input("  Resume Builder ")).await.unwrap();
        assert_eq!(created.name, "Resume Builder");
        let err = catalog.update(&created.id, &blank).await.unwrap_err();
        assert!(matches!(err, PortalError::App(ref e) if e.code == ErrorCode::ValidationFailed));
    }

    #[tokio::test]
    async fn test_list_search() {
        let (_gw, catalog) = service();
        catalog.create(&input("Resume Builder")).await.unwrap();
        let mut mock = input("Mock Interview");
        mock.description = "Practice with an AI interviewer".into();
        catalog.create(&mock).await.unwrap();

        let hits = catalog.list(Some("RESUME")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Resume Builder");

        let hits = catalog.list(Some("ai interviewer")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Mock Interview");

        assert_eq!(catalog.list(Some("  ")).await.unwrap().len(), 2);
        assert!(catalog.list(Some("nothing")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (_gw, catalog) = service();
        let err = catalog.update("nope", &input("X")).await.unwrap_err();
        assert!(matches!(err, PortalError::NotFound(ErrorCode::ProductNotFound, _)));
    }

    #[tokio::test]
    async fn test_missing_relation_surfaces() {
        let (gw, catalog) = service();
        gw.drop_relation(Table::Products).await;
        let err = catalog.list(None).await.unwrap_err();
        let app: shared::AppError = err.into();
        assert_eq!(app.code, ErrorCode::CatalogNotInitialized);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_times_out() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.set_latency(Duration::from_secs(30));
        let catalog = CatalogService::new(gateway, Duration::from_secs(10));
        let err = catalog.list(None).await.unwrap_err();
        assert!(matches!(err, PortalError::Gateway(GatewayError::Timeout(d)) if d == Duration::from_secs(10)));
    }
}
