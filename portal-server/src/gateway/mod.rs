//! Persistence Gateway
//!
//! Uniform interface to the hosted relational store and its blob storage.
//! One attempt per call: no retries and no caching at this layer. Every
//! failure is reported upward as a typed [`GatewayError`].
//!
//! | Implementation | Backing | Used by |
//! |----------------|---------|---------|
//! | [`RestGateway`] | PostgREST + Storage HTTP API | production |
//! | [`MemoryGateway`] | in-process JSON rows | development, tests |

mod memory;
mod query;
mod rest;

pub use memory::MemoryGateway;
pub use query::{Condition, OrderBy, Query};
pub use rest::RestGateway;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Relations the portal reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Products,
    UserSubmissions,
    AdminSettings,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::UserSubmissions => "user_submissions",
            Table::AdminSettings => "admin_settings",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Unreachable, or the store reported a query error
    #[error("Gateway unavailable: {0}")]
    Connectivity(String),

    #[error("No matching row")]
    RowNotFound,

    #[error("Relation \"{0}\" does not exist")]
    RelationNotFound(String),

    /// Payload rejected by the store
    #[error("Rejected by store: {0}")]
    Validation(String),

    #[error("Gateway did not respond within {0:?}")]
    Timeout(Duration),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GatewayError {
    /// "No data" outcomes that read paths treat as absent rather than fatal
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            GatewayError::RowNotFound | GatewayError::RelationNotFound(_)
        )
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Query/mutation surface of the hosted store.
///
/// Rows are JSON objects using the store's snake_case column names.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn select(&self, table: Table, query: &Query) -> GatewayResult<Vec<Value>>;

    /// First matching row, [`GatewayError::RowNotFound`] when there is none
    async fn fetch_one(&self, table: Table, query: &Query) -> GatewayResult<Value> {
        let query = query.clone().limit(1);
        self.select(table, &query)
            .await?
            .into_iter()
            .next()
            .ok_or(GatewayError::RowNotFound)
    }

    /// Insert one row, returning the stored representation
    async fn insert(&self, table: Table, row: Value) -> GatewayResult<Value>;

    /// Merge `patch` into the row with `id`, returning the stored row
    async fn update(&self, table: Table, id: &str, patch: Value) -> GatewayResult<Value>;

    /// Insert or merge by `id`
    async fn upsert(&self, table: Table, row: Value) -> GatewayResult<Value>;

    /// Deleting a missing id is not an error
    async fn delete(&self, table: Table, id: &str) -> GatewayResult<()>;

    async fn count(&self, table: Table) -> GatewayResult<u64>;

    /// Store a blob and return its public URL
    async fn put_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> GatewayResult<String>;
}

/// Serialize a typed row for the gateway
pub fn to_row<T: Serialize>(value: &T) -> GatewayResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Deserialize a gateway row into its typed form
pub fn from_row<T: DeserializeOwned>(row: Value) -> GatewayResult<T> {
    Ok(serde_json::from_value(row)?)
}

pub fn from_rows<T: DeserializeOwned>(rows: Vec<Value>) -> GatewayResult<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}
