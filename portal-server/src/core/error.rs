//! Service-layer error
//!
//! `PortalError` carries infrastructure failures (gateway, local cache) up to
//! the API boundary, where they become the shared [`AppError`] with a
//! structured [`ErrorCode`].

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::cache::CacheError;
use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// No tier holds the record
    #[error("{0} not found: {1}")]
    NotFound(ErrorCode, String),

    /// Gateway-backed status update with no fallback tier left
    #[error("Update failed: {0}")]
    UpdateFailed(String),

    /// Business-rule error, passed through untouched
    #[error(transparent)]
    App(#[from] AppError),
}

pub type PortalResult<T> = Result<T, PortalError>;

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Connectivity(msg) => {
                AppError::with_message(ErrorCode::GatewayUnavailable, msg)
            }
            GatewayError::Timeout(after) => AppError::new(ErrorCode::TimeoutError)
                .with_detail("timeoutMs", after.as_millis() as u64),
            GatewayError::RelationNotFound(relation) => {
                AppError::new(ErrorCode::CatalogNotInitialized).with_detail("relation", relation)
            }
            GatewayError::RowNotFound => AppError::new(ErrorCode::NotFound),
            GatewayError::Validation(msg) => AppError::validation(msg),
            GatewayError::Serialization(e) => {
                tracing::error!(error = %e, "Gateway row did not match the expected shape");
                AppError::with_message(ErrorCode::DatabaseError, e.to_string())
            }
        }
    }
}

impl From<CacheError> for AppError {
    fn from(e: CacheError) -> Self {
        tracing::error!(error = %e, "Local cache error");
        match e {
            CacheError::Serialization(_) => AppError::new(ErrorCode::StorageCorrupted),
            other => AppError::with_message(ErrorCode::LocalStorageError, other.to_string()),
        }
    }
}

impl From<PortalError> for AppError {
    fn from(e: PortalError) -> Self {
        match e {
            PortalError::Gateway(e) => e.into(),
            PortalError::Cache(e) => e.into(),
            PortalError::NotFound(code, key) => AppError::new(code).with_detail("id", key),
            PortalError::UpdateFailed(msg) => {
                AppError::with_message(ErrorCode::SubmissionUpdateFailed, msg)
            }
            PortalError::App(e) => e,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}
