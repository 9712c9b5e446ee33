//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{Product, ProductInput};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
}

/// GET /api/products?search= - newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let products = state.catalog.list(params.search.as_deref()).await?;
    Ok(ApiResponse::success(products))
}

/// GET /api/products/count
pub async fn count(State(state): State<ServerState>) -> AppResult<ApiResponse<CountResponse>> {
    let count = state.catalog.count().await?;
    Ok(ApiResponse::success(CountResponse { count }))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Product>> {
    let product = state
        .catalog
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound).with_detail("id", id))?;
    Ok(ApiResponse::success(product))
}

/// POST /api/products
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductInput>,
) -> AppResult<ApiResponse<Product>> {
    let product = state.catalog.create(&payload).await?;
    Ok(ApiResponse::success(product))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductInput>,
) -> AppResult<ApiResponse<Product>> {
    let product = state.catalog.update(&id, &payload).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.catalog.delete(&id).await?;
    Ok(ApiResponse::ok())
}
