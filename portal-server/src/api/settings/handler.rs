//! Settings API Handlers

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{AdminSettings, MoveDirection, NewFormField, SettingsPatch};

use crate::core::ServerState;
use crate::utils::validation::{MAX_LABEL_LEN, validate_required_text};
use crate::utils::{ApiResponse, AppResult};

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub company: String,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub price: i64,
}

#[derive(Debug, Deserialize)]
pub struct LabelRequest {
    pub label: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompanyRequest {
    pub company_name: String,
    #[serde(default)]
    pub prices: BTreeMap<String, i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdateRequest {
    pub service_key: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: MoveDirection,
}

/// GET /api/settings
pub async fn get(State(state): State<ServerState>) -> AppResult<ApiResponse<AdminSettings>> {
    Ok(ApiResponse::success(state.settings.resolve().await))
}

/// PATCH /api/settings
pub async fn update(
    State(state): State<ServerState>,
    Json(patch): Json<SettingsPatch>,
) -> AppResult<ApiResponse<AdminSettings>> {
    let settings = state.settings.update(patch).await?;
    tracing::info!("Admin settings updated");
    Ok(ApiResponse::success(settings))
}

/// GET /api/settings/price?company=&service=
pub async fn price(
    State(state): State<ServerState>,
    Query(query): Query<PriceQuery>,
) -> AppResult<ApiResponse<PriceResponse>> {
    let price = state.settings.price_for(&query.company, &query.service).await;
    Ok(ApiResponse::success(PriceResponse { price }))
}

// =============================================================================
// Service types
// =============================================================================

/// POST /api/settings/service-types
pub async fn add_service_type(
    State(state): State<ServerState>,
    Json(payload): Json<LabelRequest>,
) -> AppResult<ApiResponse<AdminSettings>> {
    validate_required_text(&payload.label, "label", MAX_LABEL_LEN)?;
    let (added, settings) = state
        .settings
        .edit(|s| s.add_service_type(&payload.label).cloned())
        .await?;
    tracing::info!(key = %added.key, label = %added.label, "Service type added");
    Ok(ApiResponse::success(settings))
}

/// PUT /api/settings/service-types/{id}
pub async fn rename_service_type(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<LabelRequest>,
) -> AppResult<ApiResponse<AdminSettings>> {
    validate_required_text(&payload.label, "label", MAX_LABEL_LEN)?;
    let ((), settings) = state
        .settings
        .edit(|s| s.rename_service_type(&id, &payload.label))
        .await?;
    Ok(ApiResponse::success(settings))
}

/// POST /api/settings/service-types/{id}/toggle
pub async fn toggle_service_type(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminSettings>> {
    let (_, settings) = state.settings.edit(|s| s.toggle_service_type(&id)).await?;
    Ok(ApiResponse::success(settings))
}

/// DELETE /api/settings/service-types/{id}
pub async fn remove_service_type(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminSettings>> {
    let (removed, settings) = state.settings.edit(|s| s.remove_service_type(&id)).await?;
    tracing::info!(key = %removed.key, "Service type removed");
    Ok(ApiResponse::success(settings))
}

// =============================================================================
// Companies
// =============================================================================

/// POST /api/settings/companies
pub async fn add_company(
    State(state): State<ServerState>,
    Json(payload): Json<NewCompanyRequest>,
) -> AppResult<ApiResponse<AdminSettings>> {
    validate_required_text(&payload.company_name, "companyName", MAX_LABEL_LEN)?;
    let NewCompanyRequest {
        company_name,
        prices,
    } = payload;
    let (_, settings) = state
        .settings
        .edit(|s| s.add_company(&company_name, prices).map(|_| ()))
        .await?;
    Ok(ApiResponse::success(settings))
}

/// PUT /api/settings/companies/{id}/prices
pub async fn update_company_price(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PriceUpdateRequest>,
) -> AppResult<ApiResponse<AdminSettings>> {
    let ((), settings) = state
        .settings
        .edit(|s| s.update_company_price(&id, &payload.service_key, payload.amount))
        .await?;
    Ok(ApiResponse::success(settings))
}

/// POST /api/settings/companies/{id}/toggle
pub async fn toggle_company(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminSettings>> {
    let (_, settings) = state.settings.edit(|s| s.toggle_company(&id)).await?;
    Ok(ApiResponse::success(settings))
}

/// DELETE /api/settings/companies/{id}
pub async fn remove_company(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminSettings>> {
    let (_, settings) = state.settings.edit(|s| s.remove_company(&id)).await?;
    Ok(ApiResponse::success(settings))
}

// =============================================================================
// Form fields
// =============================================================================

/// POST /api/settings/form-fields
pub async fn add_form_field(
    State(state): State<ServerState>,
    Json(payload): Json<NewFormField>,
) -> AppResult<ApiResponse<AdminSettings>> {
    let (_, settings) = state
        .settings
        .edit(|s| s.add_form_field(payload).map(|_| ()))
        .await?;
    Ok(ApiResponse::success(settings))
}

/// POST /api/settings/form-fields/{id}/move
pub async fn move_form_field(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MoveRequest>,
) -> AppResult<ApiResponse<AdminSettings>> {
    let ((), settings) = state
        .settings
        .edit(|s| s.move_form_field(&id, payload.direction))
        .await?;
    Ok(ApiResponse::success(settings))
}

/// POST /api/settings/form-fields/{id}/toggle
pub async fn toggle_form_field(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminSettings>> {
    let (_, settings) = state.settings.edit(|s| s.toggle_form_field(&id)).await?;
    Ok(ApiResponse::success(settings))
}

/// DELETE /api/settings/form-fields/{id}
pub async fn remove_form_field(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminSettings>> {
    let (_, settings) = state.settings.edit(|s| s.remove_form_field(&id)).await?;
    Ok(ApiResponse::success(settings))
}
