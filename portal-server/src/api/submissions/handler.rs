//! Submission API Handlers
//!
//! `{id}` accepts either the row id or the reference id.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{RegistrationForm, SubmissionFilter, SubmissionStatus, UserSubmission};

use crate::core::ServerState;
use crate::messaging::{self, RenderedMessage};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// Recorded as `performedBy` when an admin request names nobody
const ADMIN_ACTOR: &str = "Admin";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionRequest {
    #[serde(flatten)]
    pub form: RegistrationForm,
    /// URL returned by the screenshot upload (possibly an inline `data:` URL)
    #[serde(default)]
    pub payment_screenshot_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub performed_by: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRequest {
    pub action: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub performed_by: Option<String>,
}

fn actor(performed_by: Option<String>) -> Option<String> {
    performed_by
        .filter(|p| !p.trim().is_empty())
        .or_else(|| Some(ADMIN_ACTOR.to_string()))
}

fn not_found(key: String) -> AppError {
    AppError::new(ErrorCode::SubmissionNotFound).with_detail("id", key)
}

/// POST /api/submissions - public registration
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateSubmissionRequest>,
) -> AppResult<ApiResponse<UserSubmission>> {
    let submission = state
        .submissions
        .create(payload.form, &payload.payment_screenshot_url)
        .await?;
    Ok(ApiResponse::success(submission))
}

/// List query as sent by the admin filter form; blank values mean "any"
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    pub status: Option<String>,
    pub service_type: Option<String>,
    pub search: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl TryFrom<ListQuery> for SubmissionFilter {
    type Error = AppError;

    fn try_from(query: ListQuery) -> Result<Self, Self::Error> {
        let status = match query.status.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Some(s.parse::<SubmissionStatus>()?),
            _ => None,
        };
        Ok(SubmissionFilter {
            status,
            service_type: query.service_type,
            search: query.search,
            date_from: query.date_from,
            date_to: query.date_to,
        })
    }
}

/// GET /api/submissions?status=&serviceType=&search=&dateFrom=&dateTo=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<UserSubmission>>> {
    let filter = SubmissionFilter::try_from(query)?;
    let submissions = state.submissions.list(&filter).await;
    Ok(ApiResponse::success(submissions))
}

/// GET /api/submissions/{id}
pub async fn get_by_key(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<UserSubmission>> {
    match state.submissions.find(&key).await {
        Some(submission) => Ok(ApiResponse::success(submission)),
        None => Err(not_found(key)),
    }
}

/// PUT /api/submissions/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(key): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<UserSubmission>> {
    let status: SubmissionStatus = payload.status.parse()?;
    let submission = state
        .submissions
        .update_status(&key, status, payload.notes, actor(payload.performed_by))
        .await?;
    tracing::info!(
        reference_id = %submission.reference_id,
        status = %status.as_str(),
        "Submission status updated"
    );
    Ok(ApiResponse::success(submission))
}

/// POST /api/submissions/{id}/timeline
pub async fn add_timeline_entry(
    State(state): State<ServerState>,
    Path(key): Path<String>,
    Json(payload): Json<TimelineRequest>,
) -> AppResult<ApiResponse<UserSubmission>> {
    let submission = state
        .submissions
        .add_timeline_entry(
            &key,
            &payload.action,
            payload.notes,
            actor(payload.performed_by),
        )
        .await?;
    Ok(ApiResponse::success(submission))
}

/// GET /api/submissions/{id}/messages - templates rendered for this candidate
pub async fn messages(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<Vec<RenderedMessage>>> {
    let submission = state
        .submissions
        .find(&key)
        .await
        .ok_or_else(|| not_found(key))?;
    let settings = state.settings.resolve().await;
    Ok(ApiResponse::success(messaging::messages_for(
        &submission,
        &settings,
    )))
}
