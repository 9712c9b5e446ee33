//! Upload API Handlers
//!
//! Multipart form, file in the `file` field. The payment screenshot form
//! may also carry a `referenceId` used to name the blob.

use axum::extract::{Multipart, State};
use serde::Serialize;
use shared::models::SettingsPatch;

use crate::core::ServerState;
use crate::uploads::UploadedBlob;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// Name used for screenshots uploaded before a reference id exists
const DEFAULT_REFERENCE_HINT: &str = "temp";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeResponse {
    pub url: String,
}

struct UploadForm {
    file_name: String,
    bytes: Vec<u8>,
    reference_id: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut reference_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::invalid_request(format!("Failed to read file: {}", e))
                })?;
                file = Some((file_name, data.to_vec()));
            }
            Some("referenceId") => {
                let text = field.text().await.map_err(|e| {
                    AppError::invalid_request(format!("Failed to read referenceId: {}", e))
                })?;
                reference_id = Some(text).filter(|t| !t.trim().is_empty());
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| AppError::new(ErrorCode::NoFileProvided))?;
    Ok(UploadForm {
        file_name,
        bytes,
        reference_id,
    })
}

/// POST /api/uploads/payment-screenshot
pub async fn payment_screenshot(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<UploadedBlob>> {
    let form = read_form(multipart).await?;
    let hint = form
        .reference_id
        .as_deref()
        .unwrap_or(DEFAULT_REFERENCE_HINT);
    let blob = state
        .uploads
        .payment_screenshot(hint, &form.file_name, form.bytes)
        .await?;
    Ok(ApiResponse::success(blob))
}

/// POST /api/uploads/qr-code - stores the image and points the settings at it
pub async fn qr_code(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<QrCodeResponse>> {
    let form = read_form(multipart).await?;
    let url = state.uploads.qr_code(&form.file_name, form.bytes).await?;
    state
        .settings
        .update(SettingsPatch {
            qr_code_url: Some(url.clone()),
            ..Default::default()
        })
        .await?;
    tracing::info!(url = %url, "Payment QR code replaced");
    Ok(ApiResponse::success(QrCodeResponse { url }))
}
