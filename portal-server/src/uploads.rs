//! Blob uploads
//!
//! | Upload | Path | On store failure |
//! |--------|------|------------------|
//! | payment screenshot | `payment-screenshots/{ref}-{millis}.{ext}` | inline `data:` URL |
//! | settings QR code | `settings/qr-code-{millis}.{ext}` (overwrite allowed) | error |

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use serde::Serialize;
use shared::error::{AppError, ErrorCode};

use crate::core::PortalResult;
use crate::gateway::Gateway;

/// Maximum upload size (5MB)
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

const DEFAULT_EXTENSION: &str = "png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedBlob {
    pub url: String,
    /// The bytes are embedded in `url` because the store was unavailable
    pub inline: bool,
}

#[derive(Clone)]
pub struct UploadService {
    gateway: Arc<dyn Gateway>,
    bucket: String,
}

impl UploadService {
    pub fn new(gateway: Arc<dyn Gateway>, bucket: impl Into<String>) -> Self {
        Self {
            gateway,
            bucket: bucket.into(),
        }
    }

    /// Store a payment screenshot. `reference_hint` prefixes the blob name
    /// (the submission has no reference id yet at upload time).
    pub async fn payment_screenshot(
        &self,
        reference_hint: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> PortalResult<UploadedBlob> {
        check_size(&bytes)?;
        let content_type = content_type(file_name);
        let path = format!(
            "payment-screenshots/{}-{}.{}",
            sanitize_hint(reference_hint),
            shared::util::now_millis(),
            extension(file_name)
        );

        match self
            .gateway
            .put_blob(&self.bucket, &path, bytes.clone(), &content_type, false)
            .await
        {
            Ok(url) => Ok(UploadedBlob { url, inline: false }),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Screenshot upload failed, inlining");
                Ok(UploadedBlob {
                    url: data_url(&content_type, &bytes),
                    inline: true,
                })
            }
        }
    }

    /// Store a new payment QR code image and return its public URL
    pub async fn qr_code(&self, file_name: &str, bytes: Vec<u8>) -> PortalResult<String> {
        check_size(&bytes)?;
        let content_type = content_type(file_name);
        let path = format!(
            "settings/qr-code-{}.{}",
            shared::util::now_millis(),
            extension(file_name)
        );
        self.gateway
            .put_blob(&self.bucket, &path, bytes, &content_type, true)
            .await
            .map_err(|e| {
                tracing::error!(path = %path, error = %e, "QR code upload failed");
                AppError::with_message(ErrorCode::FileStorageFailed, e.to_string()).into()
            })
    }
}

fn check_size(bytes: &[u8]) -> Result<(), AppError> {
    if bytes.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if bytes.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!(
                "File too large. Maximum size is {}MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            ),
        )
        .with_detail("size", bytes.len()));
    }
    Ok(())
}

/// Lowercased extension of `file_name`, `png` when there is none
fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn content_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Keep `[A-Za-z0-9-]`; anything else collapses away
fn sanitize_hint(hint: &str) -> String {
    let cleaned: String = hint
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if cleaned.is_empty() {
        "submission".to_string()
    } else {
        cleaned
    }
}

fn data_url(content_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{content_type};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
