//! Admin passcode gate
//!
//! Admin routes require `x-admin-passcode` equal to the configured passcode.
//!
//! | Header | Result |
//! |--------|--------|
//! | absent / empty | 401 NotAuthenticated |
//! | wrong value | 401 InvalidPasscode |

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::core::ServerState;
use crate::utils::AppError;

pub const ADMIN_PASSCODE_HEADER: &str = "x-admin-passcode";

pub async fn require_admin(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS preflight carries no custom headers
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let passcode = req
        .headers()
        .get(ADMIN_PASSCODE_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|p| !p.is_empty());

    match passcode {
        None => Err(AppError::not_authenticated()),
        Some(p) if p == state.config.admin_passcode => Ok(next.run(req).await),
        Some(_) => {
            tracing::warn!(uri = %req.uri(), "Rejected admin request: wrong passcode");
            Err(AppError::invalid_passcode())
        }
    }
}
