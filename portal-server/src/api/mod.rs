//! HTTP API
//!
//! - [`health`] - liveness
//! - [`products`] - product catalog
//! - [`submissions`] - registration submissions
//! - [`settings`] - admin settings
//! - [`uploads`] - blob uploads
//!
//! Every handler answers with the [`ApiResponse`] envelope. Admin routes sit
//! behind [`auth::require_admin`].

pub mod auth;
pub mod health;
pub mod products;
pub mod settings;
pub mod submissions;
pub mod uploads;

use axum::{Router, http::HeaderName};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub use crate::utils::{ApiResponse, AppError, AppResult};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Full application router with state and tower layers applied
pub fn build_app(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(products::router(&state))
        .merge(submissions::router(&state))
        .merge(settings::router(&state))
        .merge(uploads::router(&state))
        .with_state(state)
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .layer(CorsLayer::permissive())
}
