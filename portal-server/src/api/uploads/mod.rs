//! Upload API Module

mod handler;

use axum::{Router, extract::DefaultBodyLimit, middleware, routing::post};

use crate::api::auth::require_admin;
use crate::core::ServerState;
use crate::uploads::MAX_UPLOAD_SIZE;

/// Multipart framing on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/uploads", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    let public_routes =
        Router::new().route("/payment-screenshot", post(handler::payment_screenshot));

    let admin_routes = Router::new()
        .route("/qr-code", post(handler::qr_code))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    public_routes
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + MULTIPART_OVERHEAD))
}
