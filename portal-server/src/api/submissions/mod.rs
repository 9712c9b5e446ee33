//! Submission API Module
//!
//! Registration is public; everything else is admin only.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::api::auth::require_admin;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/submissions", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    let public_routes = Router::new().route("/", post(handler::create));

    let admin_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_key))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/timeline", post(handler::add_timeline_entry))
        .route("/{id}/messages", get(handler::messages))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    public_routes.merge(admin_routes)
}
