//! Settings API Module
//!
//! Reads are public (the registration page needs prices and form fields);
//! every edit is admin only and returns the saved snapshot.

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::api::auth::require_admin;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/settings", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::get))
        .route("/price", get(handler::price));

    let manage_routes = Router::new()
        .route("/", axum::routing::patch(handler::update))
        // Service types
        .route("/service-types", post(handler::add_service_type))
        .route(
            "/service-types/{id}",
            put(handler::rename_service_type).delete(handler::remove_service_type),
        )
        .route(
            "/service-types/{id}/toggle",
            post(handler::toggle_service_type),
        )
        // Companies
        .route("/companies", post(handler::add_company))
        .route("/companies/{id}", delete(handler::remove_company))
        .route("/companies/{id}/prices", put(handler::update_company_price))
        .route("/companies/{id}/toggle", post(handler::toggle_company))
        // Form fields
        .route("/form-fields", post(handler::add_form_field))
        .route("/form-fields/{id}", delete(handler::remove_form_field))
        .route("/form-fields/{id}/move", post(handler::move_form_field))
        .route("/form-fields/{id}/toggle", post(handler::toggle_form_field))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    read_routes.merge(manage_routes)
}
