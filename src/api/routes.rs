//! All routes for the HTTP API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use axum_macros::debug_handler;
use tower_http::trace::TraceLayer;

use crate::{
    api::{self, cors},
    AppState,
};

pub mod get_products;
pub mod update_json;
pub mod verify_admin;

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/get-products",
            get(get_products::get)
                // Otherwise axum answers `HEAD` with the `GET` handler.
                .head(method_not_allowed)
                .options(cors::preflight)
                .fallback(method_not_allowed)
                .layer(cors::allow("GET, OPTIONS", "Content-Type")),
        )
        .route(
            "/api/update-json",
            post(update_json::post)
                .options(cors::preflight)
                .fallback(method_not_allowed)
                .layer(cors::allow(
                    "GET, POST, PUT, DELETE, OPTIONS",
                    "Content-Type, Authorization",
                )),
        )
        .route(
            "/api/verify-admin",
            post(verify_admin::post)
                .options(cors::preflight)
                .fallback(method_not_allowed)
                .layer(cors::allow("POST, OPTIONS", "Content-Type")),
        )
        .fallback(|| async { api::Error::RouteNotFound })
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::expose_diagnostics,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The route handler for methods a route doesn't support.
#[expect(clippy::unused_async, reason = "Axum route handlers must be async")]
#[debug_handler]
async fn method_not_allowed() -> api::Error {
    api::Error::MethodNotAllowed
}
