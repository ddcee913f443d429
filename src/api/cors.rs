//! Cross-origin resource sharing, so the admin UI can call the API from any origin.

use axum::http::{
    header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    },
    HeaderValue, StatusCode,
};
use axum_macros::debug_handler;
use tower::{
    layer::util::{Identity, Stack},
    ServiceBuilder,
};
use tower_http::set_header::SetResponseHeaderLayer;

/// A layer setting one CORS header on every response.
type HeaderLayer = SetResponseHeaderLayer<HeaderValue>;

/// A layer setting all of a route's CORS headers on every response.
pub type CorsLayer = ServiceBuilder<Stack<HeaderLayer, Stack<HeaderLayer, Stack<HeaderLayer, Identity>>>>;

/// Returns a layer which sets permissive CORS headers on every response of a route, advertising
/// the specified methods and request headers.
///
/// # Panics
///
/// Panics if `methods` or `headers` isn't a valid header value.
pub fn allow(methods: &'static str, headers: &'static str) -> CorsLayer {
    ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(methods),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(headers),
        ))
}

/// The route handler for `OPTIONS` (CORS preflight) on every route. Never depends on configuration.
#[expect(clippy::unused_async, reason = "Axum route handlers must be async")]
#[debug_handler]
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
