//! Common code for integration tests

#![expect(dead_code, reason = "each test binary uses a different subset")]

use anyhow::Error;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    response::Response,
    Router,
};
use catalog_backend::{
    config::{Config, Mode},
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::{matchers::any, Mock, MockServer, ResponseTemplate};

/// The repository owner tests configure.
pub const OWNER: &str = "octocat";

/// The repository name tests configure.
pub const REPO: &str = "storefront";

/// The GitHub token tests configure.
pub const TOKEN: &str = "ghp_test-token";

/// The admin secret tests configure.
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// The Contents API path of the catalog file.
pub const CONTENTS_PATH: &str = "/repos/octocat/storefront/contents/data.json";

/// The raw content path of the catalog file.
pub const RAW_PATH: &str = "/octocat/storefront/main/data.json";

/// Returns a fully populated configuration pointing GitHub at a mock server
pub fn config(github: &MockServer) -> Config {
    Config {
        address: "127.0.0.1:0".into(),
        mode: Mode::Production,
        github_username: Some(OWNER.into()),
        github_repo: Some(REPO.into()),
        github_branch: "main".into(),
        github_token: Some(TOKEN.into()),
        admin_password: Some(ADMIN_PASSWORD.into()),
        github_api_url: github.uri(),
        github_raw_url: github.uri(),
    }
}

/// Returns a configuration with nothing optional set, pointing GitHub at a mock server
pub fn empty_config(github: &MockServer) -> Config {
    Config {
        github_username: None,
        github_repo: None,
        github_token: None,
        admin_password: None,
        ..config(github)
    }
}

/// Builds the app's router for a configuration
pub fn app(config: Config) -> Result<Router, Error> {
    Ok(catalog_backend::router(AppState::new(config)?))
}

/// Makes the mock server fail the test if it receives any request
pub async fn expect_no_requests(github: &MockServer) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(github)
        .await;
}

/// Builds a request with a JSON body
pub fn json_request(method: Method, uri: &str, body: &Value) -> Result<Request<Body>, Error> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

/// Builds a request with no body
pub fn empty_request(method: Method, uri: &str) -> Result<Request<Body>, Error> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())?)
}

/// Sends a request through the router, returning the raw response
pub async fn send_raw(app: Router, request: Request<Body>) -> Result<Response, Error> {
    Ok(app.oneshot(request).await?)
}

/// Sends a request through the router, returning its status and JSON body
pub async fn send(app: Router, request: Request<Body>) -> Result<(StatusCode, Value), Error> {
    let response = send_raw(app, request).await?;
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = serde_json::from_slice(&bytes)?;

    Ok((status, body))
}
