//! The HTTP API the storefront's admin UI talks to.

pub mod cors;
pub mod routes;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Request, State},
    http::{header::CONTENT_LENGTH, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use axum_macros::FromRequest;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::{catalog, config::ConfigError, github, AppState};

/// An API error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The request body is malformed or missing a required field.
    #[error("{0}")]
    BadRequest(String),

    /// The requested API route doesn't exist.
    #[error("Not found")]
    RouteNotFound,

    /// The route doesn't support the request's method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The server is missing configuration the route needs.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The submitted admin secret is wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// GitHub responded with a non-success status.
    #[error("GitHub API error: {} - {message}", .status.as_u16())]
    Upstream {
        /// The method and URL of the failed request.
        endpoint: String,

        /// GitHub's response status.
        status: StatusCode,

        /// GitHub's error message.
        message: String,

        /// GitHub's response body, if it was JSON.
        details: Option<Value>,
    },

    /// Anything else.
    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl Error {
    /// Returns the response status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Config(_) | Self::Upstream { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message shown to the client.
    fn message(&self) -> String {
        match self {
            // Don't tell a client guessing the admin secret whether the gate is even configured.
            Self::Config(ConfigError::MissingAdminPassword) => "Server configuration error".into(),
            _ => self.to_string(),
        }
    }

    /// Returns diagnostic details for this error, which are only exposed in development mode.
    fn diagnostics(&self) -> Option<Value> {
        match self {
            Self::Upstream { endpoint, .. } => Some(json!({ "endpoint": endpoint })),
            Self::Internal(error) => Some(json!({
                "error": error.to_string(),
                "stack": format!("{error:?}"),
            })),
            _ => None,
        }
    }
}

impl From<github::Error> for Error {
    fn from(error: github::Error) -> Self {
        match error {
            github::Error::Status {
                endpoint,
                status,
                message,
                body,
            } => Self::Upstream {
                endpoint,
                status,
                message,
                details: body,
            },
            github::Error::Request(error) => Self::Internal(error.into()),
        }
    }
}

impl From<catalog::Error> for Error {
    fn from(error: catalog::Error) -> Self {
        match error {
            catalog::Error::GitHub(error) => error.into(),
            error => Self::Internal(error.into()),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let mut body = Map::new();
        body.insert("success".into(), false.into());
        body.insert("error".into(), self.message().into());

        if let Self::Upstream {
            status, details, ..
        } = &self
        {
            body.insert("status".into(), status.as_u16().into());
            body.insert("details".into(), details.clone().unwrap_or_default());
        }

        let mut response = (status, axum::Json(body)).into_response();

        if let Some(diagnostics) = self.diagnostics() {
            response.extensions_mut().insert(Diagnostics(diagnostics));
        }

        response
    }
}

/// Diagnostic details attached to an error response, which [`expose_diagnostics`] adds to the
/// response body in development mode.
#[derive(Clone, Debug)]
struct Diagnostics(Value);

/// Middleware which adds an error response's [`Diagnostics`] to its body under `debug` when the
/// server is in development mode.
pub(crate) async fn expose_diagnostics(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> axum::response::Response {
    let response = next.run(request).await;

    if !state.config.mode.is_development() {
        return response;
    }

    let Some(Diagnostics(diagnostics)) = response.extensions().get::<Diagnostics>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();

    let Ok(bytes) = axum::body::to_bytes(body, usize::MAX).await else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let Ok(Value::Object(mut envelope)) = serde_json::from_slice(&bytes) else {
        return axum::response::Response::from_parts(parts, Body::from(bytes));
    };

    envelope.insert("debug".into(), diagnostics);
    parts.headers.remove(CONTENT_LENGTH);

    (parts, axum::Json(envelope)).into_response()
}

/// Equivalent to [`axum::Json`], but with [`Error`] as its rejection so malformed bodies get the
/// API's error envelope.
#[derive(FromRequest, Clone, Copy, Default, Debug)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}

/// The result of an API route handler.
pub type Response<T> = Result<(StatusCode, Json<T>), Error>;
