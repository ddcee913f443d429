//! The admin gate, checking a submitted admin secret.

use axum::{extract::State, http::StatusCode};
use axum_macros::debug_handler;
use ring::constant_time::verify_slices_are_equal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    api::{self, Json, Response},
    AppState,
};

/// A `POST` request body for this API route.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    /// The submitted admin secret in plain text. Values other than strings never match.
    #[serde(default)]
    pub password: Option<Value>,
}

/// Checks whether the submitted secret is the admin secret.
///
/// Missing configuration is reported before anything about the body.
///
/// # Errors
///
/// See [`crate::api::Error`].
#[debug_handler]
pub async fn post(
    State(state): State<AppState>,
    body: Result<Json<PostRequest>, api::Error>,
) -> Response<PostResponse> {
    let admin_password = state.config.admin_password()?;

    // The body's parse error isn't echoed, so a malformed body reads the same as an empty one.
    let Ok(Json(PostRequest { password })) = body else {
        return Err(password_required());
    };

    let password = match password {
        None => return Err(password_required()),
        Some(Value::String(password)) if password.is_empty() => return Err(password_required()),
        Some(Value::String(password)) => password,
        Some(_) => return Err(api::Error::InvalidCredentials),
    };

    if !secrets_match(&password, admin_password) {
        // Deliberately vague so a guesser learns nothing beyond the mismatch.
        return Err(api::Error::InvalidCredentials);
    }

    Ok((
        StatusCode::OK,
        Json(PostResponse {
            success: true,
            message: "Access granted".into(),
        }),
    ))
}

/// A `POST` response body for this API route.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    /// Always `true`.
    pub success: bool,

    /// A human-readable confirmation.
    pub message: String,
}

/// The error for a request not submitting a secret.
fn password_required() -> api::Error {
    api::Error::BadRequest("Password is required".into())
}

/// Returns whether two secrets are exactly equal, taking the same time wherever they differ.
fn secrets_match(submitted: &str, expected: &str) -> bool {
    verify_slices_are_equal(submitted.as_bytes(), expected.as_bytes()).is_ok()
}
