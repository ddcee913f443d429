//! The product catalog, as last committed to the repository.

use axum::{extract::State, http::StatusCode};
use axum_macros::debug_handler;
use serde_json::Value;

use crate::{
    api::{Json, Response},
    catalog, AppState,
};

/// Gets the current catalog, or an empty catalog if none has been written yet.
///
/// # Errors
///
/// See [`crate::api::Error`].
#[debug_handler]
pub async fn get(State(state): State<AppState>) -> Response<Value> {
    let repository = state.config.repository()?;

    let catalog = catalog::read(
        &state.github,
        &repository,
        state.config.github_token.as_deref(),
    )
    .await?;

    Ok((StatusCode::OK, Json(catalog)))
}
