//! Replacing the product catalog with a new commit.

use axum::{extract::State, http::StatusCode};
use axum_macros::debug_handler;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    api::{self, Json, Response},
    catalog, AppState,
};

/// A `POST` request body for this API route.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    /// The new catalog. Any JSON value other than `null` is accepted.
    #[serde(default)]
    pub new_data: Option<Value>,
}

/// Commits a new catalog to the repository.
///
/// Missing configuration is reported before a malformed body.
///
/// # Errors
///
/// See [`crate::api::Error`].
#[debug_handler]
pub async fn post(
    State(state): State<AppState>,
    body: Result<Json<PostRequest>, api::Error>,
) -> Response<PostResponse> {
    debug!(
        has_token = state.config.github_token.is_some(),
        username = ?state.config.github_username,
        repo = ?state.config.github_repo,
        branch = %state.config.github_branch,
        "checking catalog configuration",
    );

    let repository = state.config.repository()?;
    let token = state.config.github_token()?;

    let Json(body) = body?;

    let Some(new_data) = body.new_data else {
        return Err(api::Error::BadRequest(
            "newData is required in request body".into(),
        ));
    };

    let synced = catalog::sync(&state.github, &repository, token, &new_data).await?;

    Ok((
        StatusCode::OK,
        Json(PostResponse {
            success: true,
            message: "Data updated successfully".into(),
            commit: CommitInfo {
                sha: synced.commit_sha,
                url: synced.commit_url,
            },
            file: FileInfo {
                url: synced.file_url,
                download_url: synced.download_url,
            },
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

    /// The commit the new catalog was written in.
    pub commit: CommitInfo,

    /// The catalog file as written.
    pub file: FileInfo,
}

/// The commit a catalog was written in.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    /// The commit's SHA.
    pub sha: String,

    /// The commit's page on GitHub.
    pub url: String,
}

/// The catalog file as written.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// The file's page on GitHub.
    pub url: String,

    /// The URL serving the file's raw content.
    pub download_url: String,
}
