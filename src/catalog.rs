//! Reading and writing the product catalog, a JSON file stored in a GitHub repository.
//!
//! The catalog's contents are opaque here. Whatever JSON value is written is what's read back.

use base64::{prelude::BASE64_STANDARD, Engine};
use serde_json::{json, Value};
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::{
    config::Repository,
    github::{self, PutContents, RevisionHandle},
};

/// The path of the catalog file from the repository root.
pub const CATALOG_PATH: &str = "data.json";

/// An error reading or writing the catalog.
#[derive(Error, Debug)]
pub enum Error {
    /// A GitHub request failed.
    #[error(transparent)]
    GitHub(#[from] github::Error),

    /// The catalog couldn't be serialized.
    #[error("couldn't serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The current time couldn't be formatted.
    #[error("couldn't format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Where a catalog write landed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Synced {
    /// The SHA of the commit the write created.
    pub commit_sha: String,

    /// The commit's page on GitHub.
    pub commit_url: String,

    /// The catalog file's page on GitHub.
    pub file_url: String,

    /// The URL serving the catalog file's raw content.
    pub download_url: String,
}

/// Returns the current UTC time as an ISO 8601 (RFC 3339) string.
///
/// # Errors
///
/// Fails only if the current year can't be represented in RFC 3339.
pub fn timestamp() -> Result<String, time::error::Format> {
    OffsetDateTime::now_utc().format(&Rfc3339)
}

/// Returns the catalog served before one has ever been written.
///
/// # Errors
///
/// See [`timestamp`].
pub fn empty() -> Result<Value, time::error::Format> {
    Ok(json!({
        "products": [],
        "lastUpdated": timestamp()?,
    }))
}

/// Reads the current catalog, or an [`empty`] one if the catalog file doesn't exist yet.
///
/// # Errors
///
/// Returns an error if fetching the file fails for any reason other than it not existing.
pub async fn read(
    github: &github::Client,
    repository: &Repository,
    token: Option<&str>,
) -> Result<Value, Error> {
    if let Some(catalog) = github.get_raw_json(repository, CATALOG_PATH, token).await? {
        return Ok(catalog);
    }

    info!("catalog file doesn't exist yet; serving an empty catalog");
    Ok(empty()?)
}

/// Writes a catalog to the repository in a new commit, creating the catalog file if it doesn't
/// exist.
///
/// The revision handle of the file being replaced is looked up first so GitHub can reject the
/// write if the file changes in between. If that lookup fails for any reason, the write is still
/// attempted without a handle, which GitHub rejects if the file exists.
///
/// Identical catalogs aren't deduplicated: every successful call creates a commit.
///
/// # Errors
///
/// Returns an error if the catalog can't be encoded or GitHub rejects the write. Rejections are
/// never retried.
pub async fn sync(
    github: &github::Client,
    repository: &Repository,
    token: &str,
    catalog: &Value,
) -> Result<Synced, Error> {
    let sha = current_revision(github, repository, token).await;

    let contents = PutContents {
        message: commit_message()?,
        content: encode(catalog)?,
        branch: repository.branch.clone(),
        sha,
    };

    debug!(
        message = %contents.message,
        branch = %contents.branch,
        sha = ?contents.sha,
        "committing catalog",
    );

    let written = github
        .put_contents(repository, CATALOG_PATH, token, &contents)
        .await?;

    info!(commit = %written.commit.sha, "committed catalog");

    Ok(Synced {
        commit_sha: written.commit.sha,
        commit_url: written.commit.html_url,
        file_url: written.content.html_url,
        download_url: written.content.download_url,
    })
}

/// Looks up the catalog file's current revision handle, returning `None` if the file doesn't exist
/// or the lookup fails.
async fn current_revision(
    github: &github::Client,
    repository: &Repository,
    token: &str,
) -> Option<RevisionHandle> {
    match github.get_contents(repository, CATALOG_PATH, token).await {
        Ok(Some(file)) => {
            debug!(sha = %file.sha, "found existing catalog file");
            Some(file.sha)
        }
        Ok(None) => {
            debug!("catalog file doesn't exist yet; creating it");
            None
        }
        Err(error) => {
            warn!(
                %error,
                status = ?error.status(),
                "couldn't look up the catalog's current revision; writing without one",
            );
            None
        }
    }
}

/// Returns the message for a catalog commit.
fn commit_message() -> Result<String, time::error::Format> {
    Ok(format!("Update products data - {}", timestamp()?))
}

/// Serializes a catalog as indented JSON and base64-encodes it for the Contents API.
fn encode(catalog: &Value) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(catalog)?;

    Ok(BASE64_STANDARD.encode(json))
}
