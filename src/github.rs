//! A client for the parts of GitHub's REST API used to store the catalog file.

use derive_more::derive::{AsRef, Deref, Display};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use thiserror::Error;
use tracing::debug;

use crate::config::Repository;

/// The `User-Agent` GitHub requires on every API request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The media type requesting version 3 of GitHub's REST API.
const ACCEPT_V3: &str = "application/vnd.github.v3+json";

/// ASCII characters percent-encoded in a single URI path segment, matching JavaScript's
/// `encodeURIComponent`.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// [`SEGMENT`], but leaving `/` alone so a file path keeps its directory separators.
const FILE_PATH: &AsciiSet = &SEGMENT.remove(b'/');

/// An opaque identifier of one version of a file, which GitHub calls its blob SHA.
///
/// Writing over an existing file requires the handle of its current version, so a write based on
/// a stale read is rejected instead of silently losing the newer version.
#[derive(Deref, AsRef, Display, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
#[as_ref(forward)]
#[serde(transparent)]
pub struct RevisionHandle(String);

impl RevisionHandle {
    /// Wraps a revision handle string.
    pub fn new(handle: String) -> Self {
        Self(handle)
    }
}

/// The subset of a Contents API file object this client needs.
#[derive(Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ContentsFile {
    /// The handle of the file's current version.
    pub sha: RevisionHandle,
}

/// A request body to create or update a file through the Contents API.
#[skip_serializing_none]
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct PutContents {
    /// The commit message.
    pub message: String,

    /// The new file content, base64-encoded.
    pub content: String,

    /// The branch to commit to.
    pub branch: String,

    /// The handle of the version being replaced. Must be omitted when creating the file.
    pub sha: Option<RevisionHandle>,
}

/// The response body of a successful Contents API write.
#[derive(Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct PutContentsResponse {
    /// The file as it exists after the write.
    pub content: WrittenFile,

    /// The commit the write created.
    pub commit: Commit,
}

/// A file written through the Contents API.
#[derive(Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct WrittenFile {
    /// The file's page on GitHub.
    pub html_url: String,

    /// The URL serving the file's raw content.
    pub download_url: String,
}

/// A commit created through the Contents API.
#[derive(Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Commit {
    /// The commit's SHA.
    pub sha: String,

    /// The commit's page on GitHub.
    pub html_url: String,
}

/// An error from a GitHub request.
#[derive(Error, Debug)]
pub enum Error {
    /// The request couldn't be sent or its response couldn't be read.
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// GitHub responded with a non-success status.
    #[error("{endpoint} responded with {status}: {message}")]
    Status {
        /// The method and URL of the failed request.
        endpoint: String,

        /// The response's status code.
        status: StatusCode,

        /// GitHub's error message, or the status's reason phrase if there was none.
        message: String,

        /// The response body, if it was JSON.
        body: Option<Value>,
    },
}

impl Error {
    /// Returns the response status, if GitHub responded.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Request(error) => error.status(),
            Self::Status { status, .. } => Some(*status),
        }
    }
}

/// A GitHub client.
#[derive(Clone, Debug)]
pub struct Client {
    /// The pooled HTTP client requests are sent with.
    http: reqwest::Client,

    /// The base URL of GitHub's REST API, without a trailing slash.
    api_url: String,

    /// The base URL GitHub serves raw file contents from, without a trailing slash.
    raw_url: String,
}

impl Client {
    /// Constructs a new GitHub [`Client`].
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client can't be initialized.
    pub fn new(api_url: &str, raw_url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http,
            api_url: api_url.to_owned(),
            raw_url: raw_url.to_owned(),
        })
    }

    /// Gets the metadata of a file through the Contents API, or `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or GitHub responds with a non-success status other
    /// than `404 Not Found`.
    pub async fn get_contents(
        &self,
        repository: &Repository,
        path: &str,
        token: &str,
    ) -> Result<Option<ContentsFile>, Error> {
        let url = format!(
            "{}?ref={}",
            self.contents_url(repository, path),
            utf8_percent_encode(&repository.branch, SEGMENT),
        );

        let response = self.request(Method::GET, &url, Some(token)).send().await?;

        debug!(status = %response.status(), "GitHub responded to contents lookup");

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(check_status(&Method::GET, &url, response).await?.json().await?))
    }

    /// Creates or updates a file through the Contents API, creating a new commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or GitHub rejects the write (for example, because
    /// `contents.sha` isn't the file's current revision).
    pub async fn put_contents(
        &self,
        repository: &Repository,
        path: &str,
        token: &str,
        contents: &PutContents,
    ) -> Result<PutContentsResponse, Error> {
        let url = self.contents_url(repository, path);

        let response = self
            .request(Method::PUT, &url, Some(token))
            .json(contents)
            .send()
            .await?;

        debug!(status = %response.status(), "GitHub responded to contents write");

        Ok(check_status(&Method::PUT, &url, response).await?.json().await?)
    }

    /// Downloads a file's raw content from the repository's branch and parses it as JSON, or
    /// returns `None` if it doesn't exist.
    ///
    /// The token is only needed for private repositories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, GitHub responds with a non-success status other than
    /// `404 Not Found`, or the content isn't JSON.
    pub async fn get_raw_json(
        &self,
        repository: &Repository,
        path: &str,
        token: Option<&str>,
    ) -> Result<Option<Value>, Error> {
        let url = format!(
            "{}/{}/{}/{}/{}",
            self.raw_url,
            utf8_percent_encode(&repository.owner, SEGMENT),
            utf8_percent_encode(&repository.name, SEGMENT),
            // Raw URLs take branch names containing `/` unencoded.
            utf8_percent_encode(&repository.branch, FILE_PATH),
            utf8_percent_encode(path, FILE_PATH),
        );

        let response = self.request(Method::GET, &url, token).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(check_status(&Method::GET, &url, response).await?.json().await?))
    }

    /// Returns the Contents API URL of a file.
    fn contents_url(&self, repository: &Repository, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url,
            utf8_percent_encode(&repository.owner, SEGMENT),
            utf8_percent_encode(&repository.name, SEGMENT),
            utf8_percent_encode(path, FILE_PATH),
        )
    }

    /// Starts building a request with the headers GitHub expects.
    fn request(&self, method: Method, url: &str, token: Option<&str>) -> RequestBuilder {
        let request = self
            .http
            .request(method, url)
            .header(header::ACCEPT, ACCEPT_V3);

        if let Some(token) = token {
            return request.header(header::AUTHORIZATION, format!("token {token}"));
        }

        request
    }
}

/// Passes a successful response through, or reads a non-success response into an
/// [`Error::Status`].
async fn check_status(
    method: &Method,
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, Error> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<Value>(&text).ok();

    let message = body
        .as_ref()
        .and_then(|body| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| Some(text.trim().to_owned()).filter(|text| !text.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_owned());

    Err(Error::Status {
        endpoint: format!("{method} {url}"),
        status,
        message,
        body,
    })
}
