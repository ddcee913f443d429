//! Server configuration, read once from the environment at startup.

use std::fmt;

use thiserror::Error;

/// The branch used when `GITHUB_BRANCH` isn't set.
const DEFAULT_BRANCH: &str = "main";

/// The address listened on when `ADDRESS` isn't set.
const DEFAULT_ADDRESS: &str = "127.0.0.1:3000";

/// The default base URL of GitHub's REST API.
const DEFAULT_API_URL: &str = "https://api.github.com";

/// The default base URL GitHub serves raw file contents from.
const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// How much diagnostic detail the server exposes and logs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Mode {
    /// Error responses carry diagnostics and logging defaults to `debug`.
    Development,

    /// Error responses carry no diagnostics and logging defaults to `info`.
    #[default]
    Production,
}

impl Mode {
    /// Parses a mode from an `APP_ENV` value. Anything other than a development value is treated as
    /// production.
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Production,
        }
    }

    /// Whether this is [`Mode::Development`].
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// The GitHub repository and branch the catalog file lives on.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Repository {
    /// The user or organization owning the repository.
    pub owner: String,

    /// The repository's name.
    pub name: String,

    /// The branch the catalog is read from and committed to.
    pub branch: String,
}

/// The server's configuration.
///
/// Values a route needs but which are absent are reported by that route as a [`ConfigError`]
/// rather than failing startup, so unrelated routes keep working.
#[derive(Clone)]
pub struct Config {
    /// The socket address to listen on.
    pub address: String,

    /// The deployment mode.
    pub mode: Mode,

    /// The owner of the repository storing the catalog.
    pub github_username: Option<String>,

    /// The name of the repository storing the catalog.
    pub github_repo: Option<String>,

    /// The branch storing the catalog.
    pub github_branch: String,

    /// The token used to authenticate with GitHub.
    pub github_token: Option<String>,

    /// The secret admins must submit to the admin gate.
    pub admin_password: Option<String>,

    /// The base URL of GitHub's REST API, without a trailing slash.
    pub github_api_url: String,

    /// The base URL GitHub serves raw file contents from, without a trailing slash.
    pub github_raw_url: String,
}

impl Config {
    /// Reads the configuration from environment variables (including any in a `.env` file).
    ///
    /// Empty variables are treated as unset.
    pub fn from_env() -> Self {
        Self {
            address: var("ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.into()),
            mode: var("APP_ENV").map_or_else(Mode::default, |value| Mode::from_env_value(&value)),
            github_username: var("GITHUB_USERNAME"),
            github_repo: var("GITHUB_REPO"),
            github_branch: var("GITHUB_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.into()),
            github_token: var("GITHUB_TOKEN"),
            admin_password: var("ADMIN_PASSWORD"),
            github_api_url: base_url(var("GITHUB_API_URL").as_deref(), DEFAULT_API_URL),
            github_raw_url: base_url(var("GITHUB_RAW_URL").as_deref(), DEFAULT_RAW_URL),
        }
    }

    /// Gets the repository storing the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner or the repository name isn't configured.
    pub fn repository(&self) -> Result<Repository, ConfigError> {
        let (Some(owner), Some(name)) = (&self.github_username, &self.github_repo) else {
            return Err(ConfigError::MissingRepository);
        };

        Ok(Repository {
            owner: owner.clone(),
            name: name.clone(),
            branch: self.github_branch.clone(),
        })
    }

    /// Gets the GitHub token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token isn't configured.
    pub fn github_token(&self) -> Result<&str, ConfigError> {
        self.github_token
            .as_deref()
            .ok_or(ConfigError::MissingToken)
    }

    /// Gets the admin secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret isn't configured.
    pub fn admin_password(&self) -> Result<&str, ConfigError> {
        self.admin_password
            .as_deref()
            .ok_or(ConfigError::MissingAdminPassword)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        /// Prints a secret's presence without its value.
        fn redact(secret: Option<&String>) -> Option<&'static str> {
            secret.map(|_| "[REDACTED]")
        }

        f.debug_struct("Config")
            .field("address", &self.address)
            .field("mode", &self.mode)
            .field("github_username", &self.github_username)
            .field("github_repo", &self.github_repo)
            .field("github_branch", &self.github_branch)
            .field("github_token", &redact(self.github_token.as_ref()))
            .field("admin_password", &redact(self.admin_password.as_ref()))
            .field("github_api_url", &self.github_api_url)
            .field("github_raw_url", &self.github_raw_url)
            .finish()
    }
}

/// A value a route needs is missing from the configuration.
#[derive(Error, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ConfigError {
    /// The repository owner or name is missing.
    #[error("GITHUB_USERNAME and GITHUB_REPO environment variables are required")]
    MissingRepository,

    /// The GitHub token is missing.
    #[error("GITHUB_TOKEN environment variable is not set")]
    MissingToken,

    /// The admin secret is missing.
    #[error("ADMIN_PASSWORD environment variable is not set")]
    MissingAdminPassword,
}

/// Reads an environment variable, treating an unset, empty, or non-UTF-8 variable as absent.
fn var(name: &str) -> Option<String> {
    dotenvy::var(name).ok().filter(|value| !value.is_empty())
}

/// Returns a configured base URL (or the default) with any trailing slashes removed.
fn base_url(configured: Option<&str>, default: &str) -> String {
    configured
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_owned()
}
