//! A backend letting a storefront's admin UI read and write its product catalog, a single JSON file
//! committed to a GitHub repository.

pub mod api;
pub mod catalog;
pub mod config;
pub mod github;

use std::sync::Arc;

pub use api::routes::router;
use config::Config;

/// State shared by every request.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The server's configuration.
    pub config: Arc<Config>,

    /// The client used to reach GitHub.
    pub github: github::Client,
}

impl AppState {
    /// Constructs the shared state from the server's configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the GitHub client can't be initialized.
    pub fn new(config: Config) -> Result<Self, github::Error> {
        let github = github::Client::new(&config.github_api_url, &config.github_raw_url)?;

        Ok(Self {
            config: Arc::new(config),
            github,
        })
    }
}
