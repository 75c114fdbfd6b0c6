// Application state module
// Shared, read-only state handed to every connection

use super::types::Config;
use crate::badge::BadgeRenderer;
use crate::github::{FetchError, IssueClient};

/// Application state
pub struct AppState {
    pub config: Config,
    /// One API client (and connection pool) for all requests
    pub issues: IssueClient,
    pub renderer: BadgeRenderer,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let issues = IssueClient::new(&config.github)?;

        Ok(Self {
            config: config.clone(),
            issues,
            renderer: BadgeRenderer::new(&config.badge),
        })
    }
}
