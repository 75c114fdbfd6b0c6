//! GitHub API module
//!
//! Fetches an issue from the REST API and extracts one reaction count from it.

mod client;
mod error;
mod reaction;
mod types;

pub use client::IssueClient;
pub use error::FetchError;
pub use reaction::ReactionKind;
