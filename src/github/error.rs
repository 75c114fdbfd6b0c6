//! Errors raised while fetching reaction counts.

use thiserror::Error;

/// Failure of a reaction fetch.
///
/// `Api` carries the remote status so the handler can answer with it
/// verbatim; everything else becomes a 500.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// GitHub answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Transport failure, undecodable body or client setup problem.
    #[error("{0}")]
    Unexpected(String),
}

impl FetchError {
    /// Remote status, when the failure came from the API itself
    pub const fn remote_status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unexpected(_) => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unexpected(err.to_string())
    }
}
