//! Issue response types
//!
//! Only the fields the badge needs are deserialized; everything else in the
//! issue payload is ignored.

use serde::Deserialize;

use super::reaction::ReactionKind;

/// The part of `GET /repos/{owner}/{repo}/issues/{number}` we consume.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueSnapshot {
    /// Present only when the reactions preview media type is honoured
    #[serde(default)]
    pub reactions: Option<Reactions>,
}

/// Reaction rollup attached to an issue
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Reactions {
    #[serde(rename = "+1", default)]
    pub plus_one: u64,
    #[serde(rename = "-1", default)]
    pub minus_one: u64,
    #[serde(default)]
    pub laugh: u64,
    #[serde(default)]
    pub confused: u64,
    #[serde(default)]
    pub heart: u64,
    #[serde(default)]
    pub hooray: u64,
    #[serde(default)]
    pub rocket: u64,
    #[serde(default)]
    pub eyes: u64,
}

impl Reactions {
    pub const fn count(&self, kind: ReactionKind) -> u64 {
        match kind {
            ReactionKind::ThumbsUp => self.plus_one,
            ReactionKind::ThumbsDown => self.minus_one,
            ReactionKind::Laugh => self.laugh,
            ReactionKind::Confused => self.confused,
            ReactionKind::Heart => self.heart,
            ReactionKind::Hooray => self.hooray,
            ReactionKind::Rocket => self.rocket,
            ReactionKind::Eyes => self.eyes,
        }
    }
}

/// Error body returned by the API on non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}
