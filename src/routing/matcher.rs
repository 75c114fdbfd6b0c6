//! Badge route matching module
//!
//! Matches `/{owner}/{repo}/issues/{number}[/{reaction}]` and pulls the
//! optional `label` override out of the query string.

use std::num::NonZeroU64;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::github::ReactionKind;

static BADGE_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^/([A-Za-z0-9-]+)/([A-Za-z0-9_.-]+)/issues/([1-9][0-9]*)(?:/(\+1|-1|laugh|confused|heart|hooray|rocket|eyes))?$",
    )
    .expect("badge route pattern is valid")
});

/// Query parameter that replaces the default label
const LABEL_PARAM: &str = "label";

/// Parameters of one badge request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeRequest {
    pub owner: String,
    pub repo: String,
    pub issue_number: NonZeroU64,
    pub reaction: ReactionKind,
    pub label: Option<String>,
}

impl BadgeRequest {
    /// Label to draw: the override when given, else the reaction's emoji
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| self.reaction.glyph())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Invalid URL")]
    InvalidUrl,
}

/// Parse a request path and optional raw query string
pub fn parse_badge_request(path: &str, query: Option<&str>) -> Result<BadgeRequest, RouteError> {
    let caps = BADGE_ROUTE.captures(path).ok_or(RouteError::InvalidUrl)?;

    // The pattern guarantees digits without a leading zero; only overflow can fail here
    let issue_number = caps[3]
        .parse::<NonZeroU64>()
        .map_err(|_| RouteError::InvalidUrl)?;

    let reaction = match caps.get(4) {
        Some(m) => m
            .as_str()
            .parse::<ReactionKind>()
            .map_err(|_| RouteError::InvalidUrl)?,
        None => ReactionKind::default(),
    };

    Ok(BadgeRequest {
        owner: caps[1].to_string(),
        repo: caps[2].to_string(),
        issue_number,
        reaction,
        label: query.and_then(label_override),
    })
}

/// First `label` parameter, form-decoded
fn label_override(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == LABEL_PARAM)
        .map(|(_, value)| value.into_owned())
}
