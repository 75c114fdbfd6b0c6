//! Routing module
//!
//! Turns the request target into a `BadgeRequest`:
//! - Path matching for owner, repository, issue number and reaction
//! - `label` query parameter override

mod matcher;

pub use matcher::{parse_badge_request, BadgeRequest};
