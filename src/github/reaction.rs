//! Reaction kinds
//!
//! GitHub supports a fixed set of eight reactions. Each one has a literal used
//! both in our URL paths and as the key in the API's `reactions` rollup, plus
//! an emoji used as the default badge label.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReactionKind {
    #[default]
    ThumbsUp,
    ThumbsDown,
    Laugh,
    Confused,
    Heart,
    Hooray,
    Rocket,
    Eyes,
}

impl ReactionKind {
    pub const ALL: [Self; 8] = [
        Self::ThumbsUp,
        Self::ThumbsDown,
        Self::Laugh,
        Self::Confused,
        Self::Heart,
        Self::Hooray,
        Self::Rocket,
        Self::Eyes,
    ];

    /// Path segment and API field name, e.g. `+1`
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThumbsUp => "+1",
            Self::ThumbsDown => "-1",
            Self::Laugh => "laugh",
            Self::Confused => "confused",
            Self::Heart => "heart",
            Self::Hooray => "hooray",
            Self::Rocket => "rocket",
            Self::Eyes => "eyes",
        }
    }

    /// Default badge label
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::ThumbsUp => "👍",
            Self::ThumbsDown => "👎",
            Self::Laugh => "😄",
            Self::Confused => "😕",
            Self::Heart => "❤️",
            Self::Hooray => "🎉",
            Self::Rocket => "🚀",
            Self::Eyes => "👀",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reaction kind: {0}")]
pub struct UnknownReaction(pub String);

impl FromStr for ReactionKind {
    type Err = UnknownReaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownReaction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_literals() {
        for kind in ReactionKind::ALL {
            assert_eq!(kind.as_str().parse::<ReactionKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert!("thumbsup".parse::<ReactionKind>().is_err());
        assert!("".parse::<ReactionKind>().is_err());
    }

    #[test]
    fn test_default_is_thumbs_up() {
        assert_eq!(ReactionKind::default(), ReactionKind::ThumbsUp);
        assert_eq!(ReactionKind::default().glyph(), "👍");
    }
}
