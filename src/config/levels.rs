//! Difficulty tiers for story generation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error for a level token that is not a recognized tier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized story level: '{0}'")]
pub struct UnknownLevel(pub String);

/// Difficulty tier a user can subscribe to, on the CEFR scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoryLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl StoryLevel {
    /// Tier used when a user record has no level set.
    pub const DEFAULT: Self = Self::A1;

    /// All recognized tiers, in selection-keyboard order.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [Self::A1, Self::A2, Self::B1, Self::B2, Self::C1, Self::C2]
    }

    /// The tier token as shown to users and carried in callback data.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }
}

impl fmt::Display for StoryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A1" => Ok(Self::A1),
            "A2" => Ok(Self::A2),
            "B1" => Ok(Self::B1),
            "B2" => Ok(Self::B2),
            "C1" => Ok(Self::C1),
            "C2" => Ok(Self::C2),
            _ => Err(UnknownLevel(s.trim().to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_levels() {
        assert_eq!("A1".parse(), Ok(StoryLevel::A1));
        assert_eq!("B2".parse(), Ok(StoryLevel::B2));
        assert_eq!("C2".parse(), Ok(StoryLevel::C2));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("a1".parse(), Ok(StoryLevel::A1));
        assert_eq!(" b1 ".parse(), Ok(StoryLevel::B1));
    }

    #[test]
    fn test_parse_unknown_token() {
        let err = "D7".parse::<StoryLevel>();
        assert_eq!(err, Err(UnknownLevel("D7".to_owned())));
    }

    #[test]
    fn test_display_matches_token() {
        for level in StoryLevel::all() {
            assert_eq!(level.to_string(), level.as_str());
        }
    }

    #[test]
    fn test_default_is_recognized() {
        assert!(StoryLevel::all().contains(&StoryLevel::DEFAULT));
    }
}
