use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: identifier cannot be empty")]
pub struct ParseIdError {
    pub kind: &'static str,
}

/// Declares a string-backed identifier newtype.
///
/// Ids serialize as bare JSON strings so they can key the persisted maps.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a mini-game, e.g. `password-hero`.
    GameId
);
string_id!(
    /// Identifier of a quiz, e.g. `phishing-awareness`.
    QuizId
);
string_id!(
    /// Identifier of a badge definition.
    BadgeId
);
string_id!(LearningPathId);
string_id!(CourseId);
string_id!(QuestId);
string_id!(
    /// Identifier of a level inside a game.
    LevelId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_id_display() {
        let id = GameId::new("password-hero");
        assert_eq!(id.to_string(), "password-hero");
    }

    #[test]
    fn badge_id_from_str_trims() {
        let id: BadgeId = "  cyber-guardian ".parse().unwrap();
        assert_eq!(id, BadgeId::new("cyber-guardian"));
    }

    #[test]
    fn empty_id_is_rejected() {
        let err = "   ".parse::<QuizId>().unwrap_err();
        assert_eq!(err.kind, "QuizId");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&LevelId::new("level-1")).unwrap();
        assert_eq!(json, "\"level-1\"");
    }
}
