use serde::{Deserialize, Serialize};

use crate::model::ids::{BadgeId, GameId, QuizId};

/// Medal tier shown next to a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeLevel {
    Bronze,
    Silver,
    Gold,
}

impl BadgeLevel {
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
        }
    }
}

/// Unlock rule for a badge.
///
/// `Combination` nests other criteria and is evaluated recursively. Criteria
/// trees are static data, so there is no depth limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Criteria {
    /// The game was completed, optionally with a minimum latest score.
    #[serde(rename_all = "camelCase")]
    GameCompletion {
        game_id: GameId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_score: Option<u32>,
    },
    /// The quiz was completed. `min_score` is checked before
    /// `min_correct_percentage`; when both are set only `min_score` counts.
    #[serde(rename_all = "camelCase")]
    QuizCompletion {
        quiz_id: QuizId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_score: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_correct_percentage: Option<f64>,
    },
    /// Latest score of the game reaches `min_score`; completion not required.
    #[serde(rename_all = "camelCase")]
    Score { game_id: GameId, min_score: u32 },
    /// The game was played at least `count` times.
    #[serde(rename_all = "camelCase")]
    MultipleCompletion { game_id: GameId, count: u32 },
    /// AND (`require_all`) or OR over nested criteria.
    #[serde(rename_all = "camelCase")]
    Combination {
        criteria: Vec<Criteria>,
        require_all: bool,
    },
}

impl Criteria {
    #[must_use]
    pub fn game_completion(game_id: impl Into<GameId>) -> Self {
        Self::GameCompletion {
            game_id: game_id.into(),
            min_score: None,
        }
    }

    #[must_use]
    pub fn game_completion_with_score(game_id: impl Into<GameId>, min_score: u32) -> Self {
        Self::GameCompletion {
            game_id: game_id.into(),
            min_score: Some(min_score),
        }
    }

    #[must_use]
    pub fn quiz_completion(quiz_id: impl Into<QuizId>) -> Self {
        Self::QuizCompletion {
            quiz_id: quiz_id.into(),
            min_score: None,
            min_correct_percentage: None,
        }
    }

    #[must_use]
    pub fn score(game_id: impl Into<GameId>, min_score: u32) -> Self {
        Self::Score {
            game_id: game_id.into(),
            min_score,
        }
    }

    #[must_use]
    pub fn multiple_completion(game_id: impl Into<GameId>, count: u32) -> Self {
        Self::MultipleCompletion {
            game_id: game_id.into(),
            count,
        }
    }

    #[must_use]
    pub fn all_of(criteria: Vec<Criteria>) -> Self {
        Self::Combination {
            criteria,
            require_all: true,
        }
    }

    #[must_use]
    pub fn any_of(criteria: Vec<Criteria>) -> Self {
        Self::Combination {
            criteria,
            require_all: false,
        }
    }
}

/// Static badge definition compiled into the program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: BadgeId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub icon: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<BadgeLevel>,
    pub criteria: Criteria,
}
