mod badge;
mod ids;
mod progress;
mod quiz;
mod settings;

pub use badge::{Badge, BadgeLevel, Criteria};
pub use ids::{BadgeId, CourseId, GameId, LearningPathId, LevelId, ParseIdError, QuestId, QuizId};
pub use progress::{
    BadgeProgress, BadgeProgressUpdate, CourseProgress, CourseProgressUpdate, GameProgress,
    GameProgressUpdate, LearningPathProgress, LearningPathProgressUpdate, LevelProgress,
    MAX_PERCENT, QuestProgress, QuestProgressUpdate, QuizProgress, QuizProgressUpdate,
    UserProgress, clamp_percent, percent_of,
};
pub use quiz::{PASSING_SCORE, QuizQuestion, QuizResult, calculate_quiz_score};
pub use settings::{FontSize, Settings, Theme};
