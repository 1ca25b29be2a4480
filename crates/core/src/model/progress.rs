use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{BadgeId, CourseId, GameId, LearningPathId, LevelId, QuestId, QuizId};

/// Upper bound for every percentage-style field.
pub const MAX_PERCENT: u8 = 100;

//
// ─── ROOT RECORD ───────────────────────────────────────────────────────────────
//

/// The single persisted progress record for the learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    #[serde(default)]
    pub games: BTreeMap<GameId, GameProgress>,
    #[serde(default)]
    pub quizzes: BTreeMap<QuizId, QuizProgress>,
    #[serde(default)]
    pub badges: BTreeMap<BadgeId, BadgeProgress>,
    #[serde(default)]
    pub learning_paths: BTreeMap<LearningPathId, LearningPathProgress>,
    #[serde(default)]
    pub courses: BTreeMap<CourseId, CourseProgress>,
    #[serde(default)]
    pub quests: BTreeMap<QuestId, QuestProgress>,
    /// Cumulative minutes spent in the app.
    #[serde(default)]
    pub adventure_time: u64,
    pub last_active: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl UserProgress {
    /// Zero-valued record: every mapping empty, no adventure time.
    #[must_use]
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            games: BTreeMap::new(),
            quizzes: BTreeMap::new(),
            badges: BTreeMap::new(),
            learning_paths: BTreeMap::new(),
            courses: BTreeMap::new(),
            quests: BTreeMap::new(),
            adventure_time: 0,
            last_active: now,
            last_updated: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
        self.last_updated = now;
    }

    /// Number of tracked games, quizzes, badges and learning paths.
    #[must_use]
    pub fn tracked_items(&self) -> usize {
        self.games.len() + self.quizzes.len() + self.badges.len() + self.learning_paths.len()
    }

    /// Number of tracked items that are completed (or unlocked, for badges).
    #[must_use]
    pub fn completed_items(&self) -> usize {
        self.games.values().filter(|g| g.completed).count()
            + self.quizzes.values().filter(|q| q.completed).count()
            + self.badges.values().filter(|b| b.unlocked).count()
            + self.learning_paths.values().filter(|p| p.completed).count()
    }

    /// Completed share of all tracked items as a rounded percentage.
    ///
    /// Returns 0 when nothing is tracked yet.
    #[must_use]
    pub fn overall_percentage(&self) -> u8 {
        percent_of(self.completed_items(), self.tracked_items())
    }
}

/// `part / whole` as a rounded percentage clamped to `0..=100`; 0 when `whole == 0`.
#[must_use]
pub fn percent_of(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = part as f64 / whole as f64;
    clamp_percent(ratio * 100.0)
}

/// Rounds and clamps a raw percentage into `0..=100`.
#[must_use]
pub fn clamp_percent(raw: f64) -> u8 {
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = raw.round().min(f64::from(MAX_PERCENT)) as u8;
    rounded
}

//
// ─── GAMES ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProgress {
    pub id: GameId,
    #[serde(default)]
    pub completed: bool,
    /// Score of the latest play.
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub high_score: u32,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
    #[serde(default)]
    pub times_played: u32,
    #[serde(default)]
    pub levels: BTreeMap<LevelId, LevelProgress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelProgress {
    pub completed: bool,
    pub score: u32,
    pub stars: u8,
    pub last_played: Option<DateTime<Utc>>,
}

/// Partial update of a game record; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameProgressUpdate {
    pub completed: Option<bool>,
    pub score: Option<u32>,
    pub high_score: Option<u32>,
    /// Replaces the whole level map when present.
    pub levels: Option<BTreeMap<LevelId, LevelProgress>>,
}

impl GameProgressUpdate {
    #[must_use]
    pub fn score(score: u32) -> Self {
        Self {
            score: Some(score),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    #[must_use]
    pub fn with_high_score(mut self, high_score: u32) -> Self {
        self.high_score = Some(high_score);
        self
    }
}

impl GameProgress {
    #[must_use]
    pub fn new(id: GameId) -> Self {
        Self {
            id,
            completed: false,
            score: 0,
            high_score: 0,
            last_played: None,
            times_played: 0,
            levels: BTreeMap::new(),
        }
    }

    /// Merge a save into this record: one more play, stamped at `now`.
    ///
    /// `high_score` is taken verbatim from the update; it is not derived
    /// from `score`.
    pub fn record_play(&mut self, update: GameProgressUpdate, now: DateTime<Utc>) {
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(score) = update.score {
            self.score = score;
        }
        if let Some(high_score) = update.high_score {
            self.high_score = high_score;
        }
        if let Some(levels) = update.levels {
            self.levels = levels;
        }
        self.times_played = self.times_played.saturating_add(1);
        self.last_played = Some(now);
    }
}

//
// ─── QUIZZES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizProgress {
    pub id: QuizId,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub correct_answers: u32,
    #[serde(default)]
    pub last_completed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempts: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizProgressUpdate {
    pub completed: Option<bool>,
    pub score: Option<u32>,
    pub total_questions: Option<u32>,
    pub correct_answers: Option<u32>,
}

impl QuizProgress {
    #[must_use]
    pub fn new(id: QuizId) -> Self {
        Self {
            id,
            completed: false,
            score: 0,
            total_questions: 0,
            correct_answers: 0,
            last_completed: None,
            attempts: 0,
        }
    }

    /// Share of correct answers in percent, or `None` when the quiz had no questions.
    #[must_use]
    pub fn correct_percentage(&self) -> Option<f64> {
        if self.total_questions == 0 {
            return None;
        }
        Some(f64::from(self.correct_answers) / f64::from(self.total_questions) * 100.0)
    }

    pub fn record_attempt(&mut self, update: QuizProgressUpdate, now: DateTime<Utc>) {
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(score) = update.score {
            self.score = score;
        }
        if let Some(total) = update.total_questions {
            self.total_questions = total;
        }
        if let Some(correct) = update.correct_answers {
            self.correct_answers = correct;
        }
        self.attempts = self.attempts.saturating_add(1);
        self.last_completed = Some(now);
    }
}

//
// ─── BADGES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeProgress {
    pub id: BadgeId,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub date_unlocked: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BadgeProgressUpdate {
    pub unlocked: Option<bool>,
    pub progress: Option<u8>,
    pub date_unlocked: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

impl BadgeProgressUpdate {
    /// The unlock transition: unlocked, full progress, dated `now`.
    #[must_use]
    pub fn unlock(now: DateTime<Utc>, category: impl Into<String>) -> Self {
        Self {
            unlocked: Some(true),
            progress: Some(MAX_PERCENT),
            date_unlocked: Some(now),
            category: Some(category.into()),
        }
    }
}

impl BadgeProgress {
    #[must_use]
    pub fn new(id: BadgeId, category: impl Into<String>) -> Self {
        Self {
            id,
            unlocked: false,
            progress: 0,
            date_unlocked: None,
            category: category.into(),
        }
    }

    /// Apply an update. An unlocked record only accepts a new category.
    pub fn apply(&mut self, update: BadgeProgressUpdate) {
        if let Some(category) = update.category {
            self.category = category;
        }
        if self.unlocked {
            return;
        }
        if let Some(progress) = update.progress {
            self.progress = progress.min(MAX_PERCENT);
        }
        if let Some(date) = update.date_unlocked {
            self.date_unlocked = Some(date);
        }
        if let Some(unlocked) = update.unlocked {
            self.unlocked = unlocked;
        }
    }
}

//
// ─── PATHS, COURSES, QUESTS ────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPathProgress {
    pub id: LearningPathId,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub completed_courses: Vec<CourseId>,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearningPathProgressUpdate {
    pub completed: Option<bool>,
    pub progress: Option<u8>,
    pub completed_courses: Option<Vec<CourseId>>,
}

impl LearningPathProgress {
    #[must_use]
    pub fn new(id: LearningPathId) -> Self {
        Self {
            id,
            completed: false,
            progress: 0,
            completed_courses: Vec::new(),
            last_accessed: None,
        }
    }

    pub fn apply(&mut self, update: LearningPathProgressUpdate, now: DateTime<Utc>) {
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(progress) = update.progress {
            self.progress = progress.min(MAX_PERCENT);
        }
        if let Some(courses) = update.completed_courses {
            self.completed_courses = courses;
        }
        self.last_accessed = Some(now);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub id: CourseId,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub completed_lessons: Vec<String>,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseProgressUpdate {
    pub completed: Option<bool>,
    pub progress: Option<u8>,
    pub completed_lessons: Option<Vec<String>>,
}

impl CourseProgress {
    #[must_use]
    pub fn new(id: CourseId) -> Self {
        Self {
            id,
            completed: false,
            progress: 0,
            completed_lessons: Vec::new(),
            last_accessed: None,
        }
    }

    pub fn apply(&mut self, update: CourseProgressUpdate, now: DateTime<Utc>) {
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(progress) = update.progress {
            self.progress = progress.min(MAX_PERCENT);
        }
        if let Some(lessons) = update.completed_lessons {
            self.completed_lessons = lessons;
        }
        self.last_accessed = Some(now);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestProgress {
    pub id: QuestId,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestProgressUpdate {
    pub completed: Option<bool>,
    pub progress: Option<u8>,
    pub current_step: Option<u32>,
}

impl QuestProgress {
    #[must_use]
    pub fn new(id: QuestId) -> Self {
        Self {
            id,
            completed: false,
            progress: 0,
            current_step: 0,
            last_updated: None,
        }
    }

    pub fn apply(&mut self, update: QuestProgressUpdate, now: DateTime<Utc>) {
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(progress) = update.progress {
            self.progress = progress.min(MAX_PERCENT);
        }
        if let Some(step) = update.current_step {
            self.current_step = step;
        }
        self.last_updated = Some(now);
    }
}
