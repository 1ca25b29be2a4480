use serde::{Deserialize, Serialize};

/// Minimum base score (percent) that counts as a pass.
pub const PASSING_SCORE: u32 = 70;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Scored outcome of one quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// `base_score + time_bonus`; may exceed 100.
    pub score: u32,
    pub base_score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub time_bonus: u32,
    /// Decided on `base_score` alone.
    pub passed: bool,
}

impl QuizResult {
    /// Score an attempt from raw counts.
    ///
    /// A quiz with no questions scores 0 and does not pass. `correct_answers`
    /// is clamped to `total_questions`; callers taking raw counts from users
    /// should reject such input first.
    #[must_use]
    pub fn from_counts(correct_answers: u32, total_questions: u32, time_bonus: u32) -> Self {
        let correct_answers = correct_answers.min(total_questions);
        let base_score = if total_questions == 0 {
            0
        } else {
            let ratio = f64::from(correct_answers) / f64::from(total_questions);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let rounded = (ratio * 100.0).round() as u32;
            rounded
        };

        Self {
            score: base_score.saturating_add(time_bonus),
            base_score,
            correct_answers,
            total_questions,
            time_bonus,
            passed: base_score >= PASSING_SCORE,
        }
    }
}

/// Score answers position by position against `questions`.
///
/// Missing or `None` answers count as wrong.
#[must_use]
pub fn calculate_quiz_score(
    answers: &[Option<usize>],
    questions: &[QuizQuestion],
    time_bonus: u32,
) -> QuizResult {
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(i, question)| answers.get(*i).copied().flatten() == Some(question.correct_answer))
        .count();

    let correct = u32::try_from(correct).unwrap_or(u32::MAX);
    let total = u32::try_from(questions.len()).unwrap_or(u32::MAX);
    QuizResult::from_counts(correct, total, time_bonus)
}
