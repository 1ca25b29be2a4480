use std::sync::Arc;

use tracing::info;

use kidsafe_core::model::{QuizId, QuizProgressUpdate, QuizQuestion, QuizResult, calculate_quiz_score};

use crate::badge_service::BadgeEvaluator;
use crate::progress_store::{ProgressStore, RecordOutcome};

/// Persists finished quiz attempts and awards the badges they earn.
pub struct QuizRecorder {
    store: Arc<ProgressStore>,
    badges: Arc<BadgeEvaluator>,
}

impl QuizRecorder {
    #[must_use]
    pub fn new(store: Arc<ProgressStore>, badges: Arc<BadgeEvaluator>) -> Self {
        Self { store, badges }
    }

    /// Score an attempt; see [`calculate_quiz_score`].
    #[must_use]
    pub fn calculate_quiz_score(
        &self,
        answers: &[Option<usize>],
        questions: &[QuizQuestion],
        time_bonus: u32,
    ) -> QuizResult {
        calculate_quiz_score(answers, questions, time_bonus)
    }

    /// Save the attempt (marking the quiz completed, one more attempt), then
    /// run badge evaluation.
    pub async fn save_quiz_result(&self, quiz_id: &QuizId, result: &QuizResult) -> RecordOutcome {
        let update = QuizProgressUpdate {
            completed: Some(true),
            score: Some(result.score),
            total_questions: Some(result.total_questions),
            correct_answers: Some(result.correct_answers),
        };
        let status = self.store.save_quiz_progress(quiz_id, update).await;
        info!(
            quiz = %quiz_id,
            score = result.score,
            passed = result.passed,
            "quiz result recorded"
        );

        let unlocked_badges = self.badges.check_and_award_badges().await;
        RecordOutcome {
            status,
            unlocked_badges,
        }
    }
}
