use std::sync::Arc;

use tracing::info;

use kidsafe_core::model::{GameId, GameProgressUpdate, LevelId, LevelProgress};

use crate::badge_service::BadgeEvaluator;
use crate::progress_store::{ProgressStore, RecordOutcome};

/// One finished play of a mini-game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameResult {
    pub score: u32,
    pub completed: bool,
    pub level: Option<(LevelId, LevelProgress)>,
    pub minutes_played: u32,
}

impl GameResult {
    #[must_use]
    pub fn new(score: u32, completed: bool) -> Self {
        Self {
            score,
            completed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, id: LevelId, level: LevelProgress) -> Self {
        self.level = Some((id, level));
        self
    }

    #[must_use]
    pub fn with_minutes(mut self, minutes: u32) -> Self {
        self.minutes_played = minutes;
        self
    }
}

/// Records game plays and awards the badges they earn.
///
/// Keeps `high_score` at the best score seen and never clears `completed`.
pub struct GameRecorder {
    store: Arc<ProgressStore>,
    badges: Arc<BadgeEvaluator>,
}

impl GameRecorder {
    #[must_use]
    pub fn new(store: Arc<ProgressStore>, badges: Arc<BadgeEvaluator>) -> Self {
        Self { store, badges }
    }

    pub async fn record_game_result(&self, game_id: &GameId, result: GameResult) -> RecordOutcome {
        let existing = self.store.get_game_progress(game_id).await;
        let (high_score, completed, mut levels) = match existing {
            Some(game) => (game.high_score, game.completed, game.levels),
            None => (0, false, Default::default()),
        };

        let levels = result.level.map(|(id, mut level)| {
            level.last_played = Some(self.store.now());
            levels.insert(id, level);
            levels
        });

        let update = GameProgressUpdate {
            completed: Some(completed || result.completed),
            score: Some(result.score),
            high_score: Some(high_score.max(result.score)),
            levels,
        };
        let mut status = self.store.save_game_progress(game_id, update).await;
        if result.minutes_played > 0 {
            status = status.and(self.store.update_adventure_time(result.minutes_played).await);
        }
        info!(game = %game_id, score = result.score, "game result recorded");

        let unlocked_badges = self.badges.check_and_award_badges().await;
        RecordOutcome {
            status,
            unlocked_badges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kidsafe_core::default_catalog;
    use kidsafe_core::model::BadgeId;
    use kidsafe_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryKeyValueStore;

    fn recorder() -> (Arc<ProgressStore>, GameRecorder) {
        let store = Arc::new(ProgressStore::new(
            Arc::new(InMemoryKeyValueStore::new()),
            fixed_clock(),
        ));
        let badges = Arc::new(BadgeEvaluator::new(
            Arc::clone(&store),
            Arc::new(default_catalog()),
        ));
        (Arc::clone(&store), GameRecorder::new(store, badges))
    }

    #[tokio::test]
    async fn high_score_and_completion_are_monotonic() {
        let (store, recorder) = recorder();
        let game = GameId::new("password-hero");

        recorder
            .record_game_result(&game, GameResult::new(300, true))
            .await;
        recorder
            .record_game_result(&game, GameResult::new(120, false))
            .await;

        let stored = store.get_game_progress(&game).await.unwrap();
        assert_eq!(stored.score, 120);
        assert_eq!(stored.high_score, 300);
        assert!(stored.completed);
        assert_eq!(stored.times_played, 2);
    }

    #[tokio::test]
    async fn level_entries_accumulate() {
        let (store, recorder) = recorder();
        let game = GameId::new("fact-checker");
        let level = |score| LevelProgress {
            completed: true,
            score,
            stars: 2,
            last_played: None,
        };

        recorder
            .record_game_result(
                &game,
                GameResult::new(10, false).with_level(LevelId::new("1"), level(10)),
            )
            .await;
        recorder
            .record_game_result(
                &game,
                GameResult::new(20, false).with_level(LevelId::new("2"), level(20)),
            )
            .await;
        recorder
            .record_game_result(&game, GameResult::new(5, false))
            .await;

        let stored = store.get_game_progress(&game).await.unwrap();
        assert_eq!(stored.levels.len(), 2);
        assert_eq!(stored.levels[&LevelId::new("2")].last_played, Some(fixed_now()));
    }

    #[tokio::test]
    async fn minutes_feed_adventure_time() {
        let (store, recorder) = recorder();
        let outcome = recorder
            .record_game_result(
                &GameId::new("ai-ethics-lab"),
                GameResult::new(50, true).with_minutes(12),
            )
            .await;

        assert!(outcome.status.is_persisted());
        assert_eq!(outcome.unlocked_badges, vec![BadgeId::new("ai-explorer")]);
        assert_eq!(store.get_user_progress().await.adventure_time, 12);
    }

    #[tokio::test]
    async fn password_champion_needs_500() {
        let (_, recorder) = recorder();
        let game = GameId::new("password-hero");

        let outcome = recorder
            .record_game_result(&game, GameResult::new(499, false))
            .await;
        assert!(outcome.unlocked_badges.is_empty());

        let outcome = recorder
            .record_game_result(&game, GameResult::new(500, false))
            .await;
        assert_eq!(
            outcome.unlocked_badges,
            vec![BadgeId::new("password-champion")]
        );
    }
}
