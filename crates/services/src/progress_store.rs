use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use kidsafe_core::BadgeCatalog;
use kidsafe_core::model::{
    BadgeId, BadgeProgress, BadgeProgressUpdate, CourseId, CourseProgress, CourseProgressUpdate,
    GameId, GameProgress, GameProgressUpdate, LearningPathId, LearningPathProgress,
    LearningPathProgressUpdate, LevelId, LevelProgress, QuestId, QuestProgress,
    QuestProgressUpdate, QuizId, QuizProgress, QuizProgressUpdate, Settings, UserProgress,
};
use kidsafe_core::time::Clock;
use storage::repository::{KeyValueStore, StorageError};

pub const PROGRESS_KEY: &str = "kidsafe_progress";
pub const SETTINGS_KEY: &str = "kidsafe_settings";
pub const VERSION_KEY: &str = "kidsafe_version";
pub const SCHEMA_VERSION: &str = "1.0.0";
const PROBE_KEY: &str = "kidsafe_storage_probe";

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Whether a write reached storage.
///
/// Store writes never fail loudly; this is the only signal a caller gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Persisted,
    NotPersisted,
}

impl SaveStatus {
    #[must_use]
    pub fn is_persisted(self) -> bool {
        matches!(self, Self::Persisted)
    }

    /// `Persisted` only if both writes were.
    #[must_use]
    pub fn and(self, other: SaveStatus) -> SaveStatus {
        if self.is_persisted() && other.is_persisted() {
            Self::Persisted
        } else {
            Self::NotPersisted
        }
    }
}

/// What a recorder did: whether the result reached storage, and which badges
/// it unlocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub status: SaveStatus,
    pub unlocked_badges: Vec<BadgeId>,
}

/// Result of `ProgressStore::initialize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// Nothing was stored; defaults were written.
    Fresh,
    /// A different schema version was stored; progress was wiped.
    Migrated { from: String },
    UpToDate,
    /// The version key could not be read; nothing was written.
    Unavailable,
    /// A reset was due but the defaults were not fully written. The version
    /// key is left as it was, so the reset is retried on the next start.
    NotPersisted,
}

#[derive(Debug, Error)]
enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

/// Owns the persisted `UserProgress` record and the settings record.
///
/// Reads fall back to defaults and writes report a `SaveStatus`; storage and
/// deserialization failures are logged and never returned. Every per-entity
/// save is a read-modify-write of the whole root record.
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Clock,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self { kv, clock }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Write default progress and settings on first use or when the stored
    /// schema version differs. A matching version leaves storage untouched.
    pub async fn initialize(&self) -> InitOutcome {
        let stored = match self.kv.get_item(VERSION_KEY).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "storage unavailable; skipping progress initialization");
                return InitOutcome::Unavailable;
            }
        };

        let outcome = match stored {
            Some(version) if version == SCHEMA_VERSION => return InitOutcome::UpToDate,
            Some(version) => {
                info!(from = %version, to = SCHEMA_VERSION, "schema version changed; resetting progress");
                InitOutcome::Migrated { from: version }
            }
            None => {
                info!(version = SCHEMA_VERSION, "initializing progress storage");
                InitOutcome::Fresh
            }
        };

        let progress = UserProgress::empty(self.now());
        let defaults = self
            .write_json(PROGRESS_KEY, &progress)
            .await
            .and(self.write_json(SETTINGS_KEY, &Settings::default()).await);
        if !defaults.is_persisted() {
            warn!("default records not written; keeping the old schema version");
            return InitOutcome::NotPersisted;
        }
        if let Err(err) = self.kv.set_item(VERSION_KEY, SCHEMA_VERSION).await {
            warn!(error = %err, "failed to store schema version");
            return InitOutcome::NotPersisted;
        }

        outcome
    }

    /// Probe storage by writing and deleting a sentinel key.
    pub async fn is_storage_available(&self) -> bool {
        let probe = async {
            self.kv.set_item(PROBE_KEY, PROBE_KEY).await?;
            self.kv.remove_item(PROBE_KEY).await
        };
        match probe.await {
            Ok(()) => true,
            Err(err) => {
                debug!(error = %err, "storage probe failed");
                false
            }
        }
    }

    //
    // ─── ROOT RECORD ───────────────────────────────────────────────────────
    //

    /// Stored progress, or the zero-valued record when storage is empty,
    /// unreadable or corrupt.
    pub async fn get_user_progress(&self) -> UserProgress {
        match self.read_json::<UserProgress>(PROGRESS_KEY).await {
            Ok(Some(progress)) => progress,
            Ok(None) => UserProgress::empty(self.now()),
            Err(err) => {
                warn!(error = %err, "failed to load progress; using defaults");
                UserProgress::empty(self.now())
            }
        }
    }

    /// Stamp `last_active`/`last_updated` and write the record.
    pub async fn save_user_progress(&self, progress: &mut UserProgress) -> SaveStatus {
        progress.touch(self.now());
        self.write_json(PROGRESS_KEY, progress).await
    }

    /// Replace all progress with an empty record. Irreversible.
    pub async fn reset_user_progress(&self) -> SaveStatus {
        info!("resetting user progress");
        let mut progress = UserProgress::empty(self.now());
        self.save_user_progress(&mut progress).await
    }

    /// Completed games, quizzes, unlocked badges and paths as a share of all tracked ones.
    pub async fn get_overall_progress(&self) -> u8 {
        self.get_user_progress().await.overall_percentage()
    }

    pub async fn update_adventure_time(&self, minutes: u32) -> SaveStatus {
        self.update(|progress, _| {
            progress.adventure_time = progress.adventure_time.saturating_add(u64::from(minutes));
        })
        .await
    }

    //
    // ─── GAMES ─────────────────────────────────────────────────────────────
    //

    pub async fn get_game_progress(&self, id: &GameId) -> Option<GameProgress> {
        self.get_user_progress().await.games.remove(id)
    }

    /// Merge `update` into the game record, counting one more play.
    pub async fn save_game_progress(&self, id: &GameId, update: GameProgressUpdate) -> SaveStatus {
        self.update(|progress, now| {
            progress
                .games
                .entry(id.clone())
                .or_insert_with(|| GameProgress::new(id.clone()))
                .record_play(update, now);
        })
        .await
    }

    /// Store one level entry without counting a play.
    pub async fn save_level_progress(
        &self,
        game_id: &GameId,
        level_id: &LevelId,
        level: LevelProgress,
    ) -> SaveStatus {
        self.update(|progress, now| {
            let level = LevelProgress {
                last_played: Some(now),
                ..level
            };
            progress
                .games
                .entry(game_id.clone())
                .or_insert_with(|| GameProgress::new(game_id.clone()))
                .levels
                .insert(level_id.clone(), level);
        })
        .await
    }

    //
    // ─── QUIZZES ───────────────────────────────────────────────────────────
    //

    pub async fn get_quiz_progress(&self, id: &QuizId) -> Option<QuizProgress> {
        self.get_user_progress().await.quizzes.remove(id)
    }

    /// Merge `update` into the quiz record, counting one more attempt.
    pub async fn save_quiz_progress(&self, id: &QuizId, update: QuizProgressUpdate) -> SaveStatus {
        self.update(|progress, now| {
            progress
                .quizzes
                .entry(id.clone())
                .or_insert_with(|| QuizProgress::new(id.clone()))
                .record_attempt(update, now);
        })
        .await
    }

    //
    // ─── BADGES ────────────────────────────────────────────────────────────
    //

    pub async fn get_badge_progress(&self, id: &BadgeId) -> Option<BadgeProgress> {
        self.get_user_progress().await.badges.remove(id)
    }

    /// Merge `update` into the badge record. Unlocked badges stay unlocked.
    pub async fn save_badge_progress(
        &self,
        id: &BadgeId,
        update: BadgeProgressUpdate,
    ) -> SaveStatus {
        self.update(|progress, _| {
            progress
                .badges
                .entry(id.clone())
                .or_insert_with(|| BadgeProgress::new(id.clone(), String::new()))
                .apply(update);
        })
        .await
    }

    /// Create locked records for catalog badges that have none yet.
    pub async fn ensure_badges(&self, catalog: &BadgeCatalog) -> SaveStatus {
        self.sync_badges(catalog, &[]).await
    }

    /// Create missing catalog badge records and unlock `unlocked`, in one write.
    ///
    /// Skips the write when every record already exists and nothing unlocks.
    pub async fn sync_badges(&self, catalog: &BadgeCatalog, unlocked: &[BadgeId]) -> SaveStatus {
        self.update_if(|progress, now| {
            let mut changed = false;
            for badge in catalog.iter() {
                let record = progress.badges.entry(badge.id.clone()).or_insert_with(|| {
                    changed = true;
                    BadgeProgress::new(badge.id.clone(), badge.category.clone())
                });
                if unlocked.contains(&badge.id) && !record.unlocked {
                    record.apply(BadgeProgressUpdate::unlock(now, badge.category.clone()));
                    changed = true;
                }
            }
            if changed {
                debug!(unlocked = unlocked.len(), "synced badge records");
            }
            changed
        })
        .await
    }

    //
    // ─── PATHS, COURSES, QUESTS ────────────────────────────────────────────
    //

    pub async fn get_learning_path_progress(
        &self,
        id: &LearningPathId,
    ) -> Option<LearningPathProgress> {
        self.get_user_progress().await.learning_paths.remove(id)
    }

    pub async fn save_learning_path_progress(
        &self,
        id: &LearningPathId,
        update: LearningPathProgressUpdate,
    ) -> SaveStatus {
        self.update(|progress, now| {
            progress
                .learning_paths
                .entry(id.clone())
                .or_insert_with(|| LearningPathProgress::new(id.clone()))
                .apply(update, now);
        })
        .await
    }

    pub async fn get_course_progress(&self, id: &CourseId) -> Option<CourseProgress> {
        self.get_user_progress().await.courses.remove(id)
    }

    pub async fn save_course_progress(
        &self,
        id: &CourseId,
        update: CourseProgressUpdate,
    ) -> SaveStatus {
        self.update(|progress, now| {
            progress
                .courses
                .entry(id.clone())
                .or_insert_with(|| CourseProgress::new(id.clone()))
                .apply(update, now);
        })
        .await
    }

    pub async fn get_quest_progress(&self, id: &QuestId) -> Option<QuestProgress> {
        self.get_user_progress().await.quests.remove(id)
    }

    pub async fn save_quest_progress(&self, id: &QuestId, update: QuestProgressUpdate) -> SaveStatus {
        self.update(|progress, now| {
            progress
                .quests
                .entry(id.clone())
                .or_insert_with(|| QuestProgress::new(id.clone()))
                .apply(update, now);
        })
        .await
    }

    //
    // ─── SETTINGS ──────────────────────────────────────────────────────────
    //

    pub async fn get_settings(&self) -> Settings {
        match self.read_json::<Settings>(SETTINGS_KEY).await {
            Ok(settings) => settings.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "failed to load settings; using defaults");
                Settings::default()
            }
        }
    }

    pub async fn save_settings(&self, settings: &Settings) -> SaveStatus {
        self.write_json(SETTINGS_KEY, settings).await
    }

    //
    // ─── HELPERS ───────────────────────────────────────────────────────────
    //

    async fn update<F>(&self, mutate: F) -> SaveStatus
    where
        F: FnOnce(&mut UserProgress, DateTime<Utc>),
    {
        self.update_if(|progress, now| {
            mutate(progress, now);
            true
        })
        .await
    }

    /// Read-modify-write of the root record; `mutate` returns whether it changed anything.
    ///
    /// A corrupt record is replaced, but an unreadable backend is never
    /// overwritten with defaults.
    async fn update_if<F>(&self, mutate: F) -> SaveStatus
    where
        F: FnOnce(&mut UserProgress, DateTime<Utc>) -> bool,
    {
        let mut progress = match self.read_json::<UserProgress>(PROGRESS_KEY).await {
            Ok(Some(progress)) => progress,
            Ok(None) => UserProgress::empty(self.now()),
            Err(StoreError::Json(err)) => {
                warn!(error = %err, "stored progress is malformed; replacing it");
                UserProgress::empty(self.now())
            }
            Err(err @ StoreError::Storage(_)) => {
                warn!(error = %err, "failed to read progress; change was not persisted");
                return SaveStatus::NotPersisted;
            }
        };
        if !mutate(&mut progress, self.now()) {
            return SaveStatus::Persisted;
        }
        self.save_user_progress(&mut progress).await
    }

    async fn read_json<T>(&self, key: &str) -> Result<Option<T>, StoreError>
    where
        T: serde::de::DeserializeOwned,
    {
        let Some(raw) = self.kv.get_item(key).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> SaveStatus {
        let result = async {
            let raw = serde_json::to_string(value)?;
            self.kv.set_item(key, &raw).await?;
            Ok::<(), StoreError>(())
        }
        .await;

        match result {
            Ok(()) => {
                debug!(key, "saved");
                SaveStatus::Persisted
            }
            Err(err) => {
                warn!(key, error = %err, "failed to save; change was not persisted");
                SaveStatus::NotPersisted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use kidsafe_core::default_catalog;
    use kidsafe_core::model::Theme;
    use kidsafe_core::time::{fixed_clock, fixed_now};
    use async_trait::async_trait;
    use storage::repository::InMemoryKeyValueStore;

    fn store_with(kv: InMemoryKeyValueStore) -> ProgressStore {
        ProgressStore::new(Arc::new(kv), fixed_clock())
    }

    /// Backend that fails reads or writes of one key and passes the rest through.
    struct FailingKey {
        inner: InMemoryKeyValueStore,
        key: &'static str,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl FailingKey {
        fn writes(inner: &InMemoryKeyValueStore, key: &'static str) -> ProgressStore {
            let kv = Self {
                inner: inner.clone(),
                key,
                fail_reads: false,
                fail_writes: true,
            };
            ProgressStore::new(Arc::new(kv), fixed_clock())
        }

        fn reads(inner: &InMemoryKeyValueStore, key: &'static str) -> ProgressStore {
            let kv = Self {
                inner: inner.clone(),
                key,
                fail_reads: true,
                fail_writes: false,
            };
            ProgressStore::new(Arc::new(kv), fixed_clock())
        }
    }

    #[async_trait]
    impl KeyValueStore for FailingKey {
        async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail_reads && key == self.key {
                return Err(StorageError::Connection("read failed".into()));
            }
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes && key == self.key {
                return Err(StorageError::QuotaExceeded { needed: 1, quota: 0 });
            }
            self.inner.set_item(key, value).await
        }

        async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove_item(key).await
        }
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let kv = InMemoryKeyValueStore::new();
        let store = store_with(kv.clone());

        assert_eq!(store.initialize().await, InitOutcome::Fresh);
        store
            .save_game_progress(&GameId::new("password-hero"), GameProgressUpdate::score(10))
            .await;
        assert_eq!(store.initialize().await, InitOutcome::UpToDate);

        let game = store.get_game_progress(&GameId::new("password-hero")).await;
        assert_eq!(game.map(|g| g.score), Some(10));
    }

    #[tokio::test]
    async fn version_mismatch_wipes_progress() {
        let kv = InMemoryKeyValueStore::new();
        let store = store_with(kv.clone());
        store.initialize().await;
        store.update_adventure_time(30).await;

        kv.set_item(VERSION_KEY, "0.9.0").await.unwrap();
        assert_eq!(
            store.initialize().await,
            InitOutcome::Migrated {
                from: "0.9.0".into()
            }
        );
        assert_eq!(store.get_user_progress().await.adventure_time, 0);
        assert_eq!(
            kv.get_item(VERSION_KEY).await.unwrap().as_deref(),
            Some(SCHEMA_VERSION)
        );
    }

    #[tokio::test]
    async fn failed_wipe_keeps_old_version_for_retry() {
        let kv = InMemoryKeyValueStore::new();
        let mut old = UserProgress::empty(fixed_now());
        old.adventure_time = 999;
        kv.set_item(PROGRESS_KEY, &serde_json::to_string(&old).unwrap())
            .await
            .unwrap();
        kv.set_item(VERSION_KEY, "0.9.0").await.unwrap();

        let blocked = FailingKey::writes(&kv, PROGRESS_KEY);
        assert_eq!(blocked.initialize().await, InitOutcome::NotPersisted);
        assert_eq!(blocked.initialize().await, InitOutcome::NotPersisted);
        assert_eq!(kv.get_item(VERSION_KEY).await.unwrap().as_deref(), Some("0.9.0"));

        let store = store_with(kv.clone());
        assert_eq!(
            store.initialize().await,
            InitOutcome::Migrated {
                from: "0.9.0".into()
            }
        );
        assert_eq!(store.get_user_progress().await.adventure_time, 0);
        assert_eq!(store.initialize().await, InitOutcome::UpToDate);
    }

    #[tokio::test]
    async fn unreadable_record_is_not_overwritten() {
        let kv = InMemoryKeyValueStore::new();
        let store = store_with(kv.clone());
        store.update_adventure_time(30).await;
        store
            .save_game_progress(&GameId::new("fact-checker"), GameProgressUpdate::score(40))
            .await;

        let flaky = FailingKey::reads(&kv, PROGRESS_KEY);
        assert_eq!(flaky.update_adventure_time(5).await, SaveStatus::NotPersisted);
        assert_eq!(
            flaky.ensure_badges(&default_catalog()).await,
            SaveStatus::NotPersisted
        );

        let progress = store.get_user_progress().await;
        assert_eq!(progress.adventure_time, 30);
        assert_eq!(progress.games.len(), 1);
    }

    #[tokio::test]
    async fn badge_sync_writes_only_on_change() {
        let kv = InMemoryKeyValueStore::new();
        let catalog = default_catalog();
        assert!(store_with(kv.clone()).ensure_badges(&catalog).await.is_persisted());

        let read_only = FailingKey::writes(&kv, PROGRESS_KEY);
        assert!(read_only.sync_badges(&catalog, &[]).await.is_persisted());
        assert_eq!(
            read_only
                .sync_badges(&catalog, &[BadgeId::new("password-rookie")])
                .await,
            SaveStatus::NotPersisted
        );
    }

    #[tokio::test]
    async fn badge_sync_unlocks_once() {
        let store = store_with(InMemoryKeyValueStore::new());
        let catalog = default_catalog();
        let id = BadgeId::new("fact-finder");

        assert!(store.sync_badges(&catalog, &[id.clone()]).await.is_persisted());
        let record = store.get_badge_progress(&id).await.unwrap();
        assert!(record.unlocked);
        assert_eq!(record.category, catalog.get(&id).unwrap().category);
        assert_eq!(store.get_user_progress().await.badges.len(), catalog.len());
    }

    #[tokio::test]
    async fn corrupt_record_reads_as_default() {
        let kv = InMemoryKeyValueStore::new();
        kv.set_item(PROGRESS_KEY, "{not json").await.unwrap();
        let store = store_with(kv);

        let progress = store.get_user_progress().await;
        assert_eq!(progress, UserProgress::empty(fixed_now()));

        // A write replaces the malformed record instead of failing forever.
        assert!(store.update_adventure_time(3).await.is_persisted());
        assert_eq!(store.get_user_progress().await.adventure_time, 3);
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let store = store_with(InMemoryKeyValueStore::new());
        let mut progress = UserProgress::empty(fixed_now() - Duration::days(3));
        progress.adventure_time = 42;
        progress.games.insert(
            GameId::new("fact-checker"),
            GameProgress::new(GameId::new("fact-checker")),
        );

        assert!(store.save_user_progress(&mut progress).await.is_persisted());
        assert_eq!(progress.last_updated, fixed_now());
        assert_eq!(store.get_user_progress().await, progress);
    }

    #[tokio::test]
    async fn times_played_counts_saves() {
        let store = store_with(InMemoryKeyValueStore::new());
        let id = GameId::new("phishing-detective");
        for score in [10, 20, 30] {
            store.save_game_progress(&id, GameProgressUpdate::score(score)).await;
        }
        let game = store.get_game_progress(&id).await.unwrap();
        assert_eq!(game.score, 30);
        assert_eq!(game.times_played, 3);
        assert_eq!(game.high_score, 0);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let store = store_with(InMemoryKeyValueStore::new());
        let id = QuizId::new("ai-ethics");
        store
            .save_quiz_progress(
                &id,
                QuizProgressUpdate {
                    completed: Some(true),
                    score: Some(80),
                    total_questions: Some(10),
                    correct_answers: Some(8),
                },
            )
            .await;
        store
            .save_quiz_progress(
                &id,
                QuizProgressUpdate {
                    score: Some(60),
                    ..QuizProgressUpdate::default()
                },
            )
            .await;

        let quiz = store.get_quiz_progress(&id).await.unwrap();
        assert!(quiz.completed);
        assert_eq!(quiz.score, 60);
        assert_eq!(quiz.correct_answers, 8);
        assert_eq!(quiz.attempts, 2);
    }

    #[tokio::test]
    async fn level_save_does_not_count_a_play() {
        let store = store_with(InMemoryKeyValueStore::new());
        let game = GameId::new("password-hero");
        let level = LevelId::new("level-2");
        store
            .save_level_progress(
                &game,
                &level,
                LevelProgress {
                    completed: true,
                    score: 120,
                    stars: 3,
                    last_played: None,
                },
            )
            .await;

        let stored = store.get_game_progress(&game).await.unwrap();
        assert_eq!(stored.times_played, 0);
        assert_eq!(stored.levels[&level].stars, 3);
        assert_eq!(stored.levels[&level].last_played, Some(fixed_now()));
    }

    #[tokio::test]
    async fn ensure_badges_keeps_existing_records() {
        let store = store_with(InMemoryKeyValueStore::new());
        let catalog = default_catalog();
        let id = BadgeId::new("password-rookie");
        store
            .save_badge_progress(&id, BadgeProgressUpdate::unlock(fixed_now(), "Security"))
            .await;

        assert!(store.ensure_badges(&catalog).await.is_persisted());
        let progress = store.get_user_progress().await;
        assert_eq!(progress.badges.len(), catalog.len());
        assert!(progress.badges[&id].unlocked);
        assert_eq!(store.get_overall_progress().await, 7);
    }

    #[tokio::test]
    async fn overall_progress_bounds() {
        let store = store_with(InMemoryKeyValueStore::new());
        assert_eq!(store.get_overall_progress().await, 0);

        store
            .save_game_progress(
                &GameId::new("fact-checker"),
                GameProgressUpdate::score(1).completed(true),
            )
            .await;
        store
            .save_learning_path_progress(
                &LearningPathId::new("online-safety"),
                LearningPathProgressUpdate {
                    completed: Some(true),
                    ..LearningPathProgressUpdate::default()
                },
            )
            .await;
        assert_eq!(store.get_overall_progress().await, 100);
    }

    #[tokio::test]
    async fn reset_returns_zero_shape() {
        let store = store_with(InMemoryKeyValueStore::new());
        store.update_adventure_time(15).await;
        store
            .save_quest_progress(
                &QuestId::new("spot-the-scam"),
                QuestProgressUpdate {
                    current_step: Some(2),
                    ..QuestProgressUpdate::default()
                },
            )
            .await;

        assert!(store.reset_user_progress().await.is_persisted());
        assert_eq!(store.get_user_progress().await, UserProgress::empty(fixed_now()));
    }

    #[tokio::test]
    async fn adventure_time_accumulates() {
        let store = store_with(InMemoryKeyValueStore::new());
        store.update_adventure_time(10).await;
        store.update_adventure_time(5).await;
        assert_eq!(store.get_user_progress().await.adventure_time, 15);
    }

    #[tokio::test]
    async fn unavailable_storage_degrades_silently() {
        let kv = InMemoryKeyValueStore::new();
        kv.set_available(false);
        let store = store_with(kv);

        assert!(!store.is_storage_available().await);
        assert_eq!(store.initialize().await, InitOutcome::Unavailable);
        assert_eq!(
            store.update_adventure_time(5).await,
            SaveStatus::NotPersisted
        );
        assert_eq!(store.get_user_progress().await.adventure_time, 0);
        assert_eq!(store.get_settings().await, Settings::default());
    }

    #[tokio::test]
    async fn quota_exceeded_reports_not_persisted() {
        let store = store_with(InMemoryKeyValueStore::new().with_quota(16));
        let status = store
            .save_course_progress(
                &CourseId::new("passwords-101"),
                CourseProgressUpdate::default(),
            )
            .await;
        assert_eq!(status, SaveStatus::NotPersisted);
        assert!(
            store
                .get_course_progress(&CourseId::new("passwords-101"))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let store = store_with(InMemoryKeyValueStore::new());
        let settings = Settings {
            theme: Theme::Dark,
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(store.save_settings(&settings).await.is_persisted());
        assert_eq!(store.get_settings().await, settings);
    }
}
