use std::sync::Arc;

use tracing::{info, warn};

use kidsafe_core::BadgeCatalog;
use kidsafe_core::default_catalog;
use storage::repository::Storage;

use crate::Clock;
use crate::badge_service::BadgeEvaluator;
use crate::error::AppServicesError;
use crate::game_service::GameRecorder;
use crate::progress_store::{InitOutcome, ProgressStore, SaveStatus};
use crate::quiz_service::QuizRecorder;

/// Assembles the progress store, badge evaluator and recorders over one backend.
#[derive(Clone)]
pub struct AppServices {
    init: InitOutcome,
    badge_records: SaveStatus,
    store: Arc<ProgressStore>,
    badges: Arc<BadgeEvaluator>,
    quizzes: Arc<QuizRecorder>,
    games: Arc<GameRecorder>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the default badge catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, default_catalog()).await)
    }

    /// Build services over a fresh in-memory backend.
    pub async fn in_memory(clock: Clock) -> Self {
        Self::from_storage(Storage::in_memory(), clock, default_catalog()).await
    }

    /// Initialize storage and create badge records for `catalog`.
    pub async fn from_storage(storage: Storage, clock: Clock, catalog: BadgeCatalog) -> Self {
        let store = Arc::new(ProgressStore::new(storage.kv, clock));
        let init = store.initialize().await;
        let badge_records = store.ensure_badges(&catalog).await;
        if !badge_records.is_persisted() {
            warn!("badge records not created; the first evaluation pass will retry");
        }
        info!(?init, badges = catalog.len(), "progress services ready");

        let badges = Arc::new(BadgeEvaluator::new(Arc::clone(&store), Arc::new(catalog)));
        let quizzes = Arc::new(QuizRecorder::new(Arc::clone(&store), Arc::clone(&badges)));
        let games = Arc::new(GameRecorder::new(Arc::clone(&store), Arc::clone(&badges)));

        Self {
            init,
            badge_records,
            store,
            badges,
            quizzes,
            games,
        }
    }

    /// What `initialize` found when the services were built.
    #[must_use]
    pub fn init_outcome(&self) -> &InitOutcome {
        &self.init
    }

    /// Whether the startup badge records reached storage.
    #[must_use]
    pub fn badge_records_status(&self) -> SaveStatus {
        self.badge_records
    }

    #[must_use]
    pub fn progress_store(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn badges(&self) -> Arc<BadgeEvaluator> {
        Arc::clone(&self.badges)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizRecorder> {
        Arc::clone(&self.quizzes)
    }

    #[must_use]
    pub fn games(&self) -> Arc<GameRecorder> {
        Arc::clone(&self.games)
    }
}
