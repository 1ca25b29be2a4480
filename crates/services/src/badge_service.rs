use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use kidsafe_core::BadgeCatalog;
use kidsafe_core::criteria::{estimate_progress, evaluate_criteria};
use kidsafe_core::model::{Badge, BadgeId, MAX_PERCENT};

use crate::progress_store::ProgressStore;

/// Display view of one catalog badge.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeStatus {
    pub badge: Badge,
    pub unlocked: bool,
    pub date_unlocked: Option<DateTime<Utc>>,
    /// Estimated completion, 100 once unlocked.
    pub progress: u8,
}

/// Decides which badges are newly earned and records the unlocks.
///
/// Reads progress through the store and writes only badge records, only on
/// the locked-to-unlocked transition.
pub struct BadgeEvaluator {
    store: Arc<ProgressStore>,
    catalog: Arc<BadgeCatalog>,
}

impl BadgeEvaluator {
    #[must_use]
    pub fn new(store: Arc<ProgressStore>, catalog: Arc<BadgeCatalog>) -> Self {
        Self { store, catalog }
    }

    #[must_use]
    pub fn catalog(&self) -> &BadgeCatalog {
        &self.catalog
    }

    /// Unlock every locked badge whose criteria hold for the current progress.
    ///
    /// Returns the newly unlocked ids in catalog order. A second call without
    /// progress changes in between returns an empty list. Catalog badges with
    /// no stored record get a locked one in the same write.
    pub async fn check_and_award_badges(&self) -> Vec<BadgeId> {
        let snapshot = self.store.get_user_progress().await;
        let unlocked: Vec<BadgeId> = self
            .catalog
            .iter()
            .filter(|badge| {
                let already = snapshot
                    .badges
                    .get(&badge.id)
                    .is_some_and(|progress| progress.unlocked);
                !already && evaluate_criteria(&badge.criteria, &snapshot)
            })
            .map(|badge| badge.id.clone())
            .collect();

        let status = self.store.sync_badges(&self.catalog, &unlocked).await;
        for id in &unlocked {
            if status.is_persisted() {
                info!(badge = %id, "badge unlocked");
            } else {
                warn!(badge = %id, "badge unlocked but not persisted");
            }
        }

        unlocked
    }

    /// Approximate completion (`0..=100`) of a badge, for display only.
    ///
    /// Unknown badges and missing progress give 0.
    pub async fn calculate_badge_progress(&self, id: &BadgeId) -> u8 {
        let Some(badge) = self.catalog.get(id) else {
            return 0;
        };
        let snapshot = self.store.get_user_progress().await;
        if snapshot.badges.get(id).is_some_and(|b| b.unlocked) {
            return MAX_PERCENT;
        }
        estimate_progress(&badge.criteria, &snapshot)
    }

    /// Every catalog badge with its unlock state and estimated progress.
    pub async fn badge_statuses(&self) -> Vec<BadgeStatus> {
        let snapshot = self.store.get_user_progress().await;
        self.catalog
            .iter()
            .map(|badge| {
                let stored = snapshot.badges.get(&badge.id);
                let unlocked = stored.is_some_and(|b| b.unlocked);
                BadgeStatus {
                    badge: badge.clone(),
                    unlocked,
                    date_unlocked: stored.and_then(|b| b.date_unlocked),
                    progress: if unlocked {
                        MAX_PERCENT
                    } else {
                        estimate_progress(&badge.criteria, &snapshot)
                    },
                }
            })
            .collect()
    }
}
