//! Pure evaluation of badge criteria against a progress snapshot.

use crate::model::{Criteria, MAX_PERCENT, UserProgress, clamp_percent};

/// Returns whether `criteria` is satisfied by `progress`.
///
/// ```
/// # use kidsafe_core::criteria::evaluate_criteria;
/// # use kidsafe_core::model::{Criteria, UserProgress};
/// # use kidsafe_core::time::fixed_now;
/// let progress = UserProgress::empty(fixed_now());
/// assert!(evaluate_criteria(&Criteria::all_of(vec![]), &progress));
/// assert!(!evaluate_criteria(&Criteria::any_of(vec![]), &progress));
/// ```
#[must_use]
pub fn evaluate_criteria(criteria: &Criteria, progress: &UserProgress) -> bool {
    match criteria {
        Criteria::GameCompletion { game_id, min_score } => {
            progress.games.get(game_id).is_some_and(|game| {
                game.completed && min_score.is_none_or(|min| game.score >= min)
            })
        }
        Criteria::QuizCompletion {
            quiz_id,
            min_score,
            min_correct_percentage,
        } => progress.quizzes.get(quiz_id).is_some_and(|quiz| {
            if !quiz.completed {
                return false;
            }
            if let Some(min) = min_score {
                return quiz.score >= *min;
            }
            if let Some(min_pct) = min_correct_percentage {
                return quiz
                    .correct_percentage()
                    .is_some_and(|pct| pct >= *min_pct);
            }
            true
        }),
        Criteria::Score { game_id, min_score } => progress
            .games
            .get(game_id)
            .is_some_and(|game| game.score >= *min_score),
        Criteria::MultipleCompletion { game_id, count } => progress
            .games
            .get(game_id)
            .is_some_and(|game| game.times_played >= *count),
        Criteria::Combination {
            criteria,
            require_all,
        } => {
            if *require_all {
                criteria.iter().all(|c| evaluate_criteria(c, progress))
            } else {
                criteria.iter().any(|c| evaluate_criteria(c, progress))
            }
        }
    }
}

/// Heuristic display percentage (`0..=100`) for how close `criteria` is to being met.
///
/// Missing records count as no progress. This never decides unlocking.
#[must_use]
pub fn estimate_progress(criteria: &Criteria, progress: &UserProgress) -> u8 {
    match criteria {
        Criteria::GameCompletion { game_id, min_score } => {
            let Some(game) = progress.games.get(game_id) else {
                return 0;
            };
            if !game.completed {
                return if game.times_played > 0 { 50 } else { 0 };
            }
            min_score.map_or(MAX_PERCENT, |min| ratio_percent(game.score, min))
        }
        Criteria::QuizCompletion {
            quiz_id,
            min_score,
            min_correct_percentage,
        } => {
            let Some(quiz) = progress.quizzes.get(quiz_id) else {
                return 0;
            };
            if !quiz.completed {
                return 0;
            }
            if let Some(min) = min_score {
                return ratio_percent(quiz.score, *min);
            }
            if let Some(min_pct) = min_correct_percentage {
                let pct = quiz.correct_percentage().unwrap_or(0.0);
                if *min_pct <= 0.0 {
                    return MAX_PERCENT;
                }
                return clamp_percent((pct / min_pct * 100.0).floor());
            }
            MAX_PERCENT
        }
        Criteria::Score { game_id, min_score } => progress
            .games
            .get(game_id)
            .map_or(0, |game| ratio_percent(game.score, *min_score)),
        Criteria::MultipleCompletion { game_id, count } => progress
            .games
            .get(game_id)
            .map_or(0, |game| ratio_percent(game.times_played, *count)),
        Criteria::Combination {
            criteria,
            require_all,
        } => {
            if criteria.is_empty() {
                return if *require_all { MAX_PERCENT } else { 0 };
            }
            let met = criteria
                .iter()
                .filter(|c| evaluate_criteria(c, progress))
                .count();
            ratio_percent(
                u32::try_from(met).unwrap_or(u32::MAX),
                u32::try_from(criteria.len()).unwrap_or(u32::MAX),
            )
        }
    }
}

/// Floored `value / target` percentage, so an unmet threshold never shows 100.
fn ratio_percent(value: u32, target: u32) -> u8 {
    if target == 0 {
        return MAX_PERCENT;
    }
    let pct = (u64::from(value) * 100 / u64::from(target)).min(u64::from(MAX_PERCENT));
    u8::try_from(pct).unwrap_or(MAX_PERCENT)
}
