//! Compiled-in badge definitions.

use thiserror::Error;

use crate::model::{Badge, BadgeId, BadgeLevel, Criteria};

pub const GAME_PASSWORD_HERO: &str = "password-hero";
pub const GAME_PHISHING_DETECTIVE: &str = "phishing-detective";
pub const GAME_FACT_CHECKER: &str = "fact-checker";
pub const GAME_AI_ETHICS_LAB: &str = "ai-ethics-lab";

pub const QUIZ_PASSWORD_BASICS: &str = "password-basics";
pub const QUIZ_PHISHING_AWARENESS: &str = "phishing-awareness";
pub const QUIZ_AI_ETHICS: &str = "ai-ethics";
pub const QUIZ_FACT_CHECKING: &str = "fact-checking";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("badge catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered list of badge definitions.
///
/// Evaluation visits badges in this order, so the order of newly unlocked
/// ids follows it as well.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeCatalog {
    badges: Vec<Badge>,
}

impl BadgeCatalog {
    #[must_use]
    pub fn new(badges: Vec<Badge>) -> Self {
        Self { badges }
    }

    /// Parse a catalog authored as a JSON array of badges.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` if the JSON does not describe badges.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let badges: Vec<Badge> = serde_json::from_str(json)?;
        Ok(Self::new(badges))
    }

    #[must_use]
    pub fn get(&self, id: &BadgeId) -> Option<&Badge> {
        self.badges.iter().find(|badge| &badge.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Badge> {
        self.badges.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.badges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}

impl Default for BadgeCatalog {
    fn default() -> Self {
        default_catalog()
    }
}

#[allow(clippy::too_many_arguments)]
fn badge(
    id: &str,
    title: &str,
    description: &str,
    category: &str,
    icon: &str,
    color: &str,
    level: Option<BadgeLevel>,
    criteria: Criteria,
) -> Badge {
    Badge {
        id: BadgeId::new(id),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
        level,
        criteria,
    }
}

/// The badges shipped with the app.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn default_catalog() -> BadgeCatalog {
    let password_rookie = Criteria::game_completion(GAME_PASSWORD_HERO);
    let phishing_spotter = Criteria::game_completion_with_score(GAME_PHISHING_DETECTIVE, 70);
    let fact_finder = Criteria::game_completion(GAME_FACT_CHECKER);
    let ai_explorer = Criteria::game_completion(GAME_AI_ETHICS_LAB);

    let quizzes = [
        QUIZ_PASSWORD_BASICS,
        QUIZ_PHISHING_AWARENESS,
        QUIZ_AI_ETHICS,
        QUIZ_FACT_CHECKING,
    ];
    let cyber_guardian = Criteria::all_of(vec![
        password_rookie.clone(),
        phishing_spotter.clone(),
        fact_finder.clone(),
    ]);

    BadgeCatalog::new(vec![
        badge(
            "password-rookie",
            "Password Rookie",
            "Finish the Password Hero game.",
            "Security",
            "key",
            "blue",
            Some(BadgeLevel::Bronze),
            password_rookie,
        ),
        badge(
            "password-champion",
            "Password Champion",
            "Reach 500 points in Password Hero.",
            "Security",
            "shield",
            "indigo",
            Some(BadgeLevel::Silver),
            Criteria::score(GAME_PASSWORD_HERO, 500),
        ),
        badge(
            "phishing-spotter",
            "Phishing Spotter",
            "Finish Phishing Detective with at least 70 points.",
            "Security",
            "search",
            "orange",
            Some(BadgeLevel::Bronze),
            phishing_spotter,
        ),
        badge(
            "phishing-pro",
            "Phishing Pro",
            "Play Phishing Detective five times.",
            "Security",
            "fish",
            "amber",
            Some(BadgeLevel::Silver),
            Criteria::multiple_completion(GAME_PHISHING_DETECTIVE, 5),
        ),
        badge(
            "fact-finder",
            "Fact Finder",
            "Finish the Fact Checker game.",
            "Media Literacy",
            "newspaper",
            "green",
            Some(BadgeLevel::Bronze),
            fact_finder,
        ),
        badge(
            "practice-makes-perfect",
            "Practice Makes Perfect",
            "Play Fact Checker three times.",
            "Media Literacy",
            "repeat",
            "teal",
            None,
            Criteria::multiple_completion(GAME_FACT_CHECKER, 3),
        ),
        badge(
            "truth-seeker",
            "Truth Seeker",
            "Score 1000 points in Fact Checker.",
            "Media Literacy",
            "telescope",
            "emerald",
            Some(BadgeLevel::Gold),
            Criteria::score(GAME_FACT_CHECKER, 1000),
        ),
        badge(
            "ai-explorer",
            "AI Explorer",
            "Finish the AI Ethics Lab.",
            "AI Ethics",
            "robot",
            "purple",
            Some(BadgeLevel::Bronze),
            ai_explorer,
        ),
        badge(
            "password-quiz-whiz",
            "Password Quiz Whiz",
            "Answer at least 80% of the password quiz correctly.",
            "Quizzes",
            "lock",
            "sky",
            Some(BadgeLevel::Silver),
            Criteria::QuizCompletion {
                quiz_id: QUIZ_PASSWORD_BASICS.into(),
                min_score: None,
                min_correct_percentage: Some(80.0),
            },
        ),
        badge(
            "phishing-quiz-ace",
            "Phishing Quiz Ace",
            "Score 90 or more on the phishing quiz.",
            "Quizzes",
            "mail",
            "rose",
            Some(BadgeLevel::Gold),
            Criteria::QuizCompletion {
                quiz_id: QUIZ_PHISHING_AWARENESS.into(),
                min_score: Some(90),
                min_correct_percentage: None,
            },
        ),
        badge(
            "ethics-thinker",
            "Ethics Thinker",
            "Complete the AI ethics quiz.",
            "Quizzes",
            "lightbulb",
            "violet",
            Some(BadgeLevel::Bronze),
            Criteria::quiz_completion(QUIZ_AI_ETHICS),
        ),
        badge(
            "curious-learner",
            "Curious Learner",
            "Complete any quiz.",
            "Quizzes",
            "book",
            "yellow",
            Some(BadgeLevel::Bronze),
            Criteria::any_of(quizzes.iter().map(|q| Criteria::quiz_completion(*q)).collect()),
        ),
        badge(
            "cyber-guardian",
            "Cyber Guardian",
            "Earn Password Rookie, Phishing Spotter and Fact Finder.",
            "Mastery",
            "castle",
            "slate",
            Some(BadgeLevel::Gold),
            cyber_guardian.clone(),
        ),
        badge(
            "digital-literacy-master",
            "Digital Literacy Master",
            "Become a Cyber Guardian, explore the AI lab and complete every quiz.",
            "Mastery",
            "crown",
            "gold",
            Some(BadgeLevel::Gold),
            Criteria::all_of(vec![
                cyber_guardian,
                Criteria::game_completion(GAME_AI_ETHICS_LAB),
                Criteria::all_of(quizzes.iter().map(|q| Criteria::quiz_completion(*q)).collect()),
            ]),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_catalog_ids_are_unique() {
        let catalog = default_catalog();
        let ids: HashSet<_> = catalog.iter().map(|b| b.id.clone()).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn lookup_by_id() {
        let catalog = default_catalog();
        let badge = catalog.get(&BadgeId::new("password-champion")).unwrap();
        assert_eq!(badge.criteria, Criteria::score(GAME_PASSWORD_HERO, 500));
        assert!(catalog.get(&BadgeId::new("nope")).is_none());
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let catalog = default_catalog();
        let json = serde_json::to_string(&catalog.iter().collect::<Vec<_>>()).unwrap();
        let parsed = BadgeCatalog::from_json(&json).unwrap();
        assert_eq!(parsed, catalog);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = BadgeCatalog::from_json(r#"[{"id": "x"}]"#).unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
